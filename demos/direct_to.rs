//! Flies a short flight plan with a crude point-mass aircraft: a track-to-fix leg, a turn direct
//! to a fix, the direct-to leg, and a course/distance leg that cannot provide guidance.
//!
//! Logs at debug level so that the geometry computed while building the plan shows up.

use lnav::{
    AircraftState, CourseDistanceLeg, DirectFixLeg, Geodesy, GuidanceParameters, Leg,
    LegGeometry, Location, TrackFixLeg, Transition, TurnConfig, Type4Transition, Waypoint, WaypointStore,
};
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length, Time};
use uom::si::length::nautical_mile;
use uom::si::time::second;
use uom::si::velocity::knot;

fn at(lat: f64, lon: f64) -> Location {
    Location::builder()
        .latitude(Angle::new::<degree>(lat))
        .expect("latitude is in [-90, 90]")
        .longitude(Angle::new::<degree>(lon))
        .build()
}

/// Moves the aircraft one tick, turning it by at most `max_turn` towards what guidance asks for.
fn step(state: &mut AircraftState, guidance: &GuidanceParameters, dt: Time, max_turn: Angle) {
    // intercept the path at 1° per 0.1 NM of cross-track error, at most 30°
    let intercept = Angle::new::<degree>(
        (-guidance.cross_track_error.get::<nautical_mile>() * 10.).clamp(-30., 30.),
    );
    let wanted = guidance.track_angle_error + intercept;
    let turn = if wanted.abs() > max_turn {
        max_turn * wanted.value.signum()
    } else {
        wanted
    };
    state.true_track = lnav::normalize(state.true_track + turn);
    let travelled: Length = state.ground_speed * dt;
    state.position = lnav::GreatCircle.project(&state.position, state.true_track, travelled);
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut fixes = WaypointStore::new();
    let west = fixes.insert(Waypoint::new("WEST", at(0., 0.)));
    let east = fixes.insert(Waypoint::new("EAST", at(0., 0.5)));
    let south = fixes.insert(Waypoint::new("SOUTH", at(-0.4, 0.9)));

    let config = TurnConfig::default();
    let track = TrackFixLeg::new(&fixes[west], &fixes[east]);
    let turn = Type4Transition::direct_to(&track, &fixes[south], &config)
        .expect("a type 4 turn may follow a TF leg and lead into a DF leg");
    let legs: Vec<Leg> = vec![
        track.into(),
        DirectFixLeg::new(&turn, &fixes[south]).into(),
        CourseDistanceLeg::new(
            &fixes[south],
            Length::new::<nautical_mile>(5.),
            Angle::new::<degree>(180.),
        )
        .into(),
    ];

    let mut state = AircraftState::new(at(0., 0.), Angle::new::<degree>(90.), config.ground_speed);
    let dt = Time::new::<second>(1.);
    let max_turn = Angle::new::<degree>(3.);

    let mut active = 0;
    let mut turning = false;
    for tick in 0..1200 {
        let guidance = if turning {
            if turn.is_complete(&state.position) {
                println!("{tick:>4}s: turn complete, on to {}", legs[active]);
                turning = false;
                continue;
            }
            turn.guidance_parameters(&state)
        } else {
            let leg = &legs[active];
            if active == 0 && turn.is_abeam(&state.position) {
                println!("{tick:>4}s: starting the {} turn", turn.kind());
                turning = true;
                active += 1;
                continue;
            }
            if matches!(leg, Leg::CourseDistance(_)) {
                // the leg cannot tell us when it ends: fly it for its length
                if lnav::GreatCircle.distance(&fixes[south].location, &state.position) >= leg.distance() {
                    break;
                }
            } else if active > 0
                && leg.distance_to_go(&state.position) <= Length::new::<nautical_mile>(0.1)
            {
                active += 1;
                println!("{tick:>4}s: sequencing to {}", legs[active]);
                continue;
            }
            match leg.guidance_parameters(&state) {
                Ok(guidance) => guidance,
                Err(unsupported) => {
                    // hold the current track; a real sequencer would synthesise guidance here
                    println!("{tick:>4}s: {unsupported}, holding track");
                    GuidanceParameters {
                        law: lnav::ControlLaw::Track,
                        track_angle_error: Angle::new::<degree>(0.),
                        cross_track_error: Length::new::<nautical_mile>(0.),
                        phi_command: Angle::new::<degree>(0.),
                    }
                }
            }
        };

        if tick % 30 == 0 {
            println!(
                "{tick:>4}s: {} track {:>6.1}° xte {:>6.2} NM tae {:>6.1}° bank {:>5.1}°",
                state.position,
                state.true_track.get::<degree>(),
                guidance.cross_track_error.get::<nautical_mile>(),
                guidance.track_angle_error.get::<degree>(),
                guidance.phi_command.get::<degree>(),
            );
        }
        step(&mut state, &guidance, dt, max_turn);
    }

    println!(
        "finished at {} at {:.0} kt",
        state.position,
        state.ground_speed.get::<knot>()
    );
}
