use super::{exit_of, Transition, TransitionKind, Type4Previous};
use crate::arc::{snapped_turn, TurnArc};
use crate::config::TurnConfig;
use crate::error::TransitionError;
use crate::geodesy::{Geodesy, GreatCircle};
use crate::guidance::{AircraftState, GuidanceParameters, PathVector};
use crate::legs::{LegEnds, LegGeometry, LegKind};
use crate::waypoint::Waypoint;
use crate::Location;
use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length};
use uom::si::length::{meter, nautical_mile};
use uom::ConstZero;

/// What the turn of a [`Type4Transition`] is flown towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextLegExit {
    /// Turn until heading straight for the fix.
    Fix(Location),
    /// Turn until established on the course.
    Course(Angle),
}

/// A turn from the end of the previous leg onto whatever the next leg flies.
///
/// The turn starts at the previous leg's terminating fix, on its final course, and ends at the
/// fly-through point where the next leg takes over.
#[derive(Debug, Clone)]
pub struct Type4Transition<G = GreatCircle> {
    previous: LegKind,
    next: LegKind,
    exit: NextLegExit,
    arc: TurnArc<G>,
    fly_through_point: Location,
}

impl Type4Transition {
    /// The turn after a leg whose kind is only known at runtime.
    pub fn new<P>(
        previous: &P,
        next: LegKind,
        exit: NextLegExit,
        config: &TurnConfig,
    ) -> Result<Self, TransitionError>
    where
        P: LegGeometry + LegEnds + ?Sized,
    {
        Self::with_geodesy(GreatCircle, previous, next, exit, config)
    }

    /// The turn after a leg that is statically known to be joinable.
    pub fn after<P: Type4Previous>(
        previous: &P,
        next: LegKind,
        exit: NextLegExit,
        config: &TurnConfig,
    ) -> Result<Self, TransitionError> {
        Self::new(previous, next, exit, config)
    }

    /// The turn after `previous` that leads into a direct-to leg to `fix`.
    pub fn direct_to<P: Type4Previous>(
        previous: &P,
        fix: &Waypoint,
        config: &TurnConfig,
    ) -> Result<Self, TransitionError> {
        Self::after(previous, LegKind::DF, NextLegExit::Fix(fix.location), config)
    }
}

impl<G: Geodesy> Type4Transition<G> {
    /// As [`Type4Transition::new`], but with the turn laid out by `geodesy`.
    pub fn with_geodesy<P>(
        geodesy: G,
        previous: &P,
        next: LegKind,
        exit: NextLegExit,
        config: &TurnConfig,
    ) -> Result<Self, TransitionError>
    where
        P: LegGeometry + LegEnds + ?Sized,
    {
        TransitionKind::Type4.check(previous.kind(), next)?;
        let (start, course) = exit_of(previous)?;
        let radius = config.turn_radius();

        let arc = match exit {
            NextLegExit::Course(target) => {
                let change = geodesy.angle_diff(course, target);
                let clockwise = change > Angle::ZERO;
                let centre = centre_of_turn(&geodesy, &start, course, radius, clockwise);
                TurnArc::new(geodesy, start, centre, radius, change.abs(), clockwise)
            }
            NextLegExit::Fix(fix) => {
                let clockwise =
                    geodesy.angle_diff(course, geodesy.bearing(&start, &fix)) > Angle::ZERO;
                let centre = centre_of_turn(&geodesy, &start, course, radius, clockwise);
                let sweep = match tangent_radial(&geodesy, &centre, radius, &fix, clockwise) {
                    Some(tangent) => {
                        let entry = geodesy.bearing(&centre, &start);
                        if clockwise {
                            snapped_turn(&geodesy, tangent - entry)
                        } else {
                            snapped_turn(&geodesy, entry - tangent)
                        }
                    }
                    None => {
                        tracing::warn!(
                            next = %next,
                            radius = radius.get::<nautical_mile>(),
                            "fix lies inside the turn; flying straight to it"
                        );
                        Angle::ZERO
                    }
                };
                TurnArc::new(geodesy, start, centre, radius, sweep, clockwise)
            }
        };

        tracing::debug!(
            next = %next,
            sweep = arc.sweep().get::<degree>(),
            clockwise = arc.is_clockwise(),
            radius = radius.get::<nautical_mile>(),
            "built type 4 transition"
        );

        Ok(Self {
            previous: previous.kind(),
            next,
            exit,
            fly_through_point: arc.end(),
            arc,
        })
    }

    /// Kind of the leg the turn starts from.
    pub fn previous_kind(&self) -> LegKind {
        self.previous
    }

    /// Kind of the leg the turn leads into.
    pub fn next_kind(&self) -> LegKind {
        self.next
    }

    /// What the turn rolls out towards.
    pub fn exit(&self) -> NextLegExit {
        self.exit
    }

    pub(crate) fn geodesy(&self) -> &G {
        self.arc.geodesy()
    }
}

/// Centre of a turn of `radius` that starts at `start` on `course`.
fn centre_of_turn<G: Geodesy>(
    geodesy: &G,
    start: &Location,
    course: Angle,
    radius: Length,
    clockwise: bool,
) -> Location {
    let abeam = if clockwise {
        course + Angle::HALF_TURN / 2.
    } else {
        course - Angle::HALF_TURN / 2.
    };
    geodesy.project(start, geodesy.normalize(abeam), radius)
}

/// Radial of the point where a turn about `centre` rolls out heading straight for `fix`.
///
/// `None` if the fix is inside the turn, where no such point exists.
fn tangent_radial<G: Geodesy>(
    geodesy: &G,
    centre: &Location,
    radius: Length,
    fix: &Location,
    clockwise: bool,
) -> Option<Angle> {
    let earth_radius = geodesy.earth_radius().get::<meter>();
    let to_fix = geodesy.distance(centre, fix).get::<meter>() / earth_radius;
    let to_tangent = radius.get::<meter>() / earth_radius;
    if to_fix <= to_tangent {
        return None;
    }
    // right spherical triangle centre-tangent-fix, with the right angle at the tangent point
    let offset = Angle::new::<radian>((to_tangent.tan() / to_fix.tan()).acos());
    let towards_fix = geodesy.bearing(centre, fix);
    Some(geodesy.normalize(if clockwise {
        towards_fix - offset
    } else {
        towards_fix + offset
    }))
}

impl<G: Geodesy> Transition for Type4Transition<G> {
    fn kind(&self) -> TransitionKind {
        TransitionKind::Type4
    }

    fn fly_through_point(&self) -> Location {
        self.fly_through_point
    }

    fn turn_centre(&self) -> Location {
        self.arc.centre()
    }

    fn radius(&self) -> Length {
        self.arc.radius()
    }

    fn is_clockwise(&self) -> bool {
        self.arc.is_clockwise()
    }

    fn sweep_angle(&self) -> Angle {
        self.arc.sweep()
    }

    fn distance(&self) -> Length {
        self.arc.length()
    }

    fn is_abeam(&self, position: &Location) -> bool {
        self.arc.is_abeam(position)
    }

    fn distance_to_go(&self, position: &Location) -> Length {
        self.arc.distance_to_go(position)
    }

    fn guidance_parameters(&self, state: &AircraftState) -> GuidanceParameters {
        let guidance = self.arc.guidance_parameters(state);
        tracing::trace!(
            cross_track_error = guidance.cross_track_error.get::<nautical_mile>(),
            phi_command = guidance.phi_command.get::<degree>(),
            "type 4 guidance"
        );
        guidance
    }

    fn predicted_path(&self) -> Vec<PathVector> {
        if self.arc.sweep() > Angle::ZERO {
            vec![self.arc.path_vector()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NextLegExit, Type4Transition};
    use crate::config::TurnConfig;
    use crate::error::TransitionError;
    use crate::geodesy::{Geodesy, GreatCircle};
    use crate::legs::{CourseDistanceLeg, DirectFixLeg, Leg, LegGeometry, LegKind, TrackFixLeg};
    use crate::location::tests::loc;
    use crate::transitions::{Transition, TransitionKind};
    use crate::waypoint::Waypoint;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use uom::si::angle::degree;
    use uom::si::f64::{Angle, Length};
    use uom::si::length::nautical_mile;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }

    fn eastbound() -> (Waypoint, Waypoint) {
        (
            Waypoint::new("WEST", loc(0., 0.)),
            Waypoint::new("MID", loc(0., 1.)),
        )
    }

    #[rstest]
    #[case(180., true, 90.)]
    #[case(0., false, 90.)]
    #[case(45., false, 45.)]
    #[case(90., false, 0.)]
    fn turn_onto_a_course(#[case] course: f64, #[case] clockwise: bool, #[case] sweep: f64) {
        let (west, mid) = eastbound();
        let config = TurnConfig::default();
        let turn = Type4Transition::after(
            &TrackFixLeg::new(&west, &mid),
            LegKind::VM,
            NextLegExit::Course(d(course)),
            &config,
        )
        .expect("TF then VM is a legal type 4 turn");

        assert_eq!(turn.kind(), TransitionKind::Type4);
        assert_eq!(turn.next_kind(), LegKind::VM);
        assert_eq!(turn.is_clockwise(), clockwise);
        assert_relative_eq!(turn.sweep_angle().get::<degree>(), sweep, epsilon = 1e-9);
        assert_relative_eq!(
            GreatCircle
                .distance(&turn.turn_centre(), &turn.fly_through_point())
                .get::<nautical_mile>(),
            config.turn_radius().get::<nautical_mile>(),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            GreatCircle
                .distance(&turn.turn_centre(), &mid.location)
                .get::<nautical_mile>(),
            config.turn_radius().get::<nautical_mile>(),
            epsilon = 1e-6
        );
    }

    #[rstest]
    #[case(loc(-1., 2.), true)]
    #[case(loc(1., 2.), false)]
    #[case(loc(0.5, 0.5), false)]
    #[case(loc(-0.2, 1.), true)]
    fn turn_towards_a_fix(#[case] fix: crate::Location, #[case] clockwise: bool) {
        let (west, mid) = eastbound();
        let target = Waypoint::new("TGT", fix);
        let config = TurnConfig::default();
        let previous = TrackFixLeg::new(&west, &mid);
        let turn = Type4Transition::direct_to(&previous, &target, &config)
            .expect("TF then DF is a legal type 4 turn");

        assert_eq!(turn.next_kind(), LegKind::DF);
        assert_eq!(turn.is_clockwise(), clockwise);

        // the turn rolls out on the circle, heading straight for the fix
        let ftp = turn.fly_through_point();
        let radial = GreatCircle.bearing(&turn.turn_centre(), &ftp);
        let heading = GreatCircle.normalize(if clockwise { radial + d(90.) } else { radial - d(90.) });
        assert_relative_eq!(
            GreatCircle.distance(&turn.turn_centre(), &ftp).get::<nautical_mile>(),
            config.turn_radius().get::<nautical_mile>(),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            GreatCircle
                .angle_diff(heading, GreatCircle.bearing(&ftp, &fix))
                .get::<degree>(),
            0.,
            epsilon = 1e-3
        );

        // and the direct-to leg picks up from there
        let direct = DirectFixLeg::new(&turn, &target);
        assert_eq!(direct.fly_through_point(), ftp);
        assert_relative_eq!(
            GreatCircle
                .angle_diff(heading, direct.bearing().expect("straight"))
                .get::<degree>(),
            0.,
            epsilon = 1e-3
        );
    }

    #[test]
    fn sharp_turns_go_the_long_way_round_the_circle() {
        let (west, mid) = eastbound();
        let target = Waypoint::new("BACK", loc(0.5, 0.5));
        let turn = Type4Transition::direct_to(
            &TrackFixLeg::new(&west, &mid),
            &target,
            &TurnConfig::default(),
        )
        .expect("TF then DF is a legal type 4 turn");
        assert!(turn.sweep_angle() > d(90.));
        assert!(turn.sweep_angle() < d(180.));
    }

    #[test]
    fn fix_inside_the_turn() {
        let (west, mid) = eastbound();
        let config = TurnConfig::default();
        let radius = config.turn_radius();
        // half a radius out, on the right: inside a right turn's circle
        let inside = GreatCircle.project(&mid.location, d(135.), radius * 0.5);
        let target = Waypoint::new("IN", inside);

        let turn = Type4Transition::direct_to(&TrackFixLeg::new(&west, &mid), &target, &config)
            .expect("degenerate geometry is not an error");
        assert!(turn.is_clockwise());
        assert_eq!(turn.sweep_angle(), d(0.));
        assert_eq!(turn.distance(), Length::new::<nautical_mile>(0.));
        assert_relative_eq!(turn.fly_through_point(), mid.location);
        assert!(turn.is_complete(&mid.location));
        assert!(turn.predicted_path().is_empty());
    }

    #[test]
    fn hand_over() {
        let (west, mid) = eastbound();
        let turn = Type4Transition::after(
            &TrackFixLeg::new(&west, &mid),
            LegKind::CA,
            NextLegExit::Course(d(180.)),
            &TurnConfig::default(),
        )
        .expect("TF then CA is a legal type 4 turn");

        assert!(!turn.is_abeam(&loc(0., 0.9)));
        assert!(turn.is_abeam(&mid.location));
        assert!(!turn.is_complete(&mid.location));
        assert_relative_eq!(
            turn.distance_to_go(&mid.location).get::<nautical_mile>(),
            turn.distance().get::<nautical_mile>(),
            epsilon = 1e-6
        );
        assert!(turn.is_complete(&loc(-0.5, 1.)));
    }

    #[test]
    fn runtime_checks() {
        let (west, mid) = eastbound();
        let config = TurnConfig::default();
        let track: Leg = TrackFixLeg::new(&west, &mid).into();
        let dead_reckoning: Leg = CourseDistanceLeg::new(&mid, Length::new::<nautical_mile>(5.), d(90.)).into();

        assert_eq!(
            Type4Transition::new(&track, LegKind::TF, NextLegExit::Course(d(0.)), &config)
                .map(|_| ()),
            Err(TransitionError::IncompatibleNext {
                transition: TransitionKind::Type4,
                leg: LegKind::TF,
            })
        );
        assert_eq!(
            Type4Transition::new(&dead_reckoning, LegKind::DF, NextLegExit::Course(d(0.)), &config)
                .map(|_| ()),
            Err(TransitionError::IncompatiblePrevious {
                transition: TransitionKind::Type4,
                leg: LegKind::FC,
            })
        );
        let turn = Type4Transition::new(&track, LegKind::DF, NextLegExit::Course(d(0.)), &config)
            .expect("TF then DF is a legal type 4 turn");
        assert_eq!(turn.previous_kind(), LegKind::TF);
        assert_eq!(track.kind(), LegKind::TF);
    }
}
