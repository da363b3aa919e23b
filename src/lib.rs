//! This library computes the lateral geometry and guidance of the legs of a flight plan, for
//! engineers who would rather fly the aircraft than re-derive spherical trigonometry.
//!
//! A flight plan is a sequence of [legs](Leg) joined by [transitions](Transition). Each leg knows
//! its own path: how long it is, how far the aircraft has left to go on it, where to draw it, and
//! what the autopilot should do to stay on it (as [`GuidanceParameters`]). Each transition knows
//! the turn that gets the aircraft from one leg onto the next, and refuses to join legs it was not
//! designed to join.
//!
//! Legs never own the fixes they are defined by. The [`Waypoint`]s live in a [`WaypointStore`]
//! owned by the flight plan, and legs borrow them for as long as they exist. All geometry goes
//! through a [`Geodesy`] provider, [`GreatCircle`] unless you bring your own, so nothing in here
//! reads ambient state: every query is a pure function of the leg and its arguments.
//!
//! # Examples
//!
//! An aircraft flying east along a track-to-fix leg is cleared direct to a fix to the south-east.
//! It turns (a type 4 transition) and then flies the direct-to leg:
//!
//! ```
//! use lnav::{
//!     AircraftState, ControlLaw, DirectFixLeg, LegGeometry, Location, TrackFixLeg, Transition,
//!     TurnConfig, Type4Transition, Waypoint, WaypointStore,
//! };
//! use uom::si::angle::degree;
//! use uom::si::f64::{Angle, Velocity};
//! use uom::si::velocity::knot;
//!
//! let at = |lat: f64, lon: f64| {
//!     Location::builder()
//!         .latitude(Angle::new::<degree>(lat))
//!         .expect("latitude is in [-90, 90]")
//!         .longitude(Angle::new::<degree>(lon))
//!         .build()
//! };
//!
//! let mut fixes = WaypointStore::new();
//! let west = fixes.insert(Waypoint::new("WEST", at(0., 0.)));
//! let east = fixes.insert(Waypoint::new("EAST", at(0., 1.)));
//! let south = fixes.insert(Waypoint::new("SOUTH", at(-1., 2.)));
//!
//! let track = TrackFixLeg::new(&fixes[west], &fixes[east]);
//! let turn = Type4Transition::direct_to(&track, &fixes[south], &TurnConfig::default())
//!     .expect("a type 4 turn may follow a TF leg and lead into a DF leg");
//! assert!(turn.is_clockwise());
//!
//! let direct = DirectFixLeg::new(&turn, &fixes[south]);
//! let state = AircraftState::new(
//!     turn.fly_through_point(),
//!     direct.bearing().expect("direct-to legs are straight"),
//!     Velocity::new::<knot>(250.),
//! );
//! let guidance = direct
//!     .guidance_parameters(&state)
//!     .expect("direct-to legs always provide guidance");
//! assert_eq!(guidance.law, ControlLaw::LateralPath);
//! assert!(guidance.track_angle_error.get::<degree>().abs() < 1e-6);
//! ```
//!
//! Not every leg can guide the aircraft. A course/distance leg has no terminating fix, so callers
//! must be ready for [`UnsupportedOperation`] and fall back to guidance of their own.
//!
//! # Features
//!
//! - `serde`: (de)serialization of the value types and [`TurnConfig`].
//! - `approx`: approximate comparison of [`Location`]s, by surface distance.
//!
//! Both are enabled by default.

mod arc;
mod config;
mod error;
mod geodesy;
mod guidance;
mod util;
mod waypoint;

pub mod legs;
pub mod location;
pub mod navdata;
pub mod transitions;

pub(crate) type Vector3 = nalgebra::Vector3<f64>;

pub use config::TurnConfig;
pub use error::{LegError, TransitionError, UnsupportedOperation};
pub use geodesy::{earth_radius, Geodesy, GreatCircle, EARTH_RADIUS_NM};
pub use guidance::{
    coordinated_turn_bank, standard_gravity, turn_radius, AircraftState, ControlLaw,
    GuidanceParameters, PathVector, GRAVITY,
};
pub use legs::{
    CourseDistanceLeg, DirectFixLeg, Leg, LegGeometry, LegKind, RadiusArcLeg, TrackFixLeg,
};
pub use location::Location;
pub use transitions::{
    NextLegExit, Transition, TransitionKind, Type4Transition, Type6Transition,
};
pub use util::{normalize, signed_difference};
pub use waypoint::{AltitudeConstraint, SpeedConstraint, Waypoint, WaypointId, WaypointStore};
