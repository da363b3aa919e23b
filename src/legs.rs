//! Legs: the segments of a lateral flight plan.
//!
//! Each kind of leg is its own type implementing [`LegGeometry`]; [`Leg`] is the closed set of
//! kinds this crate implements, and is what a flight plan holds.

use crate::error::UnsupportedOperation;
use crate::geodesy::{Geodesy, GreatCircle};
use crate::guidance::{AircraftState, GuidanceParameters, PathVector};
use crate::waypoint::{AltitudeConstraint, SpeedConstraint};
use crate::Location;
use std::borrow::Cow;
use std::fmt;
use uom::si::f64::{Angle, Length, Velocity};
use uom::si::length::nautical_mile;
use uom::ConstZero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod course_distance;
mod direct_fix;
mod radius_arc;
mod track_fix;

pub use course_distance::CourseDistanceLeg;
pub use direct_fix::DirectFixLeg;
pub use radius_arc::RadiusArcLeg;
pub use track_fix::TrackFixLeg;

/// ARINC 424 path terminator of a leg.
///
/// Only some of these are implemented as [`Leg`]s; the rest exist so that the legs a transition
/// may join can be named.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LegKind {
    /// Arc to a fix at a DME distance.
    AF,
    /// Course to an altitude.
    CA,
    /// Course to a DME distance.
    CD,
    /// Course to a fix.
    CF,
    /// Course to an intercept.
    CI,
    /// Course to a radial.
    CR,
    /// Direct to a fix.
    DF,
    /// Course from a fix to an altitude.
    FA,
    /// Course from a fix for a distance.
    FC,
    /// Course from a fix to a DME distance.
    FD,
    /// Course from a fix to a manual termination.
    FM,
    /// Hold to an altitude.
    HA,
    /// Hold to a fix.
    HF,
    /// Hold to a manual termination.
    HM,
    /// Initial fix.
    IF,
    /// Procedure turn.
    PI,
    /// Constant radius arc.
    RF,
    /// Track to a fix.
    TF,
    /// Heading to an altitude.
    VA,
    /// Heading to a DME distance.
    VD,
    /// Heading to an intercept.
    VI,
    /// Heading to a manual termination.
    VM,
    /// Heading to a radial.
    VR,
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What every leg can answer about its geometry and guidance.
pub trait LegGeometry {
    /// The leg's ARINC 424 path terminator.
    fn kind(&self) -> LegKind;

    /// Display label of the leg, usually the identifier of its terminating fix.
    fn identifier(&self) -> Cow<'_, str>;

    /// Nominal true course of the leg.
    ///
    /// `None` for legs whose course changes continuously along the leg, like arcs. Such legs can
    /// not provide the exit course of a transition.
    fn bearing(&self) -> Option<Angle>;

    /// Length of the leg's path. Never negative.
    fn distance(&self) -> Length;

    /// Altitude constraint of the terminating fix, if the leg has one.
    fn altitude_constraint(&self) -> Option<AltitudeConstraint>;

    /// Speed constraint of the terminating fix, if the leg has one.
    fn speed_constraint(&self) -> Option<SpeedConstraint>;

    /// Start of the leg, if it is intrinsic to the leg rather than given by the preceding
    /// transition.
    fn initial_location(&self) -> Option<Location>;

    /// End of the leg, if it defines one.
    fn terminator_location(&self) -> Option<Location>;

    /// Distance left to fly along the leg from `position` to its termination.
    ///
    /// Zero once `position` is past the termination.
    fn distance_to_go(&self, position: &Location) -> Length;

    /// Lateral guidance for flying the leg from the given aircraft state.
    fn guidance_parameters(
        &self,
        state: &AircraftState,
    ) -> Result<GuidanceParameters, UnsupportedOperation>;

    /// The point `distance_before_terminator` back along the leg's path from its termination.
    ///
    /// `None` if the leg cannot place such a point, including for distances outside the leg.
    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<Location>;

    /// True once `position` has reached or passed the leg's abeam reference.
    fn is_abeam(&self, position: &Location) -> bool;

    /// True for legs flown at a constant radius, which need bank feed-forward.
    fn is_circular_arc(&self) -> bool;

    /// Bank angle the leg is nominally flown at, at `ground_speed`. Positive is a right turn.
    fn nominal_roll_angle(&self, _ground_speed: Velocity) -> Angle {
        Angle::ZERO
    }

    /// The path to draw or predict for this leg.
    fn predicted_path(&self, is_active: bool, state: &AircraftState) -> Vec<PathVector>;
}

mod sealed {
    use crate::Location;
    use uom::si::f64::Angle;

    /// Where a leg starts and ends, as seen by the transitions joining it.
    ///
    /// Not part of the public contract: only legs this crate knows the geometry of can be joined
    /// by a transition.
    pub trait LegEnds {
        /// The terminating fix and the true course on arriving there.
        fn exit(&self) -> Option<(Location, Angle)>;

        /// The starting fix and the true course on leaving it.
        fn entry(&self) -> Option<(Location, Angle)>;
    }
}
pub(crate) use sealed::LegEnds;

/// True course on arriving at `to` along the great circle from `from`.
pub(crate) fn final_course<G: Geodesy>(geodesy: &G, from: &Location, to: &Location) -> Angle {
    geodesy.normalize(geodesy.bearing(to, from) + Angle::HALF_TURN)
}

/// Formats a distance in nautical miles as it was entered.
///
/// Lengths are stored in metres, so the value is rounded to a millionth of a mile to drop the noise
/// of converting back.
pub(crate) fn format_nautical_miles(distance: Length) -> String {
    let nautical_miles = (distance.get::<nautical_mile>() * 1e6).round() / 1e6;
    format!("{nautical_miles}")
}

/// One leg of a lateral flight plan.
///
/// Fixes are borrowed from the flight plan's [`WaypointStore`](crate::WaypointStore) for `'a`.
#[derive(Debug, Clone)]
pub enum Leg<'a, G = GreatCircle> {
    /// DF
    DirectFix(DirectFixLeg<'a, G>),
    /// FC
    CourseDistance(CourseDistanceLeg<'a, G>),
    /// RF
    RadiusArc(RadiusArcLeg<'a, G>),
    /// TF
    TrackFix(TrackFixLeg<'a, G>),
}

macro_rules! dispatch {
    ($self:ident, $leg:ident => $body:expr) => {
        match $self {
            Leg::DirectFix($leg) => $body,
            Leg::CourseDistance($leg) => $body,
            Leg::RadiusArc($leg) => $body,
            Leg::TrackFix($leg) => $body,
        }
    };
}

impl<G: Geodesy> LegGeometry for Leg<'_, G> {
    fn kind(&self) -> LegKind {
        dispatch!(self, leg => leg.kind())
    }

    fn identifier(&self) -> Cow<'_, str> {
        dispatch!(self, leg => leg.identifier())
    }

    fn bearing(&self) -> Option<Angle> {
        dispatch!(self, leg => leg.bearing())
    }

    fn distance(&self) -> Length {
        dispatch!(self, leg => leg.distance())
    }

    fn altitude_constraint(&self) -> Option<AltitudeConstraint> {
        dispatch!(self, leg => leg.altitude_constraint())
    }

    fn speed_constraint(&self) -> Option<SpeedConstraint> {
        dispatch!(self, leg => leg.speed_constraint())
    }

    fn initial_location(&self) -> Option<Location> {
        dispatch!(self, leg => leg.initial_location())
    }

    fn terminator_location(&self) -> Option<Location> {
        dispatch!(self, leg => leg.terminator_location())
    }

    fn distance_to_go(&self, position: &Location) -> Length {
        dispatch!(self, leg => leg.distance_to_go(position))
    }

    fn guidance_parameters(
        &self,
        state: &AircraftState,
    ) -> Result<GuidanceParameters, UnsupportedOperation> {
        dispatch!(self, leg => leg.guidance_parameters(state))
    }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<Location> {
        dispatch!(self, leg => leg.pseudo_waypoint_location(distance_before_terminator))
    }

    fn is_abeam(&self, position: &Location) -> bool {
        dispatch!(self, leg => leg.is_abeam(position))
    }

    fn is_circular_arc(&self) -> bool {
        dispatch!(self, leg => leg.is_circular_arc())
    }

    fn nominal_roll_angle(&self, ground_speed: Velocity) -> Angle {
        dispatch!(self, leg => leg.nominal_roll_angle(ground_speed))
    }

    fn predicted_path(&self, is_active: bool, state: &AircraftState) -> Vec<PathVector> {
        dispatch!(self, leg => leg.predicted_path(is_active, state))
    }
}

impl<G: Geodesy> LegEnds for Leg<'_, G> {
    fn exit(&self) -> Option<(Location, Angle)> {
        dispatch!(self, leg => leg.exit())
    }

    fn entry(&self) -> Option<(Location, Angle)> {
        dispatch!(self, leg => leg.entry())
    }
}

impl<G: Geodesy> fmt::Display for Leg<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, leg => fmt::Display::fmt(leg, f))
    }
}

impl<'a, G> From<DirectFixLeg<'a, G>> for Leg<'a, G> {
    fn from(leg: DirectFixLeg<'a, G>) -> Self {
        Self::DirectFix(leg)
    }
}

impl<'a, G> From<CourseDistanceLeg<'a, G>> for Leg<'a, G> {
    fn from(leg: CourseDistanceLeg<'a, G>) -> Self {
        Self::CourseDistance(leg)
    }
}

impl<'a, G> From<RadiusArcLeg<'a, G>> for Leg<'a, G> {
    fn from(leg: RadiusArcLeg<'a, G>) -> Self {
        Self::RadiusArc(leg)
    }
}

impl<'a, G> From<TrackFixLeg<'a, G>> for Leg<'a, G> {
    fn from(leg: TrackFixLeg<'a, G>) -> Self {
        Self::TrackFix(leg)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_nautical_miles, Leg, LegGeometry, LegKind};
    use crate::guidance::AircraftState;
    use crate::location::tests::loc;
    use crate::navdata::{ProcedureLeg, TurnDirection};
    use crate::waypoint::Waypoint;
    use crate::{CourseDistanceLeg, RadiusArcLeg, TrackFixLeg};
    use rstest::rstest;
    use uom::si::angle::degree;
    use uom::si::f64::{Angle, Length, Velocity};
    use uom::si::length::nautical_mile;
    use uom::si::velocity::knot;

    fn nm(nautical_miles: f64) -> Length {
        Length::new::<nautical_mile>(nautical_miles)
    }

    #[rstest]
    #[case(nm(5.), "5")]
    #[case(nm(2.5), "2.5")]
    #[case(nm(12.34), "12.34")]
    #[case(nm(2.46), "2.46")]
    #[case(nm(0.1) + nm(0.2), "0.3")]
    #[case(nm(0.), "0")]
    fn nautical_mile_labels(#[case] distance: Length, #[case] expected: &str) {
        assert_eq!(format_nautical_miles(distance), expected);
    }

    #[test]
    fn kind_displays_as_path_terminator() {
        assert_eq!(LegKind::RF.to_string(), "RF");
        assert_eq!(LegKind::VM.to_string(), "VM");
    }

    #[test]
    fn sum_type_dispatches_to_variants() {
        let origin = Waypoint::new("ORIGN", loc(0., 0.));
        let east = Waypoint::new("EAST", loc(0., 1.));
        let centre = Waypoint::new("CTR", loc(1., 1.));

        let legs: Vec<Leg> = vec![
            TrackFixLeg::new(&origin, &east).into(),
            CourseDistanceLeg::new(&origin, nm(5.), Angle::new::<degree>(90.)).into(),
            RadiusArcLeg::new(
                &east,
                &ProcedureLeg::to(&origin)
                    .with_arc(&centre, nm(60.))
                    .turning(TurnDirection::Right),
            )
            .expect("complete arc record")
            .into(),
        ];

        assert_eq!(
            legs.iter().map(LegGeometry::kind).collect::<Vec<_>>(),
            [LegKind::TF, LegKind::FC, LegKind::RF]
        );
        assert_eq!(
            legs.iter().map(|leg| leg.is_circular_arc()).collect::<Vec<_>>(),
            [false, false, true]
        );
        assert_eq!(legs[1].identifier(), "(5)");
        assert!(legs[2].bearing().is_none());

        let state = AircraftState::new(loc(0., 0.5), Angle::new::<degree>(90.), Velocity::new::<knot>(250.));
        assert!(legs[0].guidance_parameters(&state).is_ok());
        assert!(legs[1].guidance_parameters(&state).is_err());

        insta::assert_snapshot!(
            legs.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"),
            @r"
        <TFLeg from=ORIGN to=EAST>
        <FCLeg from=ORIGN distance=5>
        <RFLeg radius=60 to=ORIGN>
        "
        );
    }
}
