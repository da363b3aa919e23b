use super::{final_course, LegEnds, LegGeometry, LegKind};
use crate::error::UnsupportedOperation;
use crate::geodesy::{Geodesy, GreatCircle};
use crate::guidance::{AircraftState, ControlLaw, GuidanceParameters, PathVector};
use crate::transitions::{Transition, Type4Transition};
use crate::util::clamp_to_span;
use crate::waypoint::{AltitudeConstraint, SpeedConstraint, Waypoint};
use crate::Location;
use std::borrow::Cow;
use std::fmt;
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length};
use uom::si::length::nautical_mile;
use uom::ConstZero;

/// A great-circle leg direct to a fix, starting where the preceding turn leaves the aircraft.
///
/// Guidance on a direct-to leg is track-only: the aircraft is steered towards the fix from
/// wherever it is, so there is no cross-track error and no abeam reference. The guidance is still
/// tagged [`ControlLaw::LateralPath`], with a zero cross-track error, so that the lateral path law
/// stays engaged across the hand-over from the preceding turn.
#[derive(Debug, Clone)]
pub struct DirectFixLeg<'a, G = GreatCircle> {
    geodesy: G,
    fly_through_point: Location,
    to: &'a Waypoint,
    bearing: Angle,
    distance: Length,
}

impl<'a> DirectFixLeg<'a> {
    /// A direct-to leg from `fly_through_point` to `to`.
    #[must_use]
    pub fn from_point(fly_through_point: Location, to: &'a Waypoint) -> Self {
        Self::with_geodesy(GreatCircle, fly_through_point, to)
    }
}

impl<'a, G: Geodesy> DirectFixLeg<'a, G> {
    /// The direct-to leg that follows `transition` to `to`.
    #[must_use]
    pub fn new(transition: &Type4Transition<G>, to: &'a Waypoint) -> Self
    where
        G: Clone,
    {
        Self::with_geodesy(
            transition.geodesy().clone(),
            transition.fly_through_point(),
            to,
        )
    }

    /// As [`DirectFixLeg::from_point`], but with the track computed by `geodesy`.
    #[must_use]
    pub fn with_geodesy(geodesy: G, fly_through_point: Location, to: &'a Waypoint) -> Self {
        let bearing = geodesy.bearing(&fly_through_point, &to.location);
        let distance = geodesy.distance(&fly_through_point, &to.location);
        tracing::debug!(
            to = %to.identifier,
            bearing = bearing.get::<degree>(),
            distance = distance.get::<nautical_mile>(),
            "built direct-to leg"
        );
        Self {
            geodesy,
            fly_through_point,
            to,
            bearing,
            distance,
        }
    }

    /// The fix the leg leads to.
    #[must_use]
    pub fn to(&self) -> &'a Waypoint {
        self.to
    }

    #[must_use]
    pub fn fly_through_point(&self) -> Location {
        self.fly_through_point
    }
}

impl<G: Geodesy> LegGeometry for DirectFixLeg<'_, G> {
    fn kind(&self) -> LegKind {
        LegKind::DF
    }

    fn identifier(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.to.identifier)
    }

    fn bearing(&self) -> Option<Angle> {
        Some(self.bearing)
    }

    fn distance(&self) -> Length {
        self.distance
    }

    fn altitude_constraint(&self) -> Option<AltitudeConstraint> {
        self.to.altitude_constraint
    }

    fn speed_constraint(&self) -> Option<SpeedConstraint> {
        self.to.speed_constraint
    }

    fn initial_location(&self) -> Option<Location> {
        None
    }

    fn terminator_location(&self) -> Option<Location> {
        None
    }

    fn distance_to_go(&self, position: &Location) -> Length {
        let to_fix = self.geodesy.bearing(position, &self.to.location);
        // the fix is behind the aircraft once it bears more than abeam off the leg's course
        if self.geodesy.angle_diff(self.bearing, to_fix).abs() > Angle::HALF_TURN / 2. {
            return Length::ZERO;
        }
        self.geodesy.distance(position, &self.to.location)
    }

    fn guidance_parameters(
        &self,
        state: &AircraftState,
    ) -> Result<GuidanceParameters, UnsupportedOperation> {
        let desired_track = self.geodesy.bearing(&state.position, &self.to.location);
        let track_angle_error = self.geodesy.angle_diff(state.true_track, desired_track);
        tracing::trace!(
            to = %self.to.identifier,
            track_angle_error = track_angle_error.get::<degree>(),
            "direct-to guidance"
        );
        Ok(GuidanceParameters {
            law: ControlLaw::LateralPath,
            track_angle_error,
            cross_track_error: Length::ZERO,
            phi_command: Angle::ZERO,
        })
    }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<Location> {
        let distance_before_terminator = clamp_to_span(distance_before_terminator, self.distance)?;
        Some(self.geodesy.project(
            &self.fly_through_point,
            self.bearing,
            self.distance - distance_before_terminator,
        ))
    }

    fn is_abeam(&self, _position: &Location) -> bool {
        false
    }

    fn is_circular_arc(&self) -> bool {
        false
    }

    fn predicted_path(&self, _is_active: bool, _state: &AircraftState) -> Vec<PathVector> {
        vec![PathVector::Line {
            start: self.fly_through_point,
            end: self.to.location,
        }]
    }
}

impl<G: Geodesy> LegEnds for DirectFixLeg<'_, G> {
    fn exit(&self) -> Option<(Location, Angle)> {
        Some((
            self.to.location,
            final_course(&self.geodesy, &self.fly_through_point, &self.to.location),
        ))
    }

    fn entry(&self) -> Option<(Location, Angle)> {
        Some((self.fly_through_point, self.bearing))
    }
}

impl<G> fmt::Display for DirectFixLeg<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<DFLeg to={}>", self.to.identifier)
    }
}
