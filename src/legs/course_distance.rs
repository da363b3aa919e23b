use super::{format_nautical_miles, LegEnds, LegGeometry, LegKind};
use crate::error::UnsupportedOperation;
use crate::geodesy::{Geodesy, GreatCircle};
use crate::guidance::{AircraftState, GuidanceParameters, PathVector};
use crate::waypoint::{AltitudeConstraint, SpeedConstraint, Waypoint};
use crate::Location;
use std::borrow::Cow;
use std::fmt;
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length};
use uom::si::length::nautical_mile;
use uom::ConstZero;

/// A fixed course flown for a fixed distance from a fix.
///
/// The leg has no terminating fix, so it cannot answer any query that depends on the aircraft's
/// position. Guidance for it has to come from whoever sequences the flight plan.
#[derive(Debug, Clone)]
pub struct CourseDistanceLeg<'a, G = GreatCircle> {
    geodesy: G,
    origin: &'a Waypoint,
    distance: Length,
    course: Angle,
}

impl<'a> CourseDistanceLeg<'a> {
    #[must_use]
    pub fn new(origin: &'a Waypoint, distance: Length, course: Angle) -> Self {
        Self::with_geodesy(GreatCircle, origin, distance, course)
    }
}

impl<'a, G: Geodesy> CourseDistanceLeg<'a, G> {
    /// As [`CourseDistanceLeg::new`], but with the path computed by `geodesy`.
    ///
    /// A negative `distance` is taken as its magnitude.
    #[must_use]
    pub fn with_geodesy(geodesy: G, origin: &'a Waypoint, distance: Length, course: Angle) -> Self {
        let course = geodesy.normalize(course);
        let distance = distance.abs();
        tracing::debug!(
            from = %origin.identifier,
            course = course.get::<degree>(),
            distance = distance.get::<nautical_mile>(),
            "built course/distance leg"
        );
        Self {
            geodesy,
            origin,
            distance,
            course,
        }
    }

    /// The fix the course is flown from.
    #[must_use]
    pub fn origin(&self) -> &'a Waypoint {
        self.origin
    }

    fn unsupported(&self, operation: &'static str) -> UnsupportedOperation {
        UnsupportedOperation {
            leg: self.kind(),
            operation,
        }
    }
}

impl<G: Geodesy> LegGeometry for CourseDistanceLeg<'_, G> {
    fn kind(&self) -> LegKind {
        LegKind::FC
    }

    fn identifier(&self) -> Cow<'_, str> {
        Cow::Owned(format!("({})", format_nautical_miles(self.distance)))
    }

    fn bearing(&self) -> Option<Angle> {
        Some(self.course)
    }

    fn distance(&self) -> Length {
        self.distance
    }

    fn altitude_constraint(&self) -> Option<AltitudeConstraint> {
        None
    }

    fn speed_constraint(&self) -> Option<SpeedConstraint> {
        None
    }

    fn initial_location(&self) -> Option<Location> {
        None
    }

    fn terminator_location(&self) -> Option<Location> {
        None
    }

    fn distance_to_go(&self, _position: &Location) -> Length {
        Length::ZERO
    }

    fn guidance_parameters(
        &self,
        _state: &AircraftState,
    ) -> Result<GuidanceParameters, UnsupportedOperation> {
        Err(self.unsupported("lateral guidance"))
    }

    fn pseudo_waypoint_location(&self, _distance_before_terminator: Length) -> Option<Location> {
        None
    }

    fn is_abeam(&self, _position: &Location) -> bool {
        false
    }

    fn is_circular_arc(&self) -> bool {
        false
    }

    fn predicted_path(&self, _is_active: bool, _state: &AircraftState) -> Vec<PathVector> {
        let start = self.origin.location;
        vec![PathVector::Line {
            start,
            end: self.geodesy.project(&start, self.course, self.distance),
        }]
    }
}

impl<G: Geodesy> LegEnds for CourseDistanceLeg<'_, G> {
    fn exit(&self) -> Option<(Location, Angle)> {
        None
    }

    fn entry(&self) -> Option<(Location, Angle)> {
        Some((self.origin.location, self.course))
    }
}

impl<G> fmt::Display for CourseDistanceLeg<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<FCLeg from={} distance={}>",
            self.origin.identifier,
            format_nautical_miles(self.distance)
        )
    }
}
