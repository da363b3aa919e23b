use super::{final_course, LegEnds, LegGeometry, LegKind};
use crate::error::UnsupportedOperation;
use crate::geodesy::{Geodesy, GreatCircle};
use crate::guidance::{AircraftState, ControlLaw, GuidanceParameters, PathVector};
use crate::util::clamp_to_span;
use crate::waypoint::{AltitudeConstraint, SpeedConstraint, Waypoint};
use crate::Location;
use std::borrow::Cow;
use std::fmt;
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length};
use uom::si::length::nautical_mile;
use uom::ConstZero;

/// The great-circle track between two fixes.
#[derive(Debug, Clone)]
pub struct TrackFixLeg<'a, G = GreatCircle> {
    geodesy: G,
    from: &'a Waypoint,
    to: &'a Waypoint,
    bearing: Angle,
    distance: Length,
}

impl<'a> TrackFixLeg<'a> {
    #[must_use]
    pub fn new(from: &'a Waypoint, to: &'a Waypoint) -> Self {
        Self::with_geodesy(GreatCircle, from, to)
    }
}

impl<'a, G: Geodesy> TrackFixLeg<'a, G> {
    /// As [`TrackFixLeg::new`], but with the track computed by `geodesy`.
    #[must_use]
    pub fn with_geodesy(geodesy: G, from: &'a Waypoint, to: &'a Waypoint) -> Self {
        let bearing = geodesy.bearing(&from.location, &to.location);
        let distance = geodesy.distance(&from.location, &to.location);
        tracing::debug!(
            from = %from.identifier,
            to = %to.identifier,
            bearing = bearing.get::<degree>(),
            distance = distance.get::<nautical_mile>(),
            "built track-to-fix leg"
        );
        Self {
            geodesy,
            from,
            to,
            bearing,
            distance,
        }
    }

    #[must_use]
    pub fn from(&self) -> &'a Waypoint {
        self.from
    }

    #[must_use]
    pub fn to(&self) -> &'a Waypoint {
        self.to
    }

    fn along_track(&self, position: &Location) -> Length {
        self.geodesy
            .along_track_distance(&self.from.location, &self.to.location, position)
    }

    /// Course of the track where it passes abeam `position`.
    ///
    /// Great-circle courses change along the track, so this is measured against whichever fix is
    /// further away from the abeam point.
    fn course_abeam(&self, position: &Location) -> Angle {
        let abeam = self
            .geodesy
            .project(&self.from.location, self.bearing, self.along_track(position));
        if self.geodesy.distance(&abeam, &self.to.location)
            >= self.geodesy.distance(&abeam, &self.from.location)
        {
            self.geodesy.bearing(&abeam, &self.to.location)
        } else {
            final_course(&self.geodesy, &self.from.location, &abeam)
        }
    }
}

impl<G: Geodesy> LegGeometry for TrackFixLeg<'_, G> {
    fn kind(&self) -> LegKind {
        LegKind::TF
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
        Some(self.from.location)
    }

    fn terminator_location(&self) -> Option<Location> {
        Some(self.to.location)
    }

    fn distance_to_go(&self, position: &Location) -> Length {
        let remaining = self.distance - self.along_track(position);
        if remaining > Length::ZERO {
            remaining
        } else {
            Length::ZERO
        }
    }

    fn guidance_parameters(
        &self,
        state: &AircraftState,
    ) -> Result<GuidanceParameters, UnsupportedOperation> {
        let cross_track_error = self.geodesy.cross_track_distance(
            &self.from.location,
            &self.to.location,
            &state.position,
        );
        let desired_track = self.course_abeam(&state.position);
        let track_angle_error = self.geodesy.angle_diff(state.true_track, desired_track);
        tracing::trace!(
            to = %self.to.identifier,
            track_angle_error = track_angle_error.get::<degree>(),
            cross_track_error = cross_track_error.get::<nautical_mile>(),
            "track guidance"
        );
        Ok(GuidanceParameters {
            law: ControlLaw::LateralPath,
            track_angle_error,
            cross_track_error,
            phi_command: Angle::ZERO,
        })
    }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<Location> {
        let distance_before_terminator = clamp_to_span(distance_before_terminator, self.distance)?;
        Some(self.geodesy.project(
            &self.from.location,
            self.bearing,
            self.distance - distance_before_terminator,
        ))
    }

    fn is_abeam(&self, position: &Location) -> bool {
        self.along_track(position) >= Length::ZERO
    }

    fn is_circular_arc(&self) -> bool {
        false
    }

    fn predicted_path(&self, _is_active: bool, _state: &AircraftState) -> Vec<PathVector> {
        vec![PathVector::Line {
            start: self.from.location,
            end: self.to.location,
        }]
    }
}

impl<G: Geodesy> LegEnds for TrackFixLeg<'_, G> {
    fn exit(&self) -> Option<(Location, Angle)> {
        Some((
            self.to.location,
            final_course(&self.geodesy, &self.from.location, &self.to.location),
        ))
    }

    fn entry(&self) -> Option<(Location, Angle)> {
        Some((self.from.location, self.bearing))
    }
}

impl<G> fmt::Display for TrackFixLeg<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TFLeg from={} to={}>",
            self.from.identifier, self.to.identifier
        )
    }
}
