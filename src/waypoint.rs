use crate::Location;
use std::collections::HashMap;
use uom::si::f64::{Length, Velocity};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An altitude restriction attached to a fix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AltitudeConstraint {
    /// Cross the fix at exactly this altitude.
    At(Length),
    /// Cross the fix at or above this altitude.
    AtOrAbove(Length),
    /// Cross the fix at or below this altitude.
    AtOrBelow(Length),
    /// Between `lower` and `upper`, both inclusive.
    Range { lower: Length, upper: Length },
}

impl AltitudeConstraint {
    /// Returns true if `altitude` satisfies this constraint.
    ///
    /// `At` is satisfied within `tolerance` either side.
    #[must_use]
    pub fn contains(&self, altitude: Length, tolerance: Length) -> bool {
        match *self {
            Self::At(at) => (altitude - at).abs() <= tolerance,
            Self::AtOrAbove(lower) => altitude >= lower - tolerance,
            Self::AtOrBelow(upper) => altitude <= upper + tolerance,
            Self::Range { lower, upper } => {
                altitude >= lower - tolerance && altitude <= upper + tolerance
            }
        }
    }
}

/// A speed restriction attached to a fix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpeedConstraint {
    /// Cross the fix at exactly this speed.
    At(Velocity),
    /// Cross the fix at or above this speed.
    AtOrAbove(Velocity),
    /// Cross the fix at or below this speed.
    AtOrBelow(Velocity),
}

impl SpeedConstraint {
    /// Returns true if `speed` satisfies this constraint.
    ///
    /// `At` is satisfied within `tolerance` either side.
    #[must_use]
    pub fn contains(&self, speed: Velocity, tolerance: Velocity) -> bool {
        match *self {
            Self::At(at) => (speed - at).abs() <= tolerance,
            Self::AtOrAbove(lower) => speed >= lower - tolerance,
            Self::AtOrBelow(upper) => speed <= upper + tolerance,
        }
    }
}

/// A named fix of the flight plan, with the constraints the procedure puts on it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Waypoint {
    /// The name the fix is published under, eg `"KERAX"`.
    pub identifier: String,
    pub location: Location,
    pub altitude_constraint: Option<AltitudeConstraint>,
    pub speed_constraint: Option<SpeedConstraint>,
}

impl Waypoint {
    /// An unconstrained waypoint.
    pub fn new(identifier: impl Into<String>, location: Location) -> Self {
        Self {
            identifier: identifier.into(),
            location,
            altitude_constraint: None,
            speed_constraint: None,
        }
    }

    #[must_use]
    pub fn with_altitude_constraint(mut self, constraint: AltitudeConstraint) -> Self {
        self.altitude_constraint = Some(constraint);
        self
    }

    #[must_use]
    pub fn with_speed_constraint(mut self, constraint: SpeedConstraint) -> Self {
        self.speed_constraint = Some(constraint);
        self
    }
}

/// Handle to a [`Waypoint`] held in a [`WaypointStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WaypointId(usize);

/// Arena owning the waypoints of a flight plan.
///
/// Legs never own waypoints; they borrow them from here for as long as they live. Identifiers are
/// unique within a store.
#[derive(Debug, Clone, Default)]
pub struct WaypointStore {
    waypoints: Vec<Waypoint>,
    by_identifier: HashMap<String, WaypointId>,
}

impl WaypointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `waypoint` to the store.
    ///
    /// If a waypoint with the same identifier is already present it is replaced in place, and its
    /// existing handle is returned.
    pub fn insert(&mut self, waypoint: Waypoint) -> WaypointId {
        if let Some(&id) = self.by_identifier.get(&waypoint.identifier) {
            tracing::debug!(identifier = %waypoint.identifier, "replacing waypoint");
            self.waypoints[id.0] = waypoint;
            return id;
        }
        let id = WaypointId(self.waypoints.len());
        self.by_identifier.insert(waypoint.identifier.clone(), id);
        self.waypoints.push(waypoint);
        id
    }

    #[must_use]
    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.0)
    }

    /// Looks up a waypoint handle by identifier.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<WaypointId> {
        self.by_identifier.get(identifier).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Iterates over all waypoints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (WaypointId, &Waypoint)> {
        self.waypoints
            .iter()
            .enumerate()
            .map(|(i, waypoint)| (WaypointId(i), waypoint))
    }
}

impl std::ops::Index<WaypointId> for WaypointStore {
    type Output = Waypoint;

    fn index(&self, id: WaypointId) -> &Self::Output {
        &self.waypoints[id.0]
    }
}
