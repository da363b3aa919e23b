//! Records supplied by the navigation database when a flight plan is built.
//!
//! These are plain data; the legs interpret them at construction time.

use crate::{Location, Waypoint};
use uom::si::f64::{Angle, Frequency, Length};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Turn direction coded on a procedure leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TurnDirection {
    Left,
    Right,
    /// No direction is coded; the shorter turn is flown.
    #[default]
    Unspecified,
}

/// A procedure leg as coded in the navigation database.
///
/// Only the fields that matter for the lateral geometry are kept. Fixes are borrowed from the
/// flight plan's [`WaypointStore`](crate::WaypointStore).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcedureLeg<'a> {
    /// The fix that terminates the leg.
    pub waypoint: &'a Waypoint,
    /// Centre of the arc, for arc legs.
    pub arc_centre_fix: Option<&'a Waypoint>,
    /// Radius of the arc, for arc legs.
    pub arc_radius: Option<Length>,
    /// Which way round an arc leg is flown.
    pub turn_direction: TurnDirection,
}

impl<'a> ProcedureLeg<'a> {
    /// A leg to `waypoint` with no arc data and no coded turn direction.
    #[must_use]
    pub fn to(waypoint: &'a Waypoint) -> Self {
        Self {
            waypoint,
            arc_centre_fix: None,
            arc_radius: None,
            turn_direction: TurnDirection::Unspecified,
        }
    }

    /// Adds the arc centre and radius of a constant-radius arc.
    #[must_use]
    pub fn with_arc(mut self, centre: &'a Waypoint, radius: Length) -> Self {
        self.arc_centre_fix = Some(centre);
        self.arc_radius = Some(radius);
        self
    }

    #[must_use]
    pub fn turning(mut self, turn_direction: TurnDirection) -> Self {
        self.turn_direction = turn_direction;
        self
    }
}

/// Class of a non-directional beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NdbClass {
    #[default]
    Unknown,
    CompassLocator,
    /// Under 50 W.
    Mh,
    /// 50 W to 2 kW.
    H,
    /// 2 kW and above.
    Hh,
}

/// Kind of radio navigation aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NavaidType {
    #[default]
    Unknown,
    Vor,
    VorDme,
    Dme,
    Tacan,
    Vortac,
    Ndb,
    Ils,
    IlsDme,
}

/// A non-directional beacon, eg as the centre fix of an arc.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NdbNavaid {
    pub identifier: String,
    /// Carrier frequency, in the LF/MF band.
    pub frequency: Frequency,
    /// Declination of the station.
    ///
    /// Beware: this is _not_ the magnetic variation at the station, and is never applied to
    /// courses.
    pub station_declination: Angle,
    pub location: Location,
    pub class: NdbClass,
    pub kind: NavaidType,
    /// Distance from a reference position, when the database query supplied one.
    pub distance: Option<Length>,
}

impl NdbNavaid {
    /// The beacon as an unconstrained fix.
    #[must_use]
    pub fn to_waypoint(&self) -> Waypoint {
        Waypoint::new(self.identifier.clone(), self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::{NavaidType, NdbClass, NdbNavaid, ProcedureLeg, TurnDirection};
    use crate::location::tests::loc;
    use crate::Waypoint;
    use uom::si::angle::degree;
    use uom::si::f64::{Angle, Frequency, Length};
    use uom::si::frequency::kilohertz;
    use uom::si::length::nautical_mile;

    #[test]
    fn ndb_becomes_an_unconstrained_waypoint() {
        let ndb = NdbNavaid {
            identifier: "KO".into(),
            frequency: Frequency::new::<kilohertz>(362.),
            station_declination: Angle::new::<degree>(2.),
            location: loc(47.46, 8.55),
            class: NdbClass::CompassLocator,
            kind: NavaidType::Ndb,
            distance: None,
        };
        let waypoint = ndb.to_waypoint();
        assert_eq!(waypoint, Waypoint::new("KO", loc(47.46, 8.55)));
        assert!(waypoint.altitude_constraint.is_none());
    }

    #[test]
    fn procedure_leg_builder() {
        let to = Waypoint::new("TO", loc(0., 1.));
        let centre = Waypoint::new("CTR", loc(0., 0.));
        let leg = ProcedureLeg::to(&to);
        assert_eq!(leg.turn_direction, TurnDirection::Unspecified);
        assert!(leg.arc_centre_fix.is_none());

        let leg = leg
            .with_arc(&centre, Length::new::<nautical_mile>(5.))
            .turning(TurnDirection::Left);
        assert_eq!(leg.arc_centre_fix.map(|c| c.identifier.as_str()), Some("CTR"));
        assert_eq!(leg.turn_direction, TurnDirection::Left);
    }
}
