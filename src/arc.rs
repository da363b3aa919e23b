//! Constant-radius turn geometry shared by arc legs and the turns of transitions.

use crate::geodesy::Geodesy;
use crate::guidance::{
    coordinated_turn_bank, standard_gravity, AircraftState, ControlLaw, GuidanceParameters,
    PathVector,
};
use crate::util::clamp_to_span;
use crate::Location;
use uom::si::angle::radian;
use uom::si::f64::{Angle, Length, Velocity};
use uom::si::length::meter;
use uom::ConstZero;

/// Angles this close (in radians) to a full turn are taken to be zero. Bearings that went through
/// a projection come back a few ulps off, which must not turn "exactly on the radial" into "almost
/// a full turn away".
const FULL_TURN_SNAP: f64 = 1e-9;

/// Where a position is relative to the span of an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ArcPosition {
    /// Before the entry radial.
    BeforeEntry,
    /// Between the entry and exit radials, having travelled the given angle in the sweep direction.
    Along(Angle),
    /// Past the exit radial.
    PastExit,
}

/// Normalizes `angle` into [0°, 360°), snapping values a hair under a full turn to zero.
pub(crate) fn snapped_turn<G: Geodesy>(geodesy: &G, angle: Angle) -> Angle {
    let angle = geodesy.normalize(angle);
    if Angle::FULL_TURN.get::<radian>() - angle.get::<radian>() < FULL_TURN_SNAP {
        Angle::ZERO
    } else {
        angle
    }
}

/// An arc of constant radius about a centre, flown from an entry radial in one direction for a
/// given sweep.
#[derive(Debug, Clone)]
pub(crate) struct TurnArc<G> {
    geodesy: G,
    start: Location,
    centre: Location,
    radius: Length,
    /// Bearing from the centre to where the arc starts.
    entry_radial: Angle,
    /// Bearing from the centre to where the arc ends.
    exit_radial: Angle,
    /// In [0°, 360°).
    sweep: Angle,
    clockwise: bool,
}

impl<G> TurnArc<G> {
    pub(crate) fn geodesy(&self) -> &G {
        &self.geodesy
    }

    pub(crate) fn start(&self) -> Location {
        self.start
    }

    pub(crate) fn centre(&self) -> Location {
        self.centre
    }

    pub(crate) fn radius(&self) -> Length {
        self.radius
    }

    pub(crate) fn sweep(&self) -> Angle {
        self.sweep
    }

    pub(crate) fn is_clockwise(&self) -> bool {
        self.clockwise
    }

    /// Length of the arc, `2πr/360° · sweep`.
    pub(crate) fn length(&self) -> Length {
        self.length_of(self.sweep)
    }

    fn length_of(&self, angle: Angle) -> Length {
        self.radius * angle.get::<radian>()
    }

    fn turn_sign(&self) -> f64 {
        if self.clockwise {
            1.
        } else {
            -1.
        }
    }
}

impl<G: Geodesy> TurnArc<G> {
    /// An arc starting at `start` (which is expected to lie on the entry radial) and sweeping
    /// `sweep` about `centre`.
    pub(crate) fn new(
        geodesy: G,
        start: Location,
        centre: Location,
        radius: Length,
        sweep: Angle,
        clockwise: bool,
    ) -> Self {
        let entry_radial = geodesy.bearing(&centre, &start);
        let exit_radial = if clockwise {
            geodesy.normalize(entry_radial + sweep)
        } else {
            geodesy.normalize(entry_radial - sweep)
        };
        Self {
            geodesy,
            start,
            centre,
            radius,
            entry_radial,
            exit_radial,
            sweep,
            clockwise,
        }
    }

    /// The location on the arc's circle at the given bearing from the centre.
    pub(crate) fn point_on_radial(&self, radial: Angle) -> Location {
        self.geodesy.project(&self.centre, radial, self.radius)
    }

    pub(crate) fn end(&self) -> Location {
        self.point_on_radial(self.exit_radial)
    }

    /// Angle from `from` to `to`, measured in the sweep direction, in [0°, 360°).
    fn angle_in_sweep_direction(&self, from: Angle, to: Angle) -> Angle {
        if self.clockwise {
            snapped_turn(&self.geodesy, to - from)
        } else {
            snapped_turn(&self.geodesy, from - to)
        }
    }

    pub(crate) fn classify(&self, position: &Location) -> ArcPosition {
        let radial = self.geodesy.bearing(&self.centre, position);
        let travelled = self.angle_in_sweep_direction(self.entry_radial, radial);
        if travelled <= self.sweep {
            return ArcPosition::Along(travelled);
        }

        // outside the span: attribute the position to whichever end it is nearer
        let past_exit = travelled - self.sweep;
        let before_entry = Angle::FULL_TURN - travelled;
        if past_exit < before_entry {
            ArcPosition::PastExit
        } else {
            ArcPosition::BeforeEntry
        }
    }

    pub(crate) fn distance_to_go(&self, position: &Location) -> Length {
        match self.classify(position) {
            ArcPosition::BeforeEntry => self.length(),
            ArcPosition::Along(travelled) => self.length_of(self.sweep - travelled),
            ArcPosition::PastExit => Length::ZERO,
        }
    }

    /// True once `position` has passed the entry radial.
    pub(crate) fn is_abeam(&self, position: &Location) -> bool {
        self.classify(position) != ArcPosition::BeforeEntry
    }

    /// The point `distance_before_exit` back along the arc from its end.
    ///
    /// Returns `None` for distances outside the arc.
    pub(crate) fn point_before_exit(&self, distance_before_exit: Length) -> Option<Location> {
        let distance_before_exit = clamp_to_span(distance_before_exit, self.length())?;
        let delta = Angle::new::<radian>(
            distance_before_exit.get::<meter>() / self.radius.get::<meter>(),
        );
        let radial = if self.clockwise {
            self.exit_radial - delta
        } else {
            self.exit_radial + delta
        };
        Some(self.point_on_radial(self.geodesy.normalize(radial)))
    }

    /// Signed bank for a coordinated turn on this arc at `ground_speed`.
    pub(crate) fn nominal_roll_angle(&self, ground_speed: Velocity) -> Angle {
        coordinated_turn_bank(ground_speed, self.radius, standard_gravity()) * self.turn_sign()
    }

    /// Lateral path guidance for flying the arc's circle.
    ///
    /// The desired track is perpendicular to the radial through the aircraft, so this keeps
    /// working after the aircraft has drifted off the circle.
    pub(crate) fn guidance_parameters(&self, state: &AircraftState) -> GuidanceParameters {
        let radial = self.geodesy.bearing(&self.centre, &state.position);
        let desired_track = self
            .geodesy
            .normalize(radial + Angle::HALF_TURN / 2. * self.turn_sign());
        let track_angle_error = self.geodesy.angle_diff(state.true_track, desired_track);

        let distance_from_centre = self.geodesy.distance(&self.centre, &state.position);
        // the centre is on the right of a clockwise turn
        let cross_track_error = (self.radius - distance_from_centre) * self.turn_sign();

        let phi_command = self.nominal_roll_angle(state.ground_speed);

        GuidanceParameters {
            law: ControlLaw::LateralPath,
            track_angle_error,
            cross_track_error,
            phi_command,
        }
    }

    pub(crate) fn path_vector(&self) -> PathVector {
        PathVector::Arc {
            start: self.start,
            centre: self.centre,
            sweep_angle: -self.sweep * self.turn_sign(),
        }
    }
}
