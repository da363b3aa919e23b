//! Inputs and outputs of the lateral guidance and path-prediction queries.

use crate::Location;
use uom::si::acceleration::meter_per_second_squared;
use uom::si::angle::radian;
use uom::si::f64::{Acceleration, Angle, Length, Velocity};
use uom::si::length::meter;
use uom::si::velocity::meter_per_second;
use uom::ConstZero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gravitational acceleration used by the coordinated-turn formulas, in m/s².
pub const GRAVITY: f64 = 9.81;

/// [`GRAVITY`] as a quantity.
#[must_use]
pub fn standard_gravity() -> Acceleration {
    Acceleration::new::<meter_per_second_squared>(GRAVITY)
}

/// A snapshot of the aircraft's state, as sensed by the host at one guidance tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AircraftState {
    /// Present position.
    pub position: Location,
    /// Direction of travel over the ground, relative to true north.
    pub true_track: Angle,
    /// Speed over the ground. Sets the bank needed to fly a given radius.
    pub ground_speed: Velocity,
    /// Unused by lateral guidance, but part of the prediction inputs.
    pub altitude: Length,
    /// Unused by lateral guidance, but part of the prediction inputs.
    pub vertical_speed: Velocity,
}

impl AircraftState {
    /// A level aircraft at `position` with the given track and ground speed.
    #[must_use]
    pub fn new(position: Location, true_track: Angle, ground_speed: Velocity) -> Self {
        Self {
            position,
            true_track,
            ground_speed,
            altitude: Length::ZERO,
            vertical_speed: Velocity::ZERO,
        }
    }
}

/// The lateral control law the guidance parameters are intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlLaw {
    /// Follow a path: track-angle error, cross-track error, and a bank feed-forward.
    LateralPath,
    /// Hold a track; only the track-angle error is meaningful.
    Track,
}

/// Output of one lateral guidance computation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GuidanceParameters {
    /// Which control law should consume these parameters.
    pub law: ControlLaw,
    /// Desired track minus current true track, in (-180°, 180°]. Positive means turn right.
    pub track_angle_error: Angle,
    /// Lateral distance from the desired path. Positive means right of course.
    pub cross_track_error: Length,
    /// Feed-forward bank command. Positive means right wing down.
    pub phi_command: Angle,
}

/// One element of a leg's or transition's predicted path, for display and prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathVector {
    /// A great-circle segment.
    Line {
        start: Location,
        end: Location,
    },
    /// A constant-radius arc, flown from `start`.
    Arc {
        start: Location,
        centre: Location,
        /// Angle swept about `centre`, negative for clockwise turns.
        sweep_angle: Angle,
    },
}

/// Bank angle for a coordinated turn of `radius` at `ground_speed`, ie `atan(v² / (r·g))`.
///
/// The result is always non-negative; callers apply the sign of the turn.
#[must_use]
pub fn coordinated_turn_bank(ground_speed: Velocity, radius: Length, gravity: Acceleration) -> Angle {
    let v = ground_speed.get::<meter_per_second>();
    let r = radius.get::<meter>();
    let g = gravity.get::<meter_per_second_squared>();
    Angle::new::<radian>((v * v / (r * g)).atan())
}

/// Radius of a coordinated turn at `ground_speed` and `bank`, ie `v² / (g·tan φ)`.
///
/// A bank of zero gives an infinite radius.
#[must_use]
pub fn turn_radius(ground_speed: Velocity, bank: Angle, gravity: Acceleration) -> Length {
    let v = ground_speed.get::<meter_per_second>();
    let g = gravity.get::<meter_per_second_squared>();
    Length::new::<meter>(v * v / (g * bank.get::<radian>().abs().tan()))
}
