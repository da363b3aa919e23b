use uom::si::angle::radian;
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;
use uom::ConstZero;

/// Distances this close (in metres) past either end of a span still count as on it.
const SPAN_TOLERANCE: f64 = 1e-3;

/// An angle that is always handed out normalized, either into [0°, 360°) or into (-180°, 180°].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BoundedAngle {
    angle: Angle,
}

impl BoundedAngle {
    pub(crate) fn new(angle: impl Into<Angle>) -> Self {
        Self {
            // NOTE: even though we put the value into bounds here, uom may choose to store
            // the value differently-normalized, so we must normalize on output as well.
            angle: Angle::new::<radian>(Self::into_bounds(angle.into())),
        }
    }

    /// Returns the angle in [0°, 360°) in radians.
    pub(crate) fn get_bounded(self) -> f64 {
        Self::into_bounds(self.angle)
    }

    /// Returns the angle in [0°, 360°).
    pub(crate) fn to_angle(self) -> Angle {
        Angle::new::<radian>(self.get_bounded())
    }

    fn into_bounds(angle: Angle) -> f64 {
        let out_of_bounds: f64 = angle.get::<radian>();
        let bounded = out_of_bounds.rem_euclid(Angle::FULL_TURN.get::<radian>());
        // rem_euclid may round a tiny negative value up to exactly one full turn
        if bounded >= Angle::FULL_TURN.get::<radian>() {
            0.
        } else {
            bounded
        }
    }

    /// Returns the angle in (-180°, 180°] in radians.
    pub(crate) fn to_signed_range(self) -> f64 {
        let angle = self.get_bounded();
        if angle <= Angle::HALF_TURN.get::<radian>() {
            angle
        } else {
            angle - Angle::FULL_TURN.get::<radian>()
        }
    }
}

/// Normalizes `angle` into [0°, 360°).
#[must_use]
pub fn normalize(angle: Angle) -> Angle {
    BoundedAngle::new(angle).to_angle()
}

/// Returns the signed angle `to - from`, normalized into (-180°, 180°].
///
/// A positive result means `to` lies clockwise of `from`.
#[must_use]
pub fn signed_difference(from: Angle, to: Angle) -> Angle {
    Angle::new::<radian>(BoundedAngle::new(to - from).to_signed_range())
}

/// Clamps `distance` into [0, `span`], accepting values a hair outside either end.
///
/// Returns `None` for distances further outside the span, and for NaN.
pub(crate) fn clamp_to_span(distance: Length, span: Length) -> Option<Length> {
    let tolerance = Length::new::<meter>(SPAN_TOLERANCE);
    if !(distance >= -tolerance && distance <= span + tolerance) {
        return None;
    }
    Some(if distance < Length::ZERO {
        Length::ZERO
    } else if distance > span {
        span
    } else {
        distance
    })
}
