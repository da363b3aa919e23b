use crate::guidance::{standard_gravity, turn_radius};
use uom::si::angle::degree;
use uom::si::f64::{Acceleration, Angle, Length, Velocity};
use uom::si::velocity::knot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters used to plan the turns of transitions between legs.
///
/// When (de)serialized, quantities are in SI base units (m/s, radians, m/s²). Missing fields take
/// their [`Default`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TurnConfig {
    /// Ground speed the turn is planned for.
    pub ground_speed: Velocity,
    /// Bank angle the turn is planned to be flown at.
    pub max_bank: Angle,
    /// Defaults to [`standard_gravity`](crate::standard_gravity).
    pub gravity: Acceleration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            ground_speed: Velocity::new::<knot>(250.),
            max_bank: Angle::new::<degree>(25.),
            gravity: standard_gravity(),
        }
    }
}

impl TurnConfig {
    /// Radius of the planned turn.
    #[must_use]
    pub fn turn_radius(&self) -> Length {
        turn_radius(self.ground_speed, self.max_bank, self.gravity)
    }
}

#[cfg(test)]
mod tests {
    use super::TurnConfig;
    use approx::assert_relative_eq;
    use uom::si::acceleration::meter_per_second_squared;
    use uom::si::angle::degree;
    use uom::si::length::nautical_mile;
    use uom::si::velocity::knot;

    #[test]
    fn default_radius() {
        // 250 kt at 25° of bank is a turn of just under 2 NM
        let radius = TurnConfig::default().turn_radius();
        let v: f64 = 250. * 1852. / 3600.;
        let expected = v * v / (9.81 * 25.0_f64.to_radians().tan()) / 1852.;
        assert_relative_eq!(radius.get::<nautical_mile>(), expected, epsilon = 1e-9);
        assert_relative_eq!(radius.get::<nautical_mile>(), 1.95, epsilon = 0.01);
    }

    #[test]
    fn config_from_yaml() {
        let config: TurnConfig = serde_yaml::from_str(
            "
ground_speed: 102.88888888888889
max_bank: 0.4363323129985824
",
        )
        .unwrap();
        assert_relative_eq!(config.ground_speed.get::<knot>(), 200., epsilon = 1e-9);
        assert_relative_eq!(config.max_bank.get::<degree>(), 25., epsilon = 1e-9);
        // not given, so the default is used
        assert_relative_eq!(
            config.gravity.get::<meter_per_second_squared>(),
            9.81,
            epsilon = 1e-12
        );
    }
}
