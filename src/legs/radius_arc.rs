use super::{format_nautical_miles, LegEnds, LegGeometry, LegKind};
use crate::arc::{snapped_turn, TurnArc};
use crate::error::{LegError, UnsupportedOperation};
use crate::geodesy::{Geodesy, GreatCircle};
use crate::guidance::{AircraftState, GuidanceParameters, PathVector};
use crate::navdata::{ProcedureLeg, TurnDirection};
use crate::waypoint::{AltitudeConstraint, SpeedConstraint, Waypoint};
use crate::Location;
use std::borrow::Cow;
use std::fmt;
use uom::si::angle::degree;
use uom::si::f64::{Angle, Length, Velocity};
use uom::si::length::nautical_mile;
use uom::ConstZero;

/// A constant-radius turn about a centre fix, from the previous leg's fix to the leg's own fix.
///
/// The turn is flown from the radial through `from` to the radial through `to`, in the direction
/// coded on the procedure leg. `from` is expected to lie on the circle; `to` only contributes its
/// radial, so the arc always ends at the coded radius.
#[derive(Debug, Clone)]
pub struct RadiusArcLeg<'a, G = GreatCircle> {
    from: &'a Waypoint,
    to: &'a Waypoint,
    centre: &'a Waypoint,
    arc: TurnArc<G>,
}

impl<'a> RadiusArcLeg<'a> {
    /// The arc from `from` to the fix of `record`, about the record's centre fix.
    ///
    /// Fails if the record lacks the arc centre or radius, or if the radius is not positive.
    pub fn new(from: &'a Waypoint, record: &ProcedureLeg<'a>) -> Result<Self, LegError> {
        Self::with_geodesy(GreatCircle, from, record)
    }
}

impl<'a, G: Geodesy> RadiusArcLeg<'a, G> {
    /// As [`RadiusArcLeg::new`], but with the arc laid out by `geodesy`.
    pub fn with_geodesy(
        geodesy: G,
        from: &'a Waypoint,
        record: &ProcedureLeg<'a>,
    ) -> Result<Self, LegError> {
        let to = record.waypoint;
        let missing = |field| LegError::MissingData {
            kind: LegKind::RF,
            waypoint: to.identifier.clone(),
            field,
        };
        let centre = record.arc_centre_fix.ok_or_else(|| missing("arc centre fix"))?;
        let radius = record.arc_radius.ok_or_else(|| missing("arc radius"))?;
        // written this way round so that NaN is rejected too
        if !(radius > Length::ZERO) {
            return Err(LegError::InvalidRadius {
                kind: LegKind::RF,
                waypoint: to.identifier.clone(),
                radius,
            });
        }

        let bearing_from = geodesy.bearing(&centre.location, &from.location);
        let bearing_to = geodesy.bearing(&centre.location, &to.location);
        let (clockwise, angle) = match record.turn_direction {
            TurnDirection::Left => (false, snapped_turn(&geodesy, bearing_from - bearing_to)),
            TurnDirection::Right => (true, snapped_turn(&geodesy, bearing_to - bearing_from)),
            TurnDirection::Unspecified => {
                let difference = geodesy.angle_diff(bearing_from, bearing_to);
                (difference > Angle::ZERO, difference.abs())
            }
        };

        tracing::debug!(
            from = %from.identifier,
            to = %to.identifier,
            centre = %centre.identifier,
            radius = radius.get::<nautical_mile>(),
            angle = angle.get::<degree>(),
            clockwise,
            "built radius-to-fix arc"
        );

        Ok(Self {
            from,
            to,
            centre,
            arc: TurnArc::new(
                geodesy,
                from.location,
                centre.location,
                radius,
                angle,
                clockwise,
            ),
        })
    }

    /// The fix the arc starts at.
    #[must_use]
    pub fn from(&self) -> &'a Waypoint {
        self.from
    }

    /// The fix the arc ends at.
    #[must_use]
    pub fn to(&self) -> &'a Waypoint {
        self.to
    }

    #[must_use]
    pub fn centre(&self) -> &'a Waypoint {
        self.centre
    }

    #[must_use]
    pub fn radius(&self) -> Length {
        self.arc.radius()
    }

    /// Angle swept about the centre, in [0°, 360°).
    #[must_use]
    pub fn angle(&self) -> Angle {
        self.arc.sweep()
    }

    #[must_use]
    pub fn is_clockwise(&self) -> bool {
        self.arc.is_clockwise()
    }
}

impl<G: Geodesy> LegGeometry for RadiusArcLeg<'_, G> {
    fn kind(&self) -> LegKind {
        LegKind::RF
    }

    fn identifier(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.to.identifier)
    }

    fn bearing(&self) -> Option<Angle> {
        None
    }

    fn distance(&self) -> Length {
        self.arc.length()
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
        self.arc.distance_to_go(position)
    }

    fn guidance_parameters(
        &self,
        state: &AircraftState,
    ) -> Result<GuidanceParameters, UnsupportedOperation> {
        let guidance = self.arc.guidance_parameters(state);
        tracing::trace!(
            to = %self.to.identifier,
            track_angle_error = guidance.track_angle_error.get::<degree>(),
            cross_track_error = guidance.cross_track_error.get::<nautical_mile>(),
            phi_command = guidance.phi_command.get::<degree>(),
            "arc guidance"
        );
        Ok(guidance)
    }

    fn pseudo_waypoint_location(&self, distance_before_terminator: Length) -> Option<Location> {
        self.arc.point_before_exit(distance_before_terminator)
    }

    fn is_abeam(&self, position: &Location) -> bool {
        self.arc.is_abeam(position)
    }

    fn is_circular_arc(&self) -> bool {
        true
    }

    fn nominal_roll_angle(&self, ground_speed: Velocity) -> Angle {
        self.arc.nominal_roll_angle(ground_speed)
    }

    fn predicted_path(&self, _is_active: bool, _state: &AircraftState) -> Vec<PathVector> {
        vec![self.arc.path_vector()]
    }
}

/// Arcs have no single course, so transitions can neither start from nor lead into one.
impl<G: Geodesy> LegEnds for RadiusArcLeg<'_, G> {
    fn exit(&self) -> Option<(Location, Angle)> {
        None
    }

    fn entry(&self) -> Option<(Location, Angle)> {
        None
    }
}

impl<G> fmt::Display for RadiusArcLeg<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<RFLeg radius={} to={}>",
            format_nautical_miles(self.arc.radius()),
            self.to.identifier
        )
    }
}

#[cfg(test)]
mod tests {
    use super::RadiusArcLeg;
    use crate::error::LegError;
    use crate::geodesy::{Geodesy, GreatCircle};
    use crate::guidance::{coordinated_turn_bank, standard_gravity, AircraftState, ControlLaw, PathVector};
    use crate::legs::{LegEnds, LegGeometry, LegKind};
    use crate::location::tests::loc;
    use crate::navdata::{ProcedureLeg, TurnDirection};
    use crate::waypoint::{SpeedConstraint, Waypoint};
    use crate::Location;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f64::consts::PI;
    use uom::si::angle::degree;
    use uom::si::f64::{Angle, Length, Velocity};
    use uom::si::length::nautical_mile;
    use uom::si::velocity::knot;

    fn d(degrees: f64) -> Angle {
        Angle::new::<degree>(degrees)
    }
    fn nm(nautical_miles: f64) -> Length {
        Length::new::<nautical_mile>(nautical_miles)
    }

    fn centre() -> Waypoint {
        Waypoint::new("CTR", loc(47.5, 8.5))
    }

    /// A fix at `radius` NM from the centre, on the given radial.
    fn on_circle(identifier: &str, radial: f64, radius: f64) -> Waypoint {
        Waypoint::new(
            identifier,
            GreatCircle.project(&centre().location, d(radial), nm(radius)),
        )
    }

    fn state_at(position: Location) -> AircraftState {
        AircraftState::new(position, d(90.), Velocity::new::<knot>(250.))
    }

    #[rstest]
    #[case(TurnDirection::Right, 0., 90., true, 90.)]
    #[case(TurnDirection::Left, 0., 90., false, 270.)]
    #[case(TurnDirection::Left, 90., 0., false, 90.)]
    #[case(TurnDirection::Right, 90., 0., true, 270.)]
    #[case(TurnDirection::Unspecified, 0., 90., true, 90.)]
    #[case(TurnDirection::Unspecified, 90., 0., false, 90.)]
    #[case(TurnDirection::Unspecified, 350., 20., true, 30.)]
    fn sweep_from_turn_direction(
        #[case] turn_direction: TurnDirection,
        #[case] from_radial: f64,
        #[case] to_radial: f64,
        #[case] clockwise: bool,
        #[case] angle: f64,
    ) {
        let centre = centre();
        let from = on_circle("ARC01", from_radial, 5.);
        let to = on_circle("ARC02", to_radial, 5.);
        let leg = RadiusArcLeg::new(
            &from,
            &ProcedureLeg::to(&to)
                .with_arc(&centre, nm(5.))
                .turning(turn_direction),
        )
        .expect("complete arc record");

        assert_eq!(leg.is_clockwise(), clockwise);
        assert_relative_eq!(leg.angle().get::<degree>(), angle, epsilon = 1e-6);
        assert_relative_eq!(
            leg.distance().get::<nautical_mile>(),
            2. * PI * 5. / 360. * angle,
            epsilon = 1e-6
        );
    }

    #[test]
    fn quarter_turn_right() {
        let centre = centre();
        let from = on_circle("ARC01", 0., 5.);
        let to = on_circle("ARC02", 90., 5.)
            .with_speed_constraint(SpeedConstraint::AtOrBelow(Velocity::new::<knot>(210.)));
        let leg = RadiusArcLeg::new(
            &from,
            &ProcedureLeg::to(&to)
                .with_arc(&centre, nm(5.))
                .turning(TurnDirection::Right),
        )
        .expect("complete arc record");

        assert_eq!(leg.kind(), LegKind::RF);
        assert!(leg.is_clockwise());
        assert_relative_eq!(leg.angle().get::<degree>(), 90., epsilon = 1e-6);
        assert_relative_eq!(leg.distance().get::<nautical_mile>(), 7.854, epsilon = 1e-3);
        assert!(leg.bearing().is_none());
        assert!(leg.is_circular_arc());
        assert_eq!(leg.identifier(), "ARC02");
        assert_eq!(leg.initial_location(), Some(from.location));
        assert_eq!(leg.terminator_location(), Some(to.location));
        assert_eq!(leg.speed_constraint(), to.speed_constraint);
        assert_eq!(leg.centre().identifier, "CTR");
        assert!(leg.exit().is_none());
        insta::assert_snapshot!(leg, @"<RFLeg radius=5 to=ARC02>");
    }

    #[test]
    fn missing_record_data() {
        let centre = centre();
        let from = on_circle("ARC01", 0., 5.);
        let to = on_circle("ARC02", 90., 5.);

        let mut no_centre = ProcedureLeg::to(&to).with_arc(&centre, nm(5.));
        no_centre.arc_centre_fix = None;
        assert_eq!(
            RadiusArcLeg::new(&from, &no_centre).map(|_| ()),
            Err(LegError::MissingData {
                kind: LegKind::RF,
                waypoint: "ARC02".into(),
                field: "arc centre fix",
            })
        );

        let mut no_radius = ProcedureLeg::to(&to).with_arc(&centre, nm(5.));
        no_radius.arc_radius = None;
        assert_eq!(
            RadiusArcLeg::new(&from, &no_radius).map(|_| ()),
            Err(LegError::MissingData {
                kind: LegKind::RF,
                waypoint: "ARC02".into(),
                field: "arc radius",
            })
        );

        for radius in [0., -1., f64::NAN] {
            let record = ProcedureLeg::to(&to).with_arc(&centre, nm(radius));
            assert!(matches!(
                RadiusArcLeg::new(&from, &record),
                Err(LegError::InvalidRadius { .. })
            ));
        }
    }

    fn quarter_turn<'a>(
        centre: &'a Waypoint,
        from: &'a Waypoint,
        to: &'a Waypoint,
    ) -> RadiusArcLeg<'a> {
        RadiusArcLeg::new(
            from,
            &ProcedureLeg::to(to)
                .with_arc(centre, nm(5.))
                .turning(TurnDirection::Right),
        )
        .expect("complete arc record")
    }

    quickcheck::quickcheck! {
        fn abeam_once_past_the_entry_radial(radial: u16, offset: u8) -> bool {
            // positions are attributed to the nearer end of the arc; 225° is equally far from both
            let radial = f64::from(radial % 360);
            if radial == 225. {
                return true;
            }
            let centre = centre();
            let from = on_circle("ARC01", 0., 5.);
            let to = on_circle("ARC02", 90., 5.);
            let leg = quarter_turn(&centre, &from, &to);

            // anywhere from 4 to 6 NM out from the centre
            let distance = 4. + f64::from(offset) / 127.5;
            let position = GreatCircle.project(&centre.location, d(radial), nm(distance));
            leg.is_abeam(&position) == (radial < 225.)
        }
    }

    #[test]
    fn distance_to_go_runs_down_along_the_arc() {
        let centre = centre();
        let from = on_circle("ARC01", 0., 5.);
        let to = on_circle("ARC02", 90., 5.);
        let leg = quarter_turn(&centre, &from, &to);

        assert_relative_eq!(
            leg.distance_to_go(&on_circle("X", 350., 5.).location).get::<nautical_mile>(),
            leg.distance().get::<nautical_mile>(),
            epsilon = 1e-9
        );

        let remaining: Vec<f64> = (0..=9)
            .map(|step| f64::from(step) * 10.)
            .map(|radial| {
                leg.distance_to_go(&on_circle("X", radial, 5.).location)
                    .get::<nautical_mile>()
            })
            .collect();
        assert!(remaining.windows(2).all(|pair| pair[1] <= pair[0]));
        assert_relative_eq!(remaining[0], leg.distance().get::<nautical_mile>(), epsilon = 1e-6);
        assert_relative_eq!(remaining[9], 0., epsilon = 1e-6);

        assert_eq!(leg.distance_to_go(&on_circle("X", 120., 5.).location), nm(0.));
    }

    #[test]
    fn pseudo_waypoints_walk_back_along_the_arc() {
        let centre = centre();
        let from = on_circle("ARC01", 0., 5.);
        let to = on_circle("ARC02", 90., 5.);
        let leg = quarter_turn(&centre, &from, &to);

        assert_relative_eq!(
            leg.pseudo_waypoint_location(nm(0.)).expect("on the arc"),
            leg.terminator_location().expect("arcs end at a fix")
        );
        assert_relative_eq!(
            leg.pseudo_waypoint_location(leg.distance() / 2.).expect("on the arc"),
            on_circle("HALF", 45., 5.).location
        );
        assert_relative_eq!(
            leg.pseudo_waypoint_location(leg.distance()).expect("on the arc"),
            from.location
        );
        // the nominal quarter circle, which the computed length may fall a hair short of
        assert_relative_eq!(
            leg.pseudo_waypoint_location(nm(5. * PI / 2.)).expect("on the arc"),
            from.location
        );
        assert!(leg.pseudo_waypoint_location(leg.distance() * 1.01).is_none());
    }

    #[test]
    fn counter_clockwise_pseudo_waypoints() {
        let centre = centre();
        let from = on_circle("ARC01", 90., 5.);
        let to = on_circle("ARC02", 0., 5.);
        let leg = RadiusArcLeg::new(
            &from,
            &ProcedureLeg::to(&to)
                .with_arc(&centre, nm(5.))
                .turning(TurnDirection::Left),
        )
        .expect("complete arc record");

        assert_relative_eq!(
            leg.pseudo_waypoint_location(leg.distance() / 3.).expect("on the arc"),
            on_circle("P", 30., 5.).location
        );
    }

    #[rstest]
    #[case(TurnDirection::Right, 1.)]
    #[case(TurnDirection::Left, -1.)]
    fn nominal_roll_angle(#[case] turn_direction: TurnDirection, #[case] sign: f64) {
        let centre = centre();
        let from = on_circle("ARC01", 0., 5.);
        let to = on_circle("ARC02", 90., 5.);
        let leg = RadiusArcLeg::new(
            &from,
            &ProcedureLeg::to(&to)
                .with_arc(&centre, nm(5.))
                .turning(turn_direction),
        )
        .expect("complete arc record");

        let ground_speed = Velocity::new::<knot>(250.);
        let v: f64 = 250. * 1852. / 3600.;
        let expected = (v * v / (5. * 1852. * 9.81)).atan().to_degrees();
        assert_relative_eq!(
            leg.nominal_roll_angle(ground_speed).get::<degree>(),
            sign * expected,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            leg.nominal_roll_angle(ground_speed).get::<degree>(),
            sign * coordinated_turn_bank(ground_speed, nm(5.), standard_gravity()).get::<degree>(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn guidance_on_the_arc() {
        let centre = centre();
        let from = on_circle("ARC01", 0., 5.);
        let to = on_circle("ARC02", 90., 5.);
        let leg = quarter_turn(&centre, &from, &to);

        let position = on_circle("X", 30., 5.).location;
        let desired = GreatCircle.normalize(GreatCircle.bearing(&centre.location, &position) + d(90.));
        let state = AircraftState::new(position, desired, Velocity::new::<knot>(250.));
        let guidance = leg.guidance_parameters(&state).expect("arcs always guide");

        assert_eq!(guidance.law, ControlLaw::LateralPath);
        assert_relative_eq!(guidance.track_angle_error.get::<degree>(), 0., epsilon = 1e-9);
        assert_relative_eq!(guidance.cross_track_error.get::<nautical_mile>(), 0., epsilon = 1e-6);
        assert_relative_eq!(
            guidance.phi_command.get::<degree>(),
            leg.nominal_roll_angle(state.ground_speed).get::<degree>(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn predicted_path_is_one_arc() {
        let centre = centre();
        let from = on_circle("ARC01", 0., 5.);
        let to = on_circle("ARC02", 90., 5.);
        let leg = quarter_turn(&centre, &from, &to);

        let path = leg.predicted_path(true, &state_at(from.location));
        let [PathVector::Arc {
            start,
            centre: arc_centre,
            sweep_angle,
        }] = path.as_slice()
        else {
            panic!("expected a single arc, got {path:?}");
        };
        assert_eq!(*start, from.location);
        assert_eq!(*arc_centre, centre.location);
        assert_relative_eq!(sweep_angle.get::<degree>(), -90., epsilon = 1e-6);
    }
}
