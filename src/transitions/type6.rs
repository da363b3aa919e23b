use super::{entry_of, exit_of, Transition, TransitionKind, Type6Next, Type6Previous};
use crate::arc::TurnArc;
use crate::config::TurnConfig;
use crate::error::TransitionError;
use crate::geodesy::{Geodesy, GreatCircle};
use crate::guidance::{AircraftState, GuidanceParameters, PathVector};
use crate::legs::{LegEnds, LegGeometry, LegKind};
use crate::Location;
use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length};
use uom::si::length::nautical_mile;
use uom::ConstZero;

/// Largest course change flown as a fly-by. Beyond it the turn would start further back than any
/// sensible leg is long, and at 180° it would start infinitely far back.
const MAX_FLY_BY_TURN_DEGREES: f64 = 120.;

/// A fly-by turn at the fix shared by two straight legs.
///
/// The turn starts before the fix, by the distance needed to roll out on the next leg's course,
/// and cuts the corner: the aircraft never overflies the fix itself.
#[derive(Debug, Clone)]
pub struct Type6Transition<G = GreatCircle> {
    previous: LegKind,
    next: LegKind,
    fix: Location,
    anticipation: Length,
    fly_through_point: Location,
    arc: TurnArc<G>,
}

impl Type6Transition {
    /// The turn between two legs whose kinds are only known at runtime.
    pub fn new<P, N>(previous: &P, next: &N, config: &TurnConfig) -> Result<Self, TransitionError>
    where
        P: LegGeometry + LegEnds + ?Sized,
        N: LegGeometry + LegEnds + ?Sized,
    {
        Self::with_geodesy(GreatCircle, previous, next, config)
    }

    /// The turn between two legs that are statically known to be joinable.
    pub fn between<P: Type6Previous, N: Type6Next>(
        previous: &P,
        next: &N,
        config: &TurnConfig,
    ) -> Result<Self, TransitionError> {
        Self::new(previous, next, config)
    }
}

impl<G: Geodesy> Type6Transition<G> {
    /// As [`Type6Transition::new`], but with the turn laid out by `geodesy`.
    ///
    /// Fails if either leg is of a kind the transition cannot join, if the legs do not meet at a
    /// fix with a defined course, or if the course change is too large to fly by.
    pub fn with_geodesy<P, N>(
        geodesy: G,
        previous: &P,
        next: &N,
        config: &TurnConfig,
    ) -> Result<Self, TransitionError>
    where
        P: LegGeometry + LegEnds + ?Sized,
        N: LegGeometry + LegEnds + ?Sized,
    {
        TransitionKind::Type6.check(previous.kind(), next.kind())?;
        let (fix, inbound) = exit_of(previous)?;
        let (_, outbound) = entry_of(next)?;

        let course_change = geodesy.angle_diff(inbound, outbound);
        let clockwise = course_change > Angle::ZERO;
        let sweep = course_change.abs();
        if sweep.get::<degree>() > MAX_FLY_BY_TURN_DEGREES {
            tracing::debug!(
                previous = %previous.kind(),
                next = %next.kind(),
                course_change = course_change.get::<degree>(),
                "course change too large to fly by"
            );
            return Err(TransitionError::CourseReversal {
                previous: previous.kind(),
                next: next.kind(),
            });
        }
        let radius = config.turn_radius();
        let anticipation = radius * (sweep.get::<radian>() / 2.).tan();

        if anticipation > previous.distance() {
            tracing::warn!(
                previous = %previous.kind(),
                anticipation = anticipation.get::<nautical_mile>(),
                leg = previous.distance().get::<nautical_mile>(),
                "fly-by turn starts before the previous leg does"
            );
        }

        let entry = geodesy.project(&fix, geodesy.normalize(inbound + Angle::HALF_TURN), anticipation);
        let fly_through_point = geodesy.project(&fix, outbound, anticipation);
        let course_at_entry = if anticipation > Length::ZERO {
            geodesy.bearing(&entry, &fix)
        } else {
            inbound
        };
        let towards_centre = if clockwise {
            course_at_entry + Angle::HALF_TURN / 2.
        } else {
            course_at_entry - Angle::HALF_TURN / 2.
        };
        let centre = geodesy.project(&entry, geodesy.normalize(towards_centre), radius);

        tracing::debug!(
            course_change = course_change.get::<degree>(),
            radius = radius.get::<nautical_mile>(),
            anticipation = anticipation.get::<nautical_mile>(),
            "built type 6 transition"
        );

        Ok(Self {
            previous: previous.kind(),
            next: next.kind(),
            fix,
            anticipation,
            fly_through_point,
            arc: TurnArc::new(geodesy, entry, centre, radius, sweep, clockwise),
        })
    }

    /// Kind of the leg the turn starts from.
    pub fn previous_kind(&self) -> LegKind {
        self.previous
    }

    /// Kind of the leg the turn leads into.
    pub fn next_kind(&self) -> LegKind {
        self.next
    }

    /// The fix the turn flies by.
    pub fn fix(&self) -> Location {
        self.fix
    }

    /// Where the turn starts, on the previous leg.
    pub fn entry_point(&self) -> Location {
        self.arc.start()
    }

    /// How far before the fix the turn starts.
    pub fn anticipation(&self) -> Length {
        self.anticipation
    }
}

impl<G: Geodesy> Transition for Type6Transition<G> {
    fn kind(&self) -> TransitionKind {
        TransitionKind::Type6
    }

    fn fly_through_point(&self) -> Location {
        self.fly_through_point
    }

    fn turn_centre(&self) -> Location {
        self.arc.centre()
    }

    fn radius(&self) -> Length {
        self.arc.radius()
    }

    fn is_clockwise(&self) -> bool {
        self.arc.is_clockwise()
    }

    fn sweep_angle(&self) -> Angle {
        self.arc.sweep()
    }

    fn distance(&self) -> Length {
        self.arc.length()
    }

    fn is_abeam(&self, position: &Location) -> bool {
        self.arc.is_abeam(position)
    }

    fn distance_to_go(&self, position: &Location) -> Length {
        self.arc.distance_to_go(position)
    }

    fn guidance_parameters(&self, state: &AircraftState) -> GuidanceParameters {
        let guidance = self.arc.guidance_parameters(state);
        tracing::trace!(
            cross_track_error = guidance.cross_track_error.get::<nautical_mile>(),
            phi_command = guidance.phi_command.get::<degree>(),
            "type 6 guidance"
        );
        guidance
    }

    fn predicted_path(&self) -> Vec<PathVector> {
        if self.arc.sweep() > Angle::ZERO {
            vec![self.arc.path_vector()]
        } else {
            Vec::new()
        }
    }
}
