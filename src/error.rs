use crate::legs::LegKind;
use crate::transitions::TransitionKind;
use uom::si::f64::Length;
use uom::si::length::nautical_mile;

/// Why a leg could not be built from its navigation-database record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LegError {
    #[error("{kind} leg to {waypoint} is missing its {field}")]
    MissingData {
        kind: LegKind,
        waypoint: String,
        field: &'static str,
    },
    #[error("{kind} leg to {waypoint} has a non-positive radius of {} NM", .radius.get::<nautical_mile>())]
    InvalidRadius {
        kind: LegKind,
        waypoint: String,
        radius: Length,
    },
}

/// Why a transition could not join two legs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("a {transition} transition cannot follow a {leg} leg")]
    IncompatiblePrevious {
        transition: TransitionKind,
        leg: LegKind,
    },
    #[error("a {transition} transition cannot lead into a {leg} leg")]
    IncompatibleNext {
        transition: TransitionKind,
        leg: LegKind,
    },
    #[error("a {leg} leg has no terminating fix and course for a transition to start from")]
    NoExitCourse { leg: LegKind },
    #[error("a {leg} leg has no starting fix and course for a transition to lead into")]
    NoEntryCourse { leg: LegKind },
    #[error("a fly-by turn from a {previous} leg onto a {next} leg cannot change course by more than 120°")]
    CourseReversal { previous: LegKind, next: LegKind },
}

/// The leg does not support the requested query.
///
/// This is distinct from a valid result that happens to be zero: callers are expected to fall back
/// to some other source for the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation} is not supported by {leg} legs")]
pub struct UnsupportedOperation {
    pub leg: LegKind,
    /// What was asked of the leg, eg `"lateral guidance"`.
    pub operation: &'static str,
}
