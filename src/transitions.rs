//! Transitions: the turns that join consecutive legs whose geometries do not meet.
//!
//! Every kind of transition may only join certain kinds of legs. Constructors check this at
//! runtime for any [`LegGeometry`]; where the concrete leg types are known at compile time, the
//! typed constructors ([`Type4Transition::after`], [`Type6Transition::between`]) are bounded by
//! the marker traits [`Type4Previous`], [`Type6Previous`] and [`Type6Next`] so that an illegal
//! pairing does not compile in the first place.

use crate::error::TransitionError;
use crate::guidance::{AircraftState, GuidanceParameters, PathVector};
use crate::legs::{DirectFixLeg, LegEnds, LegGeometry, LegKind, TrackFixLeg};
use crate::Location;
use std::fmt;
use uom::si::f64::{Angle, Length};
use uom::ConstZero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod type4;
mod type6;

pub use type4::{NextLegExit, Type4Transition};
pub use type6::Type6Transition;

/// The kinds of transition this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransitionKind {
    /// A turn onto a leg whose start is defined by the turn itself.
    Type4,
    /// A fly-by turn between two legs that share a fix.
    Type6,
}

impl TransitionKind {
    /// Whether a transition of this kind may follow a leg of kind `leg`.
    #[must_use]
    pub fn allows_previous(self, leg: LegKind) -> bool {
        use LegKind::*;
        match self {
            Self::Type4 => matches!(leg, AF | CF | DF | TF),
            Self::Type6 => matches!(leg, CD | CF | CI | DF | TF | VI | VD),
        }
    }

    /// Whether a transition of this kind may lead into a leg of kind `leg`.
    #[must_use]
    pub fn allows_next(self, leg: LegKind) -> bool {
        use LegKind::*;
        match self {
            Self::Type4 => matches!(leg, CA | CD | CI | CR | DF | VA | VD | VI | VM | VR),
            Self::Type6 => matches!(leg, AF | CF | FA | FM | TF),
        }
    }

    pub(crate) fn check(self, previous: LegKind, next: LegKind) -> Result<(), TransitionError> {
        if !self.allows_previous(previous) {
            return Err(TransitionError::IncompatiblePrevious {
                transition: self,
                leg: previous,
            });
        }
        if !self.allows_next(next) {
            return Err(TransitionError::IncompatibleNext {
                transition: self,
                leg: next,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type4 => f.write_str("type 4"),
            Self::Type6 => f.write_str("type 6"),
        }
    }
}

/// What every transition can answer about the turn it flies.
pub trait Transition {
    /// Which ARINC 424 transition this is, and so which legs it may join.
    fn kind(&self) -> TransitionKind;

    /// Where the turn hands the aircraft over to the next leg.
    fn fly_through_point(&self) -> Location;

    fn turn_centre(&self) -> Location;

    fn radius(&self) -> Length;

    /// True for right turns.
    fn is_clockwise(&self) -> bool;

    /// Angle turned through, in [0°, 360°).
    fn sweep_angle(&self) -> Angle;

    /// Length of the turn's path.
    fn distance(&self) -> Length;

    /// True once guidance should hand over from the previous leg to this transition.
    fn is_abeam(&self, position: &Location) -> bool;

    /// Distance left to fly along the turn from `position`. The whole turn before it starts, and
    /// zero once it is complete.
    fn distance_to_go(&self, position: &Location) -> Length;

    /// True once guidance should hand over from this transition to the next leg.
    fn is_complete(&self, position: &Location) -> bool {
        self.distance_to_go(position) <= Length::ZERO
    }

    /// Lateral path guidance around the turn, with the bank of a coordinated turn at the aircraft's
    /// ground speed as feed-forward.
    fn guidance_parameters(&self, state: &AircraftState) -> GuidanceParameters;

    /// The turn to draw. Empty when there is nothing to turn through.
    fn predicted_path(&self) -> Vec<PathVector>;
}

/// Legs a [`Type4Transition`] may follow.
pub trait Type4Previous: LegGeometry + LegEnds {}

/// Legs a [`Type6Transition`] may follow.
pub trait Type6Previous: LegGeometry + LegEnds {}

/// Legs a [`Type6Transition`] may lead into.
pub trait Type6Next: LegGeometry + LegEnds {}

impl<G: crate::Geodesy> Type4Previous for DirectFixLeg<'_, G> {}
impl<G: crate::Geodesy> Type4Previous for TrackFixLeg<'_, G> {}

impl<G: crate::Geodesy> Type6Previous for DirectFixLeg<'_, G> {}
impl<G: crate::Geodesy> Type6Previous for TrackFixLeg<'_, G> {}

impl<G: crate::Geodesy> Type6Next for TrackFixLeg<'_, G> {}

/// The fix and course a transition starts from, ie where and how the previous leg ends.
fn exit_of<P: LegGeometry + LegEnds + ?Sized>(
    previous: &P,
) -> Result<(Location, Angle), TransitionError> {
    previous
        .exit()
        .ok_or(TransitionError::NoExitCourse { leg: previous.kind() })
}

/// The fix and course a transition leads into, ie where and how the next leg starts.
fn entry_of<N: LegGeometry + LegEnds + ?Sized>(
    next: &N,
) -> Result<(Location, Angle), TransitionError> {
    next.entry()
        .ok_or(TransitionError::NoEntryCourse { leg: next.kind() })
}
