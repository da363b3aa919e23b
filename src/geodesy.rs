//! Great-circle computations on the surface of the earth.
//!
//! Everything in this crate that needs a bearing, a distance, or a projected position goes through
//! the [`Geodesy`] trait, so that the earth model is an explicit collaborator rather than something
//! the legs reach out for. [`GreatCircle`] is the model the crate uses by default.

use crate::location::{central_angle_by_inverse_haversine, Location};
use crate::util::{normalize, signed_difference};
use crate::Vector3;
use uom::si::angle::radian;
use uom::si::f64::{Angle, Length};
use uom::si::length::{meter, nautical_mile};
use uom::ConstZero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Radius of the spherical earth, in nautical miles, chosen such that one arc-minute of a great
/// circle is exactly one nautical mile.
pub const EARTH_RADIUS_NM: f64 = 10_800. / std::f64::consts::PI;

/// Below this magnitude the cross product of two n-vectors is treated as zero, ie the two points
/// are coincident (or antipodal) and there is no unique great circle through them.
const DEGENERATE_NORM: f64 = 1e-12;

/// Radius of the spherical earth model used by [`GreatCircle`].
#[must_use]
pub fn earth_radius() -> Length {
    Length::new::<nautical_mile>(EARTH_RADIUS_NM)
}

/// The geodesy collaborator used to construct and query legs and transitions.
///
/// Implementations must be pure: the same inputs always give the same outputs.
pub trait Geodesy {
    /// The radius used to turn central angles into surface distances.
    fn earth_radius(&self) -> Length;

    /// Initial true course from `from` to `to`, in [0°, 360°).
    ///
    /// If the points coincide the course is undefined, and this returns 0°.
    fn bearing(&self, from: &Location, to: &Location) -> Angle;

    /// Surface distance between `from` and `to`.
    fn distance(&self, from: &Location, to: &Location) -> Length;

    /// The location reached by travelling `distance` from `origin` along the great circle that
    /// leaves `origin` on `bearing`.
    fn project(&self, origin: &Location, bearing: Angle, distance: Length) -> Location;

    /// Returns `to - from`, normalized into (-180°, 180°].
    fn angle_diff(&self, from: Angle, to: Angle) -> Angle {
        signed_difference(from, to)
    }

    /// Normalizes `angle` into [0°, 360°).
    fn normalize(&self, angle: Angle) -> Angle {
        normalize(angle)
    }

    /// Signed distance of `position` from the great-circle track running from `start` to `end`.
    ///
    /// Positive when `position` is to the right of the track.
    fn cross_track_distance(&self, start: &Location, end: &Location, position: &Location) -> Length {
        let radius = self.earth_radius();
        let d13 = self.distance(start, position).get::<meter>() / radius.get::<meter>();
        let off_track = self.angle_diff(self.bearing(start, end), self.bearing(start, position));
        radius * (d13.sin() * off_track.get::<radian>().sin()).asin()
    }

    /// Signed distance from `start` to the point on the track from `start` to `end` that is
    /// abeam `position`.
    ///
    /// Negative when `position` is abeam a point behind `start`.
    fn along_track_distance(&self, start: &Location, end: &Location, position: &Location) -> Length {
        let radius = self.earth_radius();
        let d13 = self.distance(start, position).get::<meter>() / radius.get::<meter>();
        let off_track = self.angle_diff(self.bearing(start, end), self.bearing(start, position));
        // napier's rules on the right spherical triangle start-abeam-position:
        // tan(along) = tan(d13) * cos(off_track)
        radius * (d13.sin() * off_track.get::<radian>().cos()).atan2(d13.cos())
    }
}

/// Great-circle geodesy on a spherical earth of radius [`EARTH_RADIUS_NM`].
///
/// This is the same model flight-management computers traditionally use for lateral navigation:
/// one degree of latitude (or of longitude on the equator) is exactly 60 NM.
///
/// ```
/// use lnav::{Geodesy, GreatCircle, Location, location::Components};
/// use uom::si::angle::degree;
/// use uom::si::f64::Angle;
/// use uom::si::length::nautical_mile;
///
/// let origin = Location::build(Components {
///     latitude: Angle::new::<degree>(0.),
///     longitude: Angle::new::<degree>(0.),
/// }).expect("latitude is in [-90, 90]");
/// let east = Location::build(Components {
///     latitude: Angle::new::<degree>(0.),
///     longitude: Angle::new::<degree>(1.),
/// }).expect("latitude is in [-90, 90]");
///
/// let distance = GreatCircle.distance(&origin, &east);
/// assert!((distance.get::<nautical_mile>() - 60.).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GreatCircle;

impl GreatCircle {
    /// Unit vectors pointing (east, north) in the plane tangent to the sphere at `n`.
    ///
    /// At the poles, where east is undefined, courses are measured relative to the prime meridian.
    fn local_frame(n: &Vector3) -> (Vector3, Vector3) {
        let east = Vector3::z().cross(n);
        let east = if east.norm() < DEGENERATE_NORM {
            Vector3::y()
        } else {
            east.normalize()
        };
        let north = n.cross(&east).normalize();
        (east, north)
    }
}

impl Geodesy for GreatCircle {
    fn earth_radius(&self) -> Length {
        earth_radius()
    }

    fn bearing(&self, from: &Location, to: &Location) -> Angle {
        let a = from.to_nvector();
        let b = to.to_nvector();

        let normal = a.cross(&b);
        if normal.norm() < DEGENERATE_NORM {
            return Angle::ZERO;
        }

        // tangent at `a` pointing along the great circle towards `b`
        let direction = normal.cross(&a);
        let (east, north) = Self::local_frame(&a);
        normalize(Angle::new::<radian>(
            direction.dot(&east).atan2(direction.dot(&north)),
        ))
    }

    fn distance(&self, from: &Location, to: &Location) -> Length {
        self.earth_radius() * central_angle_by_inverse_haversine(from, to).get::<radian>()
    }

    fn project(&self, origin: &Location, bearing: Angle, distance: Length) -> Location {
        let a = origin.to_nvector();
        let delta = distance.get::<meter>() / self.earth_radius().get::<meter>();
        let theta = bearing.get::<radian>();

        let (east, north) = Self::local_frame(&a);
        let direction = north * theta.cos() + east * theta.sin();
        Location::from_nvector(a * delta.cos() + direction * delta.sin())
    }
}
