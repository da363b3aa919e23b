use crate::util::BoundedAngle;
use crate::Vector3;
use std::fmt;
use std::fmt::Display;
use std::marker::PhantomData;
use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length};
use uom::ConstZero;

#[cfg(any(test, feature = "approx"))]
use approx::{AbsDiffEq, RelativeEq};
#[cfg(any(test, feature = "approx"))]
use uom::si::length::meter;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An Earth-bound latitude/longitude position, as used for fixes and aircraft positions.
///
/// Locations carry no altitude; the lateral geometry of a flight plan is computed on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    // NOTE: uom does not guarantee how these angles are normalized, so the accessors normalize
    // on the way out.
    latitude: Angle,
    longitude: Angle,
}

impl Location {
    /// Constructs a location from latitude and longitude.
    ///
    /// The latitude must be in [-90°,90°] % 360°. If it is not, this function returns `None`.
    #[must_use]
    pub fn build(
        Components {
            latitude,
            longitude,
        }: Components,
    ) -> Option<Self> {
        Some(
            Self::builder()
                .latitude(latitude)?
                .longitude(longitude)
                .build(),
        )
    }

    /// Provides a constructor for a [`Location`].
    pub fn builder() -> Builder<MissingLatitude, MissingLongitude> {
        Builder {
            under_construction: Location {
                latitude: Angle::ZERO,
                longitude: Angle::ZERO,
            },
            has: (PhantomData, PhantomData),
        }
    }

    /// Returns the angle north of the equator, in [-90°, 90°].
    #[must_use]
    pub fn latitude(&self) -> Angle {
        Angle::new::<radian>(BoundedAngle::new(self.latitude).to_signed_range())
    }

    /// Returns the angle east of the prime meridian, in (-180°, 180°].
    #[must_use]
    pub fn longitude(&self) -> Angle {
        Angle::new::<radian>(BoundedAngle::new(self.longitude).to_signed_range())
    }

    /// The unit normal to the sphere at this location (the "n-vector"), in an earth-centred frame
    /// with X through the prime meridian and Z through the north pole.
    pub(crate) fn to_nvector(self) -> Vector3 {
        let lat = self.latitude.get::<radian>();
        let lon = self.longitude.get::<radian>();
        Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Inverse of [`Location::to_nvector`]. `n` need not be normalized.
    pub(crate) fn from_nvector(n: Vector3) -> Self {
        let lat = n.z.atan2(n.x.hypot(n.y));
        let lon = n.y.atan2(n.x);
        Self {
            latitude: Angle::new::<radian>(lat),
            longitude: Angle::new::<radian>(lon),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat = self.latitude();
        let lat_is_positive = lat.is_sign_positive();
        let lat = lat.abs().get::<degree>();
        let lon = self.longitude();
        let lon_is_positive = lon.is_sign_positive();
        let lon = lon.abs().get::<degree>();
        match (lat_is_positive, lon_is_positive) {
            (true, true) => write!(f, "{lat}°N, {lon}°E"),
            (true, false) => write!(f, "{lat}°N, {lon}°W"),
            (false, true) => write!(f, "{lat}°S, {lon}°E"),
            (false, false) => write!(f, "{lat}°S, {lon}°W"),
        }
    }
}

/// Computes the central angle between the given lat/lon points.
///
/// To turn this angle into [great-circle distance], multiply this value by the radius of the
/// sphere.
///
/// The current implementation computes this [using the archaversine] (inverse haversine).
///
/// [great-circle distance]: https://en.wikipedia.org/wiki/Great-circle_distance
/// [using the archaversine]: https://en.wikipedia.org/wiki/Haversine_formula#Formulation
pub(crate) fn central_angle_by_inverse_haversine(a: &Location, b: &Location) -> Angle {
    let lat_a = a.latitude.get::<radian>(); // φ1
    let lat_b = b.latitude.get::<radian>(); // φ2
    let lon_a = a.longitude.get::<radian>(); // λ1
    let lon_b = b.longitude.get::<radian>(); // λ2
    let delta_lat = lat_b - lat_a;
    let delta_lon = lon_b - lon_a;

    let inner = 1. - delta_lat.cos() + lat_a.cos() * lat_b.cos() * (1. - delta_lon.cos());
    // rounding can push `inner` a hair outside [0, 2] for antipodal or coincident points
    Angle::new::<radian>(2. * (inner / 2.).clamp(0., 1.).sqrt().asin())
}

#[cfg(any(test, feature = "approx"))]
impl Location {
    fn surface_distance(&self, other: &Self) -> Length {
        crate::geodesy::earth_radius() * central_angle_by_inverse_haversine(self, other).get::<radian>()
    }
}

#[cfg(any(test, feature = "approx"))]
impl AbsDiffEq<Self> for Location {
    type Epsilon = Length;

    fn default_epsilon() -> Self::Epsilon {
        // positions come out of n-vector round trips, so millimetres are realistic. half a meter
        // is still far below anything that matters for lateral guidance.
        Length::new::<meter>(0.5)
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.surface_distance(other) <= epsilon
    }
}

#[cfg(any(test, feature = "approx"))]
impl RelativeEq for Location {
    fn default_max_relative() -> Self::Epsilon {
        Length::new::<meter>(f64::default_max_relative())
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        _max_relative: Self::Epsilon,
    ) -> bool {
        // there's no meaningful "relative" scale for a position on the globe
        self.abs_diff_eq(other, epsilon)
    }
}

/// Argument type for [`Location::build`].
#[derive(Debug, Default)]
#[must_use]
pub struct Components {
    /// The latitude angle of the proposed [`Location`].
    ///
    /// The latitude must be in [-90°,90°] % 360°. If it is not, [`Location::build`] returns
    /// `None`.
    pub latitude: Angle,

    /// The longitude angle of the proposed [`Location`].
    pub longitude: Angle,
}

/// Used to indicate that a partially-constructed [`Location`] is missing the latitude component.
pub struct MissingLatitude;
/// Used to indicate that a partially-constructed [`Location`] has the latitude component set.
pub struct HasLatitude;
/// Used to indicate that a partially-constructed [`Location`] is missing the longitude component.
pub struct MissingLongitude;
/// Used to indicate that a partially-constructed [`Location`] has the longitude component set.
pub struct HasLongitude;

/// [Builder] for a [`Location`].
///
/// Construct one through [`Location::builder`], and finalize with [`Builder::build`].
///
/// [Builder]: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
#[derive(Debug)]
#[must_use]
pub struct Builder<Latitude, Longitude> {
    under_construction: Location,
    has: (PhantomData<Latitude>, PhantomData<Longitude>),
}

// manual impls of Clone and Copy to avoid requiring the markers to be Copy + Clone
impl<L1, L2> Clone for Builder<L1, L2> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<L1, L2> Copy for Builder<L1, L2> {}

impl<L1, L2> Builder<L1, L2> {
    /// Sets the latitudal angle of the [`Location`]-to-be.
    ///
    /// The latitude must be in [-90°,90°] % 360°. If it is not, this function returns `None`.
    pub fn latitude(mut self, latitude: impl Into<Angle>) -> Option<Builder<HasLatitude, L2>> {
        let latitude = latitude.into();
        let latitude_in_signed_radians = BoundedAngle::new(latitude).to_signed_range();
        if !(-std::f64::consts::FRAC_PI_2..=std::f64::consts::FRAC_PI_2)
            .contains(&latitude_in_signed_radians)
        {
            None
        } else {
            self.under_construction.latitude = latitude;
            Some(Builder {
                under_construction: self.under_construction,
                has: (PhantomData::<HasLatitude>, self.has.1),
            })
        }
    }

    /// Sets the longitudal angle of the [`Location`]-to-be.
    pub fn longitude(mut self, longitude: impl Into<Angle>) -> Builder<L1, HasLongitude> {
        self.under_construction.longitude = longitude.into();
        Builder {
            under_construction: self.under_construction,
            has: (self.has.0, PhantomData::<HasLongitude>),
        }
    }
}

impl Builder<HasLatitude, HasLongitude> {
    #[must_use]
    pub fn build(self) -> Location {
        self.under_construction
    }
}
