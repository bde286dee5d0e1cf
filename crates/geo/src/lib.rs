//! Geodesic utilities for EcoRoute.
//!
//! This crate provides:
//! - Haversine distance calculations
//! - Nearest-point search with a stable first-minimum tie-break
//! - Planar interpolation used to move simulated vehicles toward a target
//!
//! # Example
//!
//! ```
//! use ecoroute_geo::{haversine_distance_meters, Coordinate};
//!
//! let plaza = Coordinate::new(-9.9300, -76.2425);
//! let market = Coordinate::new(-9.9310, -76.2420);
//!
//! let meters = haversine_distance_meters(&plaza, &market);
//! assert!(meters > 100.0 && meters < 150.0);
//! ```

mod error;
mod haversine;
pub mod nearest;

pub use error::{GeoError, Result};
pub use haversine::{
    approximate_distance, haversine_distance, haversine_distance_meters, EARTH_RADIUS_KM,
    EARTH_RADIUS_M,
};
pub use nearest::{lerp, nearest, Nearest};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// # Arguments
    /// * `latitude` - Latitude in degrees (-90 to 90)
    /// * `longitude` - Longitude in degrees (-180 to 180)
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Creates a coordinate, rejecting out-of-range or non-finite values.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({latitude}, {longitude}) is outside the valid range"
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Returns a coordinate displaced by a local north/east offset in meters.
    ///
    /// Uses a flat-earth approximation, accurate to well under a meter for
    /// the few-kilometer offsets used on a city map.
    pub fn offset_meters(&self, north_m: f64, east_m: f64) -> Self {
        let d_lat = north_m / EARTH_RADIUS_M;
        let d_lng = east_m / (EARTH_RADIUS_M * self.latitude.to_radians().cos());
        Self::new(
            self.latitude + d_lat.to_degrees(),
            self.longitude + d_lng.to_degrees(),
        )
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = GeoError;

    /// Parses `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected 'lat,lng', got '{s}'")))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("bad latitude '{lat}'")))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidCoordinate(format!("bad longitude '{lng}'")))?;
        Self::validated(lat, lng)
    }
}
