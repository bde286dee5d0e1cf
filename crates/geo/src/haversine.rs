//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two points
//! on a sphere given their longitudes and latitudes.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// # Example
/// ```
/// use ecoroute_geo::{haversine_distance, Coordinate};
///
/// let lima = Coordinate::new(-12.0464, -77.0428);
/// let huanuco = Coordinate::new(-9.9306, -76.2422);
///
/// let distance = haversine_distance(&lima, &huanuco);
/// assert!((distance - 251.0).abs() < 5.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_KM)
}

/// Calculates the great-circle distance between two coordinates in meters.
///
/// Identical coordinates yield exactly `0.0`.
#[inline]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    haversine_distance_with_radius(from, to, EARTH_RADIUS_M)
}

#[inline]
fn haversine_distance_with_radius(from: &Coordinate, to: &Coordinate, radius: f64) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

/// Fast approximate distance in kilometers (equirectangular projection).
///
/// Cheaper than Haversine and accurate at city scale; callers comparing
/// against a threshold should still use the exact form.
#[inline]
pub fn approximate_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let y = lat2 - lat1;

    (x * x + y * y).sqrt() * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LIMA: Coordinate = Coordinate { latitude: -12.0464, longitude: -77.0428 };
    const HUANUCO: Coordinate = Coordinate { latitude: -9.9306, longitude: -76.2422 };
    const CENTRO: Coordinate = Coordinate { latitude: -9.9300, longitude: -76.2425 };
    const PAUCARBAMBA: Coordinate = Coordinate { latitude: -9.9365, longitude: -76.2400 };

    #[test]
    fn test_lima_to_huanuco() {
        let distance = haversine_distance(&LIMA, &HUANUCO);
        assert!((distance - 251.0).abs() < 5.0, "Lima-Huanuco: {}", distance);
    }

    #[test]
    fn test_city_scale_distance() {
        let meters = haversine_distance_meters(&CENTRO, &PAUCARBAMBA);
        // ~770 m across town
        assert!((meters - 772.0).abs() < 10.0, "Centro-Paucarbamba: {}", meters);
    }

    #[test]
    fn test_same_point_zero_distance() {
        assert_eq!(haversine_distance_meters(&CENTRO, &CENTRO), 0.0);
        assert_eq!(haversine_distance(&LIMA, &LIMA), 0.0);
    }

    #[test]
    fn test_meters_conversion() {
        let km = haversine_distance(&LIMA, &HUANUCO);
        let meters = haversine_distance_meters(&LIMA, &HUANUCO);
        assert!((meters - km * 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_approximate_distance_reasonable() {
        let exact = haversine_distance(&CENTRO, &PAUCARBAMBA);
        let approx = approximate_distance(&CENTRO, &PAUCARBAMBA);
        let error = ((approx - exact) / exact).abs();
        assert!(error < 0.01, "Error: {}%", error * 100.0);
    }

    proptest! {
        #[test]
        fn prop_identical_points_are_zero(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let p = Coordinate::new(lat, lng);
            prop_assert_eq!(haversine_distance_meters(&p, &p), 0.0);
        }

        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -89.0f64..89.0, lng1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0, lng2 in -179.0f64..179.0,
        ) {
            let a = Coordinate::new(lat1, lng1);
            let b = Coordinate::new(lat2, lng2);
            let d1 = haversine_distance_meters(&a, &b);
            let d2 = haversine_distance_meters(&b, &a);
            prop_assert!((d1 - d2).abs() < 1e-6);
            prop_assert!(d1 >= 0.0);
        }
    }
}
