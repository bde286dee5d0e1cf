//! Nearest-point search and planar interpolation.

use crate::{haversine_distance_meters, Coordinate};
use serde::{Deserialize, Serialize};

/// Result of a nearest-point search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nearest {
    /// Position of the winning point in the input sequence
    pub index: usize,
    /// Distance from the origin in meters
    pub distance_m: f64,
}

/// Finds the point closest to `origin`.
///
/// Ties resolve to the earliest point in iteration order: a later point only
/// wins when it is strictly closer. Returns `None` for an empty input.
///
/// # Example
/// ```
/// use ecoroute_geo::{nearest, Coordinate};
///
/// let home = Coordinate::new(-9.93, -76.24);
/// let points = [home.offset_meters(300.0, 0.0), home.offset_meters(0.0, 120.0)];
///
/// let hit = nearest(&home, points.iter().copied()).unwrap();
/// assert_eq!(hit.index, 1);
/// ```
pub fn nearest<I>(origin: &Coordinate, points: I) -> Option<Nearest>
where
    I: IntoIterator<Item = Coordinate>,
{
    points
        .into_iter()
        .enumerate()
        .map(|(index, point)| Nearest {
            index,
            distance_m: haversine_distance_meters(origin, &point),
        })
        .fold(None, |best: Option<Nearest>, candidate| match best {
            Some(current) if candidate.distance_m >= current.distance_m => Some(current),
            // NaN never replaces a real distance
            Some(current) if candidate.distance_m.is_nan() => Some(current),
            _ => Some(candidate),
        })
}

/// Linear interpolation between two coordinates.
///
/// `fraction` of `0.0` returns `from`, `1.0` returns `to`. Latitude and
/// longitude are interpolated independently, which is not geodesic but is
/// indistinguishable at street scale.
#[inline]
pub fn lerp(from: &Coordinate, to: &Coordinate, fraction: f64) -> Coordinate {
    Coordinate::new(
        from.latitude + (to.latitude - from.latitude) * fraction,
        from.longitude + (to.longitude - from.longitude) * fraction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HOME: Coordinate = Coordinate { latitude: -9.93, longitude: -76.2425 };

    #[test]
    fn test_nearest_empty() {
        assert!(nearest(&HOME, std::iter::empty()).is_none());
    }

    #[test]
    fn test_nearest_picks_minimum() {
        let points = vec![
            HOME.offset_meters(900.0, 0.0),
            HOME.offset_meters(0.0, 150.0),
            HOME.offset_meters(-400.0, 0.0),
        ];
        let hit = nearest(&HOME, points).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.distance_m - 150.0).abs() < 0.5);
    }

    #[test]
    fn test_nearest_tie_prefers_first() {
        let p = HOME.offset_meters(250.0, 0.0);
        let hit = nearest(&HOME, vec![HOME.offset_meters(800.0, 0.0), p, p, p]).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn test_nearest_skips_nan() {
        let points = vec![Coordinate::new(f64::NAN, 0.0), HOME.offset_meters(10.0, 0.0)];
        let hit = nearest(&HOME, points).unwrap();
        assert_eq!(hit.index, 1);
    }

    #[test]
    fn test_lerp_endpoints() {
        let target = HOME.offset_meters(1000.0, 1000.0);
        assert_eq!(lerp(&HOME, &target, 0.0), HOME);
        assert_eq!(lerp(&HOME, &target, 1.0), target);

        let mid = lerp(&HOME, &target, 0.5);
        assert!((mid.latitude - (HOME.latitude + target.latitude) / 2.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_nearest_is_minimal(offsets in prop::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 1..40)) {
            let points: Vec<Coordinate> = offsets
                .iter()
                .map(|(n, e)| HOME.offset_meters(*n, *e))
                .collect();
            let hit = nearest(&HOME, points.iter().copied()).unwrap();

            for (i, p) in points.iter().enumerate() {
                let d = haversine_distance_meters(&HOME, p);
                prop_assert!(hit.distance_m <= d);
                if i < hit.index {
                    // every earlier point is strictly farther
                    prop_assert!(d > hit.distance_m);
                }
            }
        }
    }
}
