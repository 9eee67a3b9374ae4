//! Geographic coordinates and great-circle distance.

use geo::{Distance, Haversine, Point};

use crate::constants::EPSILON;

/// A latitude/longitude pair in degrees.
///
/// Equality uses an absolute tolerance of [`EPSILON`] on both components —
/// coordinates arrive as parsed `f64`s from JSON and two stops at "the same"
/// location rarely compare bit-identical.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn as_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    /// Great-circle distance to `other`, in meters.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        Haversine::distance(self.as_point(), other.as_point())
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        (self.lat - other.lat).abs() < EPSILON && (self.lng - other.lng).abs() < EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_identical_points_is_zero() {
        let a = Coordinate::new(55.611087, 37.20829);
        assert!(approx::abs_diff_eq!(a.distance_to(a), 0.0, epsilon = EPSILON));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(55.611087, 37.20829);
        let b = Coordinate::new(55.595884, 37.209755);
        assert!(approx::abs_diff_eq!(a.distance_to(b), b.distance_to(a), epsilon = EPSILON));
    }

    #[test]
    fn coordinate_equality_tolerates_epsilon() {
        let a = Coordinate::new(1.0, 2.0);
        let b = Coordinate::new(1.0 + 1e-7, 2.0 - 1e-7);
        assert_eq!(a, b);
        let c = Coordinate::new(1.0 + 1e-3, 2.0);
        assert_ne!(a, c);
    }
}
