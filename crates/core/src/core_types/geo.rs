//! Planar geometry on latitude/longitude pairs.
//!
//! Distances are measured in coordinate-degree space, not geodesically.
//! Fire fronts move a few hundredths of a degree per tick, so the planar
//! approximation is what the merge threshold is calibrated against.

use crate::core_types::units::Radians;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planar vector type for coordinate deltas (`x` = latitude, `y` = longitude).
pub type Vec2 = Vector2<f64>;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[inline]
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    /// Both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    #[inline]
    #[must_use]
    pub fn to_vector(self) -> Vec2 {
        Vec2::new(self.lat, self.lng)
    }

    #[inline]
    #[must_use]
    pub fn from_vector(v: Vec2) -> Self {
        LatLng::new(v.x, v.y)
    }

    /// Euclidean distance in degree space.
    #[inline]
    pub fn distance_to(self, other: LatLng) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }

    /// Move `distance` degrees along `heading`.
    ///
    /// Heading 0 points north (latitude grows), 90 points east (longitude grows).
    #[must_use]
    pub fn project(self, heading: Radians, distance: f64) -> Self {
        LatLng::new(
            self.lat + heading.cos() * distance,
            self.lng + heading.sin() * distance,
        )
    }

    /// True when both axis offsets to `other` are within `epsilon`.
    pub fn is_negligibly_close(self, other: LatLng, epsilon: f64) -> bool {
        (other.lat - self.lat).abs() <= epsilon && (other.lng - self.lng).abs() <= epsilon
    }

    /// Bit-level key for hashing exact coordinates.
    #[inline]
    pub(crate) fn bits(self) -> (u64, u64) {
        (self.lat.to_bits(), self.lng.to_bits())
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Distance between two points, as used by the merge pass.
#[inline]
pub fn distance(a: LatLng, b: LatLng) -> f64 {
    a.distance_to(b)
}
