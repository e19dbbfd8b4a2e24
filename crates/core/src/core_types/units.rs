//! Semantic unit types for the weather inputs of the spread model
//!
//! Newtype wrappers keep temperatures, humidities, wind speeds and headings
//! from being swapped by accident when they flow through the risk and
//! spread-rate formulas.
//!
//! # Design
//! - All quantities are `f64`, matching the coordinate precision of `LatLng`
//! - Total ordering via `Ord` (NaN sorts above every value)
//! - `Deref` to the raw value for formula code
//! - Serde support so parameters can be saved with a run
//!
//! # Usage
//! ```
//! use fire_spread_core::core_types::units::{Degrees, Percent};
//!
//! let humidity = Percent::new(45.0);
//! assert!((humidity.to_fraction() - 0.45).abs() < 1e-12);
//!
//! let heading = Degrees::new(-90.0).normalized();
//! assert_eq!(*heading, 270.0);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Sub};

/// Implements the ordering, deref and raw-value conversions shared by every
/// unit newtype in this module.
macro_rules! unit_newtype {
    ($name:ident) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl $name {
            /// Get the raw value
            #[inline]
            #[must_use]
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Air temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(f64);

unit_newtype!(Celsius);

impl Celsius {
    /// Create a new Celsius temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Celsius(value)
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

// ============================================================================
// RELATIVE HUMIDITY
// ============================================================================

/// A percentage (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(f64);

unit_newtype!(Percent);

impl Percent {
    /// Create a new percentage
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Percent(value)
    }

    /// Convert to a fraction (0-1)
    #[inline]
    #[must_use]
    pub fn to_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

// ============================================================================
// WIND SPEED
// ============================================================================

/// Velocity in kilometers per hour
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KilometersPerHour(f64);

unit_newtype!(KilometersPerHour);

impl KilometersPerHour {
    /// Create a new `KilometersPerHour` value.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        KilometersPerHour(value)
    }
}

impl fmt::Display for KilometersPerHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km/h", self.0)
    }
}

// ============================================================================
// ANGLE TYPES
// ============================================================================

/// Eight-point compass labels, clockwise from north.
const COMPASS_POINTS: [&str; 8] = [
    "North",
    "Northeast",
    "East",
    "Southeast",
    "South",
    "Southwest",
    "West",
    "Northwest",
];

/// Heading in degrees, clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(f64);

unit_newtype!(Degrees);

impl Degrees {
    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Wrap into `[0, 360)`
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Self {
        let wrapped = self.0.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs
        if wrapped >= 360.0 {
            Degrees(0.0)
        } else {
            Degrees(wrapped)
        }
    }

    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }

    /// Nearest eight-point compass label ("North", "Northeast", ...)
    #[must_use]
    pub fn compass_label(self) -> &'static str {
        let index = (self.normalized().0 / 45.0).round() as usize % COMPASS_POINTS.len();
        COMPASS_POINTS[index]
    }
}

impl Add for Degrees {
    type Output = Degrees;
    fn add(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 + rhs.0)
    }
}

impl Sub for Degrees {
    type Output = Degrees;
    fn sub(self, rhs: Degrees) -> Degrees {
        Degrees(self.0 - rhs.0)
    }
}

impl From<Degrees> for Radians {
    fn from(d: Degrees) -> Radians {
        d.to_radians()
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°", self.0)
    }
}

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(f64);

unit_newtype!(Radians);

impl Radians {
    /// Create a new angle in radians
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Radians(value)
    }

    /// Convert to degrees
    #[inline]
    #[must_use]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

    /// Compute sine
    #[inline]
    #[must_use]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    /// Compute cosine
    #[inline]
    #[must_use]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }
}

impl Add for Radians {
    type Output = Radians;
    fn add(self, rhs: Radians) -> Radians {
        Radians(self.0 + rhs.0)
    }
}

impl Sub for Radians {
    type Output = Radians;
    fn sub(self, rhs: Radians) -> Radians {
        Radians(self.0 - rhs.0)
    }
}

impl From<Radians> for Degrees {
    fn from(r: Radians) -> Degrees {
        r.to_degrees()
    }
}

impl fmt::Display for Radians {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_normalized() {
        assert_eq!(*Degrees::new(370.0).normalized(), 10.0);
        assert_eq!(*Degrees::new(-45.0).normalized(), 315.0);
        assert_eq!(*Degrees::new(360.0).normalized(), 0.0);
        assert!(*Degrees::new(-1e-20).normalized() < 360.0);
    }

    #[test]
    fn test_compass_label() {
        assert_eq!(Degrees::new(0.0).compass_label(), "North");
        assert_eq!(Degrees::new(44.0).compass_label(), "Northeast");
        assert_eq!(Degrees::new(180.0).compass_label(), "South");
        assert_eq!(Degrees::new(350.0).compass_label(), "North");
        assert_eq!(Degrees::new(-90.0).compass_label(), "West");
    }

    #[test]
    fn test_total_ordering_handles_nan() {
        let nan = Celsius::new(f64::NAN);
        let hot = Celsius::new(45.0);
        assert!(hot.max(nan).value().is_nan());
        assert!(Celsius::new(10.0) < hot);
    }

    #[test]
    fn test_radians_round_trip() {
        let d = Degrees::new(90.0);
        let back: Degrees = d.to_radians().into();
        assert!((*back - 90.0).abs() < 1e-9);
        assert!((d.to_radians().sin() - 1.0).abs() < 1e-12);
    }
}
