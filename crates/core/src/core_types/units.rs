//! Semantic unit types for radar geometry and sounding values
//!
//! Newtype wrappers keep heights, temperatures and angles from being mixed up
//! at API boundaries. Bulk data (ray heights, profile columns) stays as plain
//! `f64` slices; these types are for single values crossing function signatures.
//!
//! # Design Philosophy
//! - All types wrap `f64`: sounding and beam-height arithmetic is done in double precision
//! - Total ordering via `Ord` (NaN handled as greater than all values)
//! - `Deref` to the inner value for arithmetic-heavy call sites
//! - Serde support for serialization
//!
//! # Usage
//! ```
//! use radar_pid_core::core_types::units::{Celsius, Degrees, Meters};
//!
//! let h = Meters::new(1500.0);
//! assert!((h.to_kilometers() - 1.5).abs() < 1e-12);
//!
//! let t = Celsius::new(-12.5);
//! assert!(t < Celsius::FREEZING);
//!
//! let el = Degrees::new(0.5);
//! assert!((el.to_radians() - 0.5_f64.to_radians()).abs() < 1e-15);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Eq for Celsius {}

impl PartialOrd for Celsius {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Celsius {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Absolute zero in Celsius
    pub const ABSOLUTE_ZERO: Celsius = Celsius(-273.15);

    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -273.15,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Celsius {
    fn from(v: f64) -> Self {
        Celsius(v)
    }
}

impl From<Celsius> for f64 {
    fn from(c: Celsius) -> f64 {
        c.0
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

// ============================================================================
// HEIGHT / DISTANCE
// ============================================================================

/// Height or distance in meters
///
/// Unlike a pure distance this may be negative: heights are relative to a
/// reference level and a sounding or radar site can sit below it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

impl Eq for Meters {}

impl PartialOrd for Meters {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Meters {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Meters {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Meters {
    /// Create a new height in meters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to kilometers (raw value)
    #[inline]
    #[must_use]
    pub fn to_kilometers(self) -> f64 {
        self.0 * 0.001
    }

    /// Create from a value in kilometers
    #[inline]
    #[must_use]
    pub fn from_kilometers(km: f64) -> Self {
        Meters(km * 1000.0)
    }
}

impl From<f64> for Meters {
    fn from(v: f64) -> Self {
        Meters(v)
    }
}

impl From<Meters> for f64 {
    fn from(m: Meters) -> f64 {
        m.0
    }
}

impl Add for Meters {
    type Output = Meters;
    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Meters;
    fn sub(self, rhs: Meters) -> Meters {
        Meters(self.0 - rhs.0)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}m", self.0)
    }
}

// ============================================================================
// ANGLE
// ============================================================================

/// Angle in degrees (radar elevation)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(f64);

impl Eq for Degrees {}

impl PartialOrd for Degrees {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Degrees {
    fn cmp(&self, other: &Self) -> Ordering {
        f64_total_cmp(self.0, other.0)
    }
}

impl Deref for Degrees {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Degrees {
    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Convert to radians (raw value)
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_ordering_handles_nan() {
        let a = Meters::new(100.0);
        let nan = Meters::new(f64::NAN);
        assert!(a < nan);
        assert!(a.max(nan).value().is_nan());
    }

    #[test]
    #[should_panic(expected = "below absolute zero")]
    fn test_celsius_rejects_below_absolute_zero() {
        let _ = Celsius::new(-300.0);
    }

    #[test]
    fn test_meters_arithmetic() {
        let h = Meters::new(1200.0) - Meters::new(200.0);
        assert_eq!(h, Meters::new(1000.0));
        assert_eq!(Meters::from_kilometers(1.5), Meters::new(1500.0));
        assert_eq!(format!("{}", Meters::new(12.34)), "12.3m");
    }
}
