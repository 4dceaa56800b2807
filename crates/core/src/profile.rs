//! Vertical temperature profiles (soundings)
//!
//! A [`TemperatureProfile`] is read once, validated, and then reused for every
//! scan of a volume. Heights are in meters, temperatures in °C. Soundings
//! stored top-down are flipped on construction so heights always ascend.
//!
//! # Text format
//!
//! One level per line, height then temperature, separated by whitespace or a
//! comma. Blank lines and anything after `#` are ignored.
//!
//! ```text
//! # height_m  tempc
//! 0      18.2
//! 500    14.9
//! 1500    8.1
//! ```

use crate::core_types::units::{Celsius, Meters};
use crate::error::ProfileError;
use crate::interpolation::{interp_one, interpolate_unchecked};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Height/temperature sounding with strictly ascending heights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile", into = "RawProfile")]
pub struct TemperatureProfile {
    heights: Vec<f64>,
    temperatures: Vec<f64>,
}

/// Unvalidated serde shape of a profile
#[derive(Serialize, Deserialize)]
struct RawProfile {
    heights: Vec<f64>,
    temperatures: Vec<f64>,
}

impl TryFrom<RawProfile> for TemperatureProfile {
    type Error = ProfileError;

    fn try_from(raw: RawProfile) -> Result<Self, Self::Error> {
        Self::new(raw.heights, raw.temperatures)
    }
}

impl From<TemperatureProfile> for RawProfile {
    fn from(p: TemperatureProfile) -> Self {
        RawProfile {
            heights: p.heights,
            temperatures: p.temperatures,
        }
    }
}

impl TemperatureProfile {
    /// Build a profile from height and temperature columns.
    ///
    /// Strictly descending heights are flipped (both columns reversed).
    ///
    /// # Errors
    /// Returns [`ProfileError`] if the columns differ in length, hold fewer than
    /// two levels, contain a non-finite value, or are not strictly monotonic.
    pub fn new(mut heights: Vec<f64>, mut temperatures: Vec<f64>) -> Result<Self, ProfileError> {
        if heights.len() != temperatures.len() {
            return Err(ProfileError::LengthMismatch {
                heights: heights.len(),
                temperatures: temperatures.len(),
            });
        }
        if heights.len() < 2 {
            return Err(ProfileError::TooFewPoints(heights.len()));
        }
        if let Some(index) = heights
            .iter()
            .zip(&temperatures)
            .position(|(h, t)| !h.is_finite() || !t.is_finite())
        {
            return Err(ProfileError::NonFinite { index });
        }

        if heights.windows(2).all(|w| w[0] > w[1]) {
            heights.reverse();
            temperatures.reverse();
        }
        crate::interpolation::validate_profile(&heights, &temperatures)?;

        Ok(Self {
            heights,
            temperatures,
        })
    }

    /// Parse a profile from a text source (see module docs for the format).
    ///
    /// # Errors
    /// Returns [`ProfileError::Parse`] with the 1-based line number for malformed
    /// lines, [`ProfileError::Io`] on read failure, or any error from [`Self::new`].
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ProfileError> {
        let mut heights = Vec::new();
        let mut temperatures = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let content = line.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let mut fields = content
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty());
            let (Some(h), Some(t), None) = (fields.next(), fields.next(), fields.next()) else {
                return Err(ProfileError::Parse {
                    line: i + 1,
                    message: format!("expected 2 columns in '{content}'"),
                });
            };

            let parse = |s: &str| {
                s.parse::<f64>().map_err(|e| ProfileError::Parse {
                    line: i + 1,
                    message: format!("'{s}': {e}"),
                })
            };
            heights.push(parse(h)?);
            temperatures.push(parse(t)?);
        }

        Self::new(heights, temperatures)
    }

    /// Load a profile from a text file.
    ///
    /// # Errors
    /// See [`Self::from_reader`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Always false; a valid profile has at least two levels
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Profile heights (m), ascending
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Profile temperatures (°C), matching [`Self::heights`]
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// Temperature at one height, clamped outside the profile
    pub fn temperature_at(&self, height: Meters) -> Celsius {
        Celsius::from(interp_one(*height, &self.heights, &self.temperatures))
    }

    /// Temperatures at arbitrarily ordered heights, in the same order.
    ///
    /// # Errors
    /// [`ProfileError::EmptyQuery`] if `rheight` is empty.
    pub fn interpolate(&self, rheight: &[f64]) -> Result<Vec<f64>, ProfileError> {
        if rheight.is_empty() {
            return Err(ProfileError::EmptyQuery);
        }
        Ok(interpolate_unchecked(
            &self.heights,
            &self.temperatures,
            rheight,
        ))
    }

    /// Interpolate many rays at once, in parallel. Output order matches `rays`.
    ///
    /// # Errors
    /// [`ProfileError::EmptyQuery`] if any ray is empty.
    pub fn interpolate_rays(&self, rays: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ProfileError> {
        rays.par_iter().map(|ray| self.interpolate(ray)).collect()
    }

    /// Lowest height where the profile crosses 0 °C from above, if any.
    ///
    /// A surface already at or below freezing reports the lowest level.
    pub fn freezing_level(&self) -> Option<Meters> {
        let freezing = *Celsius::FREEZING;
        if self.temperatures[0] <= freezing {
            return Some(Meters::new(self.heights[0]));
        }
        self.heights
            .windows(2)
            .zip(self.temperatures.windows(2))
            .find(|(_, t)| t[0] > freezing && t[1] <= freezing)
            .map(|(h, t)| {
                let frac = (t[0] - freezing) / (t[0] - t[1]);
                Meters::new(h[0] + frac * (h[1] - h[0]))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear() -> TemperatureProfile {
        TemperatureProfile::new(
            vec![0.0, 100.0, 200.0, 300.0],
            vec![20.0, 10.0, 0.0, -10.0],
        )
        .unwrap()
    }

    #[test]
    fn test_descending_profile_is_flipped() {
        let p = TemperatureProfile::new(
            vec![300.0, 200.0, 100.0, 0.0],
            vec![-10.0, 0.0, 10.0, 20.0],
        )
        .unwrap();
        assert_eq!(p, linear());
    }

    #[test]
    fn test_rejects_bad_profiles() {
        assert!(matches!(
            TemperatureProfile::new(vec![0.0, 100.0, 50.0], vec![1.0, 2.0, 3.0]),
            Err(ProfileError::NotMonotonic { .. })
        ));
        assert!(matches!(
            TemperatureProfile::new(vec![0.0, f64::INFINITY], vec![1.0, 2.0]),
            Err(ProfileError::NonFinite { index: 1 })
        ));
        assert!(matches!(
            TemperatureProfile::new(vec![10.0], vec![1.0]),
            Err(ProfileError::TooFewPoints(1))
        ));
        assert!(matches!(
            TemperatureProfile::new(vec![0.0, 0.0], vec![1.0, 2.0]),
            Err(ProfileError::NotMonotonic { index: 1 })
        ));
    }

    #[test]
    fn test_from_reader() {
        let text = "# sounding\n0 20.0\n\n100, 10.0  # comment\n200\t0\n300 -10\n";
        let p = TemperatureProfile::from_reader(text.as_bytes()).unwrap();
        assert_eq!(p, linear());
    }

    #[test]
    fn test_from_reader_reports_line() {
        let text = "0 20\n100 warm\n";
        match TemperatureProfile::from_reader(text.as_bytes()) {
            Err(ProfileError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }

        let text = "0 20 5\n";
        assert!(matches!(
            TemperatureProfile::from_reader(text.as_bytes()),
            Err(ProfileError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_temperature_at() {
        let p = linear();
        assert_relative_eq!(*p.temperature_at(Meters::new(150.0)), 5.0, epsilon = 1e-12);
        assert_eq!(*p.temperature_at(Meters::new(-20.0)), 20.0);
    }

    #[test]
    fn test_freezing_level() {
        let p = linear();
        assert_relative_eq!(*p.freezing_level().unwrap(), 200.0, epsilon = 1e-9);

        let warm = TemperatureProfile::new(vec![0.0, 1000.0], vec![25.0, 20.0]).unwrap();
        assert!(warm.freezing_level().is_none());

        let cold = TemperatureProfile::new(vec![0.0, 1000.0], vec![-5.0, -12.0]).unwrap();
        assert_eq!(cold.freezing_level(), Some(Meters::new(0.0)));
    }

    #[test]
    fn test_interpolate_rays_in_parallel() {
        let p = linear();
        let rays = vec![vec![50.0, 25.0], vec![150.0], vec![275.0, 225.0, 0.0]];
        let out = p.interpolate_rays(&rays).unwrap();
        assert_eq!(out.len(), 3);
        assert_relative_eq!(out[0][1], 17.5, epsilon = 1e-12);
        assert_relative_eq!(out[2][0], -7.5, epsilon = 1e-12);
        assert_eq!(out[2][2], 20.0);

        assert!(matches!(
            p.interpolate_rays(&[vec![1.0], vec![]]),
            Err(ProfileError::EmptyQuery)
        ));
    }
}
