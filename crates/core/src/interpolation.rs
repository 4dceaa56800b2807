//! Profile interpolation onto radar bin heights
//!
//! Bin heights along a ray are normally ascending, but at low elevation angles
//! the beam can descend before curving away from the earth, so the heights of
//! the first few bins decrease. Linear interpolation needs monotonic sample
//! points, so queries are sorted, interpolated, and then scattered back to their
//! original positions: `output[i]` always belongs to `rheight[i]`.
//!
//! Outside the profile the temperature is held flat at the nearest end value.
//!
//! # Example
//!
//! ```
//! use radar_pid_core::interpolation::interpolate_profile;
//!
//! let pheight = [0.0, 100.0, 200.0, 300.0];
//! let ptempc = [20.0, 10.0, 0.0, -10.0];
//! let t = interpolate_profile(&pheight, &ptempc, &[50.0, 25.0, 150.0]).unwrap();
//! assert_eq!(t, vec![15.0, 17.5, 5.0]);
//! ```

use crate::error::ProfileError;
use std::cmp::Ordering;

/// Stable ascending sort permutation of `values`.
///
/// `values[perm[k]]` is the k-th smallest value. Ties keep their input order and
/// NaN sorts after every finite value (`f64::total_cmp`).
#[must_use]
pub fn sort_permutation(values: &[f64]) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..values.len()).collect();
    perm.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    perm
}

/// Interpolate a single value from `(xp, fp)` with flat extrapolation.
///
/// `xp` must be strictly ascending and non-empty, and the same length as `fp`.
/// NaN in gives NaN out.
///
/// # Panics
/// If `xp` is empty or `fp` is shorter than `xp`. Use [`validate_profile`] first
/// on untrusted input.
#[must_use]
pub fn interp_one(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }

    // First knot strictly above x; x sits in [xp[hi - 1], xp[hi])
    let hi = xp.partition_point(|&v| v <= x);
    lerp(x, xp, fp, hi - 1)
}

/// Interpolate `fp` known at `xp` onto the ascending query points `x`.
///
/// Single forward sweep: the bracket cursor only ever moves up, so the cost is
/// `O(x.len() + xp.len())`. Queries must already be sorted (see
/// [`sort_permutation`]); NaN queries produce NaN wherever they sort.
///
/// # Panics
/// If `xp` is empty or `fp` is shorter than `xp`, same as [`interp_one`].
#[must_use]
pub fn interp_sorted(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    debug_assert!(x
        .windows(2)
        .all(|w| w[0].is_nan() || w[1].is_nan() || w[0] <= w[1]));

    let last = xp.len() - 1;
    let mut lo = 0;
    x.iter()
        .map(|&xi| {
            if xi.is_nan() {
                f64::NAN
            } else if xi <= xp[0] {
                fp[0]
            } else if xi >= xp[last] {
                fp[last]
            } else {
                while xp[lo + 1] <= xi {
                    lo += 1;
                }
                lerp(xi, xp, fp, lo)
            }
        })
        .collect()
}

/// Linear blend on segment `[xp[lo], xp[lo + 1]]`. Exact at `xp[lo]`.
#[inline]
fn lerp(x: f64, xp: &[f64], fp: &[f64], lo: usize) -> f64 {
    let t = (x - xp[lo]) / (xp[lo + 1] - xp[lo]);
    fp[lo] + t * (fp[lo + 1] - fp[lo])
}

/// Check the shape of a profile: equal column lengths, at least two levels,
/// strictly ascending heights.
///
/// # Errors
/// [`ProfileError::LengthMismatch`], [`ProfileError::TooFewPoints`] or
/// [`ProfileError::NotMonotonic`].
pub fn validate_profile(pheight: &[f64], ptempc: &[f64]) -> Result<(), ProfileError> {
    if pheight.len() != ptempc.len() {
        return Err(ProfileError::LengthMismatch {
            heights: pheight.len(),
            temperatures: ptempc.len(),
        });
    }
    if pheight.len() < 2 {
        return Err(ProfileError::TooFewPoints(pheight.len()));
    }
    if let Some(i) = pheight
        .windows(2)
        .position(|w| w[0].partial_cmp(&w[1]) != Some(Ordering::Less))
    {
        return Err(ProfileError::NotMonotonic { index: i + 1 });
    }
    Ok(())
}

/// Interpolate the profile `(pheight, ptempc)` at arbitrarily ordered heights.
///
/// Returns one temperature per entry of `rheight`, in the same order.
///
/// # Errors
/// Fails if the profile columns differ in length, have fewer than two levels or
/// are not strictly ascending in height, or if `rheight` is empty. Query heights
/// outside the profile never fail; they are clamped.
pub fn interpolate_profile(
    pheight: &[f64],
    ptempc: &[f64],
    rheight: &[f64],
) -> Result<Vec<f64>, ProfileError> {
    validate_profile(pheight, ptempc)?;
    if rheight.is_empty() {
        return Err(ProfileError::EmptyQuery);
    }
    Ok(interpolate_unchecked(pheight, ptempc, rheight))
}

/// Sort, interpolate, unsort. Caller guarantees a valid profile.
pub(crate) fn interpolate_unchecked(pheight: &[f64], ptempc: &[f64], rheight: &[f64]) -> Vec<f64> {
    let perm = sort_permutation(rheight);
    let sorted: Vec<f64> = perm.iter().map(|&i| rheight[i]).collect();
    let sorted_temps = interp_sorted(&sorted, pheight, ptempc);

    // Scatter through the inverse permutation
    let mut out = vec![0.0; rheight.len()];
    for (k, &i) in perm.iter().enumerate() {
        out[i] = sorted_temps[k];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PHEIGHT: [f64; 4] = [0.0, 100.0, 200.0, 300.0];
    const PTEMPC: [f64; 4] = [20.0, 10.0, 0.0, -10.0];

    #[test]
    fn test_linear_segments() {
        let t = interpolate_profile(&PHEIGHT, &PTEMPC, &[50.0, 25.0, 150.0, 225.0, 275.0]).unwrap();
        let expected = [15.0, 17.5, 5.0, -2.5, -7.5];
        assert_eq!(t.len(), expected.len());
        for (got, want) in t.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_exact_at_knots() {
        let t = interpolate_profile(&PHEIGHT, &PTEMPC, &[300.0, 0.0, 200.0, 100.0]).unwrap();
        assert_eq!(t, vec![-10.0, 20.0, 0.0, 10.0]);
    }

    #[test]
    fn test_clamps_outside_profile() {
        let t = interpolate_profile(&PHEIGHT, &PTEMPC, &[-500.0, 10_000.0]).unwrap();
        assert_eq!(t, vec![20.0, -10.0]);
    }

    #[test]
    fn test_folded_ray_keeps_bin_order() {
        // Heights dip then rise, as for a negative-going low tilt
        let rheight = [120.0, 80.0, 60.0, 90.0, 250.0];
        let t = interpolate_profile(&PHEIGHT, &PTEMPC, &rheight).unwrap();
        let expected = [8.0, 12.0, 14.0, 11.0, -5.0];
        for (got, want) in t.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sort_permutation_is_stable() {
        let perm = sort_permutation(&[3.0, 1.0, 3.0, 0.0, 1.0]);
        assert_eq!(perm, vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn test_nan_query_propagates() {
        let t = interpolate_profile(&PHEIGHT, &PTEMPC, &[f64::NAN, 150.0]).unwrap();
        assert!(t[0].is_nan());
        assert_relative_eq!(t[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interp_one_matches_sweep() {
        let x = [-1.0, 0.0, 33.0, 100.0, 199.9, 300.0, 301.0];
        let sweep = interp_sorted(&x, &PHEIGHT, &PTEMPC);
        for (xi, s) in x.iter().zip(sweep) {
            assert_relative_eq!(interp_one(*xi, &PHEIGHT, &PTEMPC), s, epsilon = 1e-12);
        }
    }

    #[test]
    #[should_panic]
    fn test_interp_one_panics_on_empty_knots() {
        let _ = interp_one(1.0, &[], &[]);
    }

    #[test]
    fn test_shape_errors() {
        assert!(matches!(
            interpolate_profile(&[0.0, 1.0], &[1.0], &[0.5]),
            Err(ProfileError::LengthMismatch {
                heights: 2,
                temperatures: 1
            })
        ));
        assert!(matches!(
            interpolate_profile(&[0.0], &[1.0], &[0.5]),
            Err(ProfileError::TooFewPoints(1))
        ));
        assert!(matches!(
            interpolate_profile(&PHEIGHT, &PTEMPC, &[]),
            Err(ProfileError::EmptyQuery)
        ));
        assert!(matches!(
            interpolate_profile(&[0.0, 200.0, 100.0], &[1.0, 2.0, 3.0], &[0.5]),
            Err(ProfileError::NotMonotonic { index: 2 })
        ));
    }
}
