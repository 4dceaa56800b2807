//! Radar beam geometry
//!
//! Bin-centre heights under standard refraction, using the 4/3 effective
//! earth radius model (Doviak & Zrnić 1993, eq. 2.28b):
//!
//! ```text
//! h = sqrt(r² + R'² + 2·r·R'·sin θ) − R' + h₀,    R' = 4/3 · R_earth
//! ```
//!
//! For negative elevations the beam first descends, then the earth curves
//! away beneath it and the height climbs again. That fold is why profile
//! interpolation cannot assume ascending bin heights.

use crate::core_types::units::{Degrees, Meters};

/// Mean radius of the Earth (m)
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Effective earth radius factor for standard refraction
pub const EFFECTIVE_RADIUS_FACTOR: f64 = 4.0 / 3.0;

/// Height of a point on the beam at slant `range` from a radar at `radar_height`.
pub fn bin_height(elevation: Degrees, range: Meters, radar_height: Meters) -> Meters {
    let re = EFFECTIVE_RADIUS_FACTOR * EARTH_RADIUS;
    let r = *range;
    let h = (r * r + re * re + 2.0 * r * re * elevation.to_radians().sin()).sqrt() - re;
    Meters::new(h) + radar_height
}

/// Heights of the `nbins` bin centres along a ray.
///
/// Bin `i` is centred at `range_start_km · 1000 + (i + 0.5) · range_scale_m`.
pub fn ray_bin_heights(
    elevation: Degrees,
    range_start_km: f64,
    range_scale_m: f64,
    nbins: usize,
    radar_height: Meters,
) -> Vec<f64> {
    let start = Meters::from_kilometers(range_start_km);
    (0..nbins)
        .map(|bin| {
            let range = *start + (bin as f64 + 0.5) * range_scale_m;
            *bin_height(elevation, Meters::new(range), radar_height)
        })
        .collect()
}
