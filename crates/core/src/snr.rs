//! Signal-to-noise estimation from reflectivity
//!
//! The classifier wants SNRH. When a scan does not carry it, it is estimated
//! from DBZH by assuming a receiver noise floor that grows with range like
//! the reflectivity of a constant-power signal:
//!
//! ```text
//! noise_dbz(r) = noise_dbz_at_100km + 20 · (log10(r_km) − log10(100))
//! SNR          = dBZ − noise_dbz(r)
//! ```

use crate::scan::{BinValue, ScanParameter};

/// Quantity name of the estimated parameter
pub const SNR_QUANTITY: &str = "SNRH";

/// SNR written for bins without reflectivity data (dB)
pub const NO_ECHO_SNR: f64 = -20.0;

/// Noise-equivalent reflectivity at `range_km`
pub fn noise_dbz(range_km: f64, noise_dbz_at_100km: f64) -> f64 {
    noise_dbz_at_100km + 20.0 * (range_km.log10() - 100.0_f64.log10())
}

/// Estimate SNRH from a DBZH parameter.
///
/// Range is taken at bin centres, `range_start_km + (bin + 0.5) · scale`, not
/// at the leading edge of each bin. With a zero range start the leading edge of
/// bin 0 would put `log10(0)` into the noise term.
/// Bins without DBZH data get [`NO_ECHO_SNR`].
/// The result is unscaled (gain 1, offset 0) with `missing` as both markers.
pub fn estimate_snr(
    dbzh: &ScanParameter,
    range_start_km: f64,
    range_scale_m: f64,
    noise_dbz_at_100km: f64,
    missing: f64,
) -> ScanParameter {
    let nrays = dbzh.nrays();
    let nbins = dbzh.nbins();
    let scale_km = range_scale_m * 0.001;

    let noise: Vec<f64> = (0..nbins)
        .map(|bin| noise_dbz(range_start_km + (bin as f64 + 0.5) * scale_km, noise_dbz_at_100km))
        .collect();

    let mut snr = ScanParameter::filled(SNR_QUANTITY, nrays, nbins, missing);
    for ray in 0..nrays {
        for bin in 0..nbins {
            let value = match dbzh.converted(ray, bin) {
                BinValue::Data(dbz) => dbz - noise[bin],
                BinValue::Nodata | BinValue::Undetect => NO_ECHO_SNR,
            };
            snr.set(ray, bin, value);
        }
    }
    snr
}
