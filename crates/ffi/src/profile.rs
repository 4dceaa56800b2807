use radar_pid_core::interpolate_profile;

use crate::error::{DefaultRadarPidError, RadarPidErrorCode};
use crate::helpers::{slice_arg, track_error, track_result};

/// Interpolate a temperature profile onto arbitrary bin heights.
///
/// Writes one temperature per entry of `rheight` into `out`, in the same order
/// as `rheight`. The query heights do not need to be sorted; heights outside
/// the profile take the nearest end value.
///
/// Parameters
/// - `pheight`, `ptempc`: profile heights (m, strictly ascending) and temperatures (°C),
///   each `profile_len` long
/// - `rheight`: `len` query heights (m)
/// - `out`: `len` writable values
///
/// Returns
/// - `RadarPidErrorCode::Ok` (0) on success
/// - `RadarPidErrorCode::NullPointer` if any pointer is null
/// - `RadarPidErrorCode::InvalidProfile` if the profile has fewer than 2 points or is not ascending
/// - `RadarPidErrorCode::InvalidParameter` if `len` is 0
///
/// `out` is left untouched on failure.
///
/// # Safety
/// - `pheight` and `ptempc` must be valid for reads of `profile_len` doubles.
/// - `rheight` must be valid for reads of `len` doubles.
/// - `out` must be valid for writes of `len` doubles and must not overlap the inputs.
///
/// Example (C)
/// ```c
/// double ph[] = {0, 100, 200, 300};
/// double pt[] = {20, 10, 0, -10};
/// double rh[] = {50, 25, 150};
/// double t[3];
/// if (radar_pid_interpolate_profile(ph, pt, 4, rh, t, 3) != Ok) {
///     fprintf(stderr, "%s\n", radar_pid_get_last_error());
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn radar_pid_interpolate_profile(
    pheight: *const f64,
    ptempc: *const f64,
    profile_len: usize,
    rheight: *const f64,
    out: *mut f64,
    len: usize,
) -> RadarPidErrorCode {
    if out.is_null() {
        return track_error(&DefaultRadarPidError::null_pointer("out"));
    }

    let inputs = unsafe {
        slice_arg(pheight, profile_len, "pheight").and_then(|ph| {
            let pt = slice_arg(ptempc, profile_len, "ptempc")?;
            let rh = slice_arg(rheight, len, "rheight")?;
            Ok((ph, pt, rh))
        })
    };
    let (ph, pt, rh) = match track_result(inputs) {
        Ok(slices) => slices,
        Err(code) => return code,
    };

    let result = interpolate_profile(ph, pt, rh).map_err(DefaultRadarPidError::from);
    match track_result(result) {
        Ok(temps) => {
            // SAFETY: `out` is non-null and valid for `len` writes per the contract;
            // `temps.len() == rh.len() == len`
            let out = unsafe { std::slice::from_raw_parts_mut(out, len) };
            out.copy_from_slice(&temps);
            RadarPidErrorCode::Ok
        }
        Err(code) => code,
    }
}
