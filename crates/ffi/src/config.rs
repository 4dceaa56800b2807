use radar_pid_core::{PidConfig, ThresholdStore};
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::error::{DefaultRadarPidError, RadarPidErrorCode};
use crate::helpers::{clear_last_error, str_arg, track_error, track_result};

/// A resolved threshold selection.
///
/// Created once with [`radar_pid_config_new`] and handed to the classifier
/// for every scan of a session. Immutable after creation, so it may be read
/// from any thread.
pub struct RadarPidConfig {
    config: PidConfig,
    thresholds_path: CString,
}

impl RadarPidConfig {
    /// Resolve `profile_name` against the standard file layout under `thresholds_dir`.
    pub(crate) fn new(
        thresholds_dir: &str,
        profile_name: &str,
    ) -> Result<Box<Self>, DefaultRadarPidError> {
        let store = ThresholdStore::with_defaults(thresholds_dir);
        let config = PidConfig::from_store(&store, profile_name)?;
        let thresholds_path = CString::new(config.thresholds().to_string_lossy().into_owned())
            .map_err(|_| {
                DefaultRadarPidError::invalid_parameter("thresholds_dir", "contains a nul byte")
            })?;
        Ok(Box::new(Self {
            config,
            thresholds_path,
        }))
    }

    /// The resolved configuration
    pub fn config(&self) -> &PidConfig {
        &self.config
    }
}

/// Select a thresholds file by band profile name and return it via out-parameter.
///
/// Looks for `<thresholds_dir>/pid_thresholds.<profile>` where the profile is
/// one of `nexrad`, `cband`, `xband` (case-insensitive).
///
/// Returns
/// - `RadarPidErrorCode::Ok` (0), `out_config` holds a new instance
/// - `RadarPidErrorCode::NullPointer` if any argument is null
/// - `RadarPidErrorCode::UnknownProfile` if the name is not a known band
/// - `RadarPidErrorCode::MissingThresholds` if the file does not exist
/// - `RadarPidErrorCode::InvalidParameter` if a string is not UTF-8
///
/// On failure `out_config` is set to null.
///
/// # Safety
/// - `thresholds_dir` and `profile_name` must be valid nul-terminated strings.
/// - `out_config` must be a valid, non-null pointer to writable memory.
/// - The caller owns the returned instance and MUST call `radar_pid_config_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn radar_pid_config_new(
    thresholds_dir: *const c_char,
    profile_name: *const c_char,
    out_config: *mut *mut RadarPidConfig,
) -> RadarPidErrorCode {
    if out_config.is_null() {
        return track_error(&DefaultRadarPidError::null_pointer("out_config"));
    }

    let created = unsafe {
        str_arg(thresholds_dir, "thresholds_dir").and_then(|dir| {
            let name = str_arg(profile_name, "profile_name")?;
            RadarPidConfig::new(dir, name)
        })
    };

    match track_result(created) {
        Ok(config) => {
            unsafe {
                *out_config = Box::into_raw(config);
            }
            RadarPidErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_config = ptr::null_mut();
            }
            code
        }
    }
}

/// Full path of the selected thresholds file.
///
/// Returns null (and records `NullPointer`) if `config` is null. The string is
/// owned by `config` and valid until it is destroyed. **DO NOT FREE.**
///
/// # Safety
/// `config` must be null or a live pointer from `radar_pid_config_new`.
#[no_mangle]
pub unsafe extern "C" fn radar_pid_config_thresholds_path(
    config: *const RadarPidConfig,
) -> *const c_char {
    // SAFETY: null or live per the contract
    match unsafe { config.as_ref() } {
        Some(config) => {
            clear_last_error();
            config.thresholds_path.as_ptr()
        }
        None => {
            track_error(&DefaultRadarPidError::null_pointer("config"));
            ptr::null()
        }
    }
}

/// Destroy a configuration created by `radar_pid_config_new`. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `radar_pid_config_new` and not freed already.
/// - The caller must not use the pointer again afterwards.
#[no_mangle]
pub unsafe extern "C" fn radar_pid_config_destroy(config: *mut RadarPidConfig) {
    if config.is_null() {
        return;
    }
    // SAFETY: created by `Box::into_raw` in `radar_pid_config_new`
    unsafe {
        drop(Box::from_raw(config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::radar_pid_get_last_error_code;
    use radar_pid_core::BandProfile;
    use std::ffi::CStr;
    use std::fs;

    fn new_config(dir: &str, name: &str) -> (RadarPidErrorCode, *mut RadarPidConfig) {
        let dir = CString::new(dir).unwrap();
        let name = CString::new(name).unwrap();
        let mut out = ptr::null_mut();
        let code = unsafe { radar_pid_config_new(dir.as_ptr(), name.as_ptr(), &mut out) };
        (code, out)
    }

    #[test]
    fn test_config_lifecycle() {
        let dir = std::env::temp_dir().join(format!("radar-pid-ffi-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("pid_thresholds.xband"), "thresholds").unwrap();
        let dir_str = dir.to_str().unwrap();

        let (code, config) = new_config(dir_str, "XBand");
        assert_eq!(code, RadarPidErrorCode::Ok);
        assert!(!config.is_null());
        assert_eq!(unsafe { &*config }.config().profile(), BandProfile::XBand);

        let path = unsafe { CStr::from_ptr(radar_pid_config_thresholds_path(config)) };
        assert!(path.to_str().unwrap().ends_with("pid_thresholds.xband"));
        unsafe { radar_pid_config_destroy(config) };

        let (code, config) = new_config(dir_str, "nexrad");
        assert_eq!(code, RadarPidErrorCode::MissingThresholds);
        assert!(config.is_null());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unknown_profile_and_nulls() {
        let (code, config) = new_config("/nonexistent", "kaband");
        assert_eq!(code, RadarPidErrorCode::UnknownProfile);
        assert!(config.is_null());
        assert_eq!(radar_pid_get_last_error_code(), RadarPidErrorCode::UnknownProfile);

        let name = CString::new("nexrad").unwrap();
        let code = unsafe { radar_pid_config_new(ptr::null(), name.as_ptr(), ptr::null_mut()) };
        assert_eq!(code, RadarPidErrorCode::NullPointer);

        assert!(unsafe { radar_pid_config_thresholds_path(ptr::null()) }.is_null());
        unsafe { radar_pid_config_destroy(ptr::null_mut()) };
    }
}
