use radar_pid_core::{ConfigError, ProfileError};
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors crossing the FFI boundary.
///
/// - `code()` is what the C caller gets back
/// - `msg()` is kept for [`radar_pid_get_last_error`]
pub(crate) trait RadarPidError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> RadarPidErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Error code plus message, built from argument checks or core errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultRadarPidError {
    code: RadarPidErrorCode,
    msg: String,
}

impl DefaultRadarPidError {
    /// Null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_config"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: RadarPidErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Invalid argument with a custom message.
    pub fn invalid_parameter(param_name: &str, message: &str) -> Self {
        Self {
            code: RadarPidErrorCode::InvalidParameter,
            msg: format!("Parameter '{param_name}': {message}"),
        }
    }
}

impl RadarPidError for DefaultRadarPidError {
    fn code(&self) -> RadarPidErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<ProfileError> for DefaultRadarPidError {
    fn from(error: ProfileError) -> Self {
        let code = match error {
            ProfileError::EmptyQuery => RadarPidErrorCode::InvalidParameter,
            _ => RadarPidErrorCode::InvalidProfile,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl From<ConfigError> for DefaultRadarPidError {
    fn from(error: ConfigError) -> Self {
        let code = match error {
            ConfigError::UnknownProfile(_) | ConfigError::Unregistered(_) => {
                RadarPidErrorCode::UnknownProfile
            }
            ConfigError::MissingThresholds(_) => RadarPidErrorCode::MissingThresholds,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

/// FFI error codes returned by radar-pid functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadarPidErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Profile arrays are too short, mismatched, non-finite or not monotonic.
    InvalidProfile = 2,

    /// Threshold profile name is not one of nexrad, cband, xband.
    UnknownProfile = 3,

    /// Thresholds file for the selected profile does not exist.
    MissingThresholds = 4,

    /// Invalid parameter passed to function.
    InvalidParameter = 5,
}

impl From<DefaultRadarPidError> for RadarPidErrorCode {
    fn from(error: DefaultRadarPidError) -> Self {
        error.code
    }
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The CString lives here so the pointer handed to C stays valid.
    static LAST_ERROR: RefCell<(Option<CString>, RadarPidErrorCode)> = const { RefCell::new((None, RadarPidErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, RadarPidErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, RadarPidErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns `null` if the last call on this thread succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next radar-pid call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// RadarPidConfig* cfg = NULL;
/// if (radar_pid_config_new("/etc/radar-pid", "cband", &cfg) != Ok) {
///     const char* error = radar_pid_get_last_error();
///     if (error) {
///         fprintf(stderr, "PID config failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn radar_pid_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code for this thread.
///
/// `RadarPidErrorCode::Ok` (0) if the last call succeeded.
#[no_mangle]
pub extern "C" fn radar_pid_get_last_error_code() -> RadarPidErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
