use crate::error::{with_last_error_mut, DefaultRadarPidError, RadarPidError, RadarPidErrorCode};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl RadarPidError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record `error` and return its code.
#[inline]
pub(crate) fn track_error(error: &impl RadarPidError) -> RadarPidErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, or clear the slot on success.
pub(crate) fn track_result<T, E: RadarPidError>(
    result: Result<T, E>,
) -> Result<T, RadarPidErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(e) => Err(track_error(&e)),
    }
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = RadarPidErrorCode::Ok;
    });
}

/// Borrow a C string argument as UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a valid nul-terminated string that outlives `'a`.
pub(crate) unsafe fn str_arg<'a>(
    ptr: *const c_char,
    name: &str,
) -> Result<&'a str, DefaultRadarPidError> {
    if ptr.is_null() {
        return Err(DefaultRadarPidError::null_pointer(name));
    }
    // SAFETY: non-null checked above; validity is the caller's contract
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| DefaultRadarPidError::invalid_parameter(name, "not valid UTF-8"))
}

/// Borrow a `(pointer, length)` pair as a slice.
///
/// # Safety
/// `ptr` must be null or valid for reads of `len` values for `'a`.
pub(crate) unsafe fn slice_arg<'a>(
    ptr: *const f64,
    len: usize,
    name: &str,
) -> Result<&'a [f64], DefaultRadarPidError> {
    if ptr.is_null() {
        return Err(DefaultRadarPidError::null_pointer(name));
    }
    // SAFETY: non-null checked above; validity is the caller's contract
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{radar_pid_get_last_error, radar_pid_get_last_error_code};

    #[test]
    fn test_track_then_clear() {
        let code = track_error(&DefaultRadarPidError::null_pointer("x"));
        assert_eq!(code, RadarPidErrorCode::NullPointer);
        assert_eq!(radar_pid_get_last_error_code(), RadarPidErrorCode::NullPointer);
        assert!(!radar_pid_get_last_error().is_null());

        let ok: Result<u8, DefaultRadarPidError> = Ok(3);
        assert_eq!(track_result(ok), Ok(3));
        assert_eq!(radar_pid_get_last_error_code(), RadarPidErrorCode::Ok);
        assert!(radar_pid_get_last_error().is_null());
    }

    #[test]
    fn test_str_arg() {
        let s = CString::new("nexrad").unwrap();
        assert_eq!(unsafe { str_arg(s.as_ptr(), "name") }, Ok("nexrad"));
        assert_eq!(
            unsafe { str_arg(std::ptr::null(), "name") }.unwrap_err().code(),
            RadarPidErrorCode::NullPointer
        );
    }
}
