//! C ABI for radar-pid
//!
//! Every fallible function returns a [`RadarPidErrorCode`] and records a
//! message retrievable with [`radar_pid_get_last_error`] on the same thread.

mod config;
mod error;
mod helpers;
mod profile;

pub use config::{
    radar_pid_config_destroy, radar_pid_config_new, radar_pid_config_thresholds_path,
    RadarPidConfig,
};
pub use error::{radar_pid_get_last_error, radar_pid_get_last_error_code, RadarPidErrorCode};
pub use profile::radar_pid_interpolate_profile;
