//! Radar Particle Identification Core Library
//!
//! Plumbing around an external polarimetric particle-identification engine for
//! weather-radar polar scans: load a vertical temperature profile, interpolate it
//! onto each ray's bin heights, attach it to the scan, and hand the moments to
//! the classifier.
//!
//! ## Components
//!
//! - [`interpolation`]: sort-tolerant linear interpolation of a sounding onto bin heights
//! - [`profile`]: validated temperature profiles and their text format
//! - [`config`]: band threshold store and per-session configuration
//! - [`scan`]: what the classifier needs from a host polar scan
//! - [`geometry`]: 4/3-earth beam heights
//! - [`snr`]: SNR estimation from reflectivity
//! - [`pid`]: the per-scan classification driver

// Core types and utilities
pub mod core_types;
pub mod error;

pub mod config;
pub mod geometry;
pub mod interpolation;
pub mod pid;
pub mod profile;
pub mod scan;
pub mod snr;

// Re-export core types
pub use core_types::{Celsius, Degrees, Meters};
pub use error::{ClassifyError, ConfigError, PidError, ProfileError};

pub use config::{BandProfile, PidConfig, ThresholdStore};
pub use interpolation::interpolate_profile;
pub use pid::{
    attach_temperature, ray_temperatures, ClassifySummary, Classifier, ParticleId, RayMoments,
};
pub use profile::TemperatureProfile;
pub use scan::{BinValue, MemoryScan, PolarScan, ScanParameter};
