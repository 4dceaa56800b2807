//! Threshold store selection and classification configuration
//!
//! The classification engine is driven by a thresholds file, one per radar
//! band. Which file to use is configuration: a small closed set of profile
//! names, each mapped to a location on disk. A [`PidConfig`] is resolved once
//! by the caller and then passed by reference into every classification call.
//!
//! # Example
//!
//! ```no_run
//! use radar_pid_core::config::{PidConfig, ThresholdStore};
//!
//! let store = ThresholdStore::with_defaults("/etc/radar-pid");
//! let config = PidConfig::from_store(&store, "nexrad")?;
//! assert!(config.thresholds().ends_with("pid_thresholds.nexrad"));
//! # Ok::<(), radar_pid_core::error::ConfigError>(())
//! ```

use crate::error::ConfigError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Radar band threshold profiles understood by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandProfile {
    /// S band, NEXRAD class set
    Nexrad,
    /// C band
    #[serde(rename = "cband")]
    CBand,
    /// X band
    #[serde(rename = "xband")]
    XBand,
}

impl BandProfile {
    /// Every known profile
    pub const ALL: [BandProfile; 3] = [BandProfile::Nexrad, BandProfile::CBand, BandProfile::XBand];

    /// Identifier used in configuration and file names
    pub fn name(self) -> &'static str {
        match self {
            BandProfile::Nexrad => "nexrad",
            BandProfile::CBand => "cband",
            BandProfile::XBand => "xband",
        }
    }

    /// Conventional thresholds file name for this band
    pub fn default_file_name(self) -> String {
        format!("pid_thresholds.{}", self.name())
    }
}

impl fmt::Display for BandProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BandProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        BandProfile::ALL
            .into_iter()
            .find(|p| p.name() == lower)
            .ok_or_else(|| ConfigError::UnknownProfile(s.to_string()))
    }
}

/// Mapping from band profile to thresholds file location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdStore {
    files: FxHashMap<BandProfile, PathBuf>,
}

impl ThresholdStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store mapping every band to `dir/pid_thresholds.<name>`
    pub fn with_defaults<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        let files = BandProfile::ALL
            .into_iter()
            .map(|p| (p, dir.join(p.default_file_name())))
            .collect();
        Self { files }
    }

    /// Register or replace the thresholds location for a band
    pub fn insert<P: Into<PathBuf>>(&mut self, profile: BandProfile, path: P) -> Option<PathBuf> {
        self.files.insert(profile, path.into())
    }

    /// Location registered for `profile`, if any
    pub fn get(&self, profile: BandProfile) -> Option<&Path> {
        self.files.get(&profile).map(PathBuf::as_path)
    }

    /// Resolve a profile identifier to its thresholds location.
    ///
    /// # Errors
    /// [`ConfigError::UnknownProfile`] if `name` is not a known band,
    /// [`ConfigError::Unregistered`] if the band has no location in this store.
    pub fn lookup(&self, name: &str) -> Result<(BandProfile, &Path), ConfigError> {
        let profile: BandProfile = name.parse()?;
        self.get(profile)
            .map(|path| (profile, path))
            .ok_or_else(|| ConfigError::Unregistered(profile.name().to_string()))
    }
}

/// Resolved configuration for one classifier session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    profile: BandProfile,
    thresholds: PathBuf,
    /// Marker written for bins without usable data
    pub missing: f64,
    /// Minimum fuzzy interest for a class to be accepted
    pub min_valid_interest: f64,
    /// Assumed receiver noise at 100 km (dBZ) for SNR estimation
    pub noise_dbz_at_100km: f64,
}

impl PidConfig {
    /// Default missing-value marker
    pub const MISSING: f64 = -9999.0;
    /// Default minimum valid interest
    pub const MIN_VALID_INTEREST: f64 = -10.0;
    /// Default noise level at 100 km (dBZ)
    pub const NOISE_DBZ_AT_100KM: f64 = 0.0;

    /// Resolve `name` in `store` and check the thresholds file exists.
    ///
    /// # Errors
    /// Any [`ConfigError`] from [`ThresholdStore::lookup`], or
    /// [`ConfigError::MissingThresholds`] if the file is absent.
    pub fn from_store(store: &ThresholdStore, name: &str) -> Result<Self, ConfigError> {
        let (profile, path) = store.lookup(name)?;
        if !path.is_file() {
            return Err(ConfigError::MissingThresholds(path.to_path_buf()));
        }
        info!("Using {} thresholds from {}", profile, path.display());
        Ok(Self::unchecked(profile, path))
    }

    /// Build a configuration without touching the filesystem
    pub fn unchecked<P: Into<PathBuf>>(profile: BandProfile, thresholds: P) -> Self {
        Self {
            profile,
            thresholds: thresholds.into(),
            missing: Self::MISSING,
            min_valid_interest: Self::MIN_VALID_INTEREST,
            noise_dbz_at_100km: Self::NOISE_DBZ_AT_100KM,
        }
    }

    /// Selected band profile
    pub fn profile(&self) -> BandProfile {
        self.profile
    }

    /// Thresholds file location
    pub fn thresholds(&self) -> &Path {
        &self.thresholds
    }

    /// Set the missing-value marker
    pub fn with_missing(mut self, missing: f64) -> Self {
        debug!("missing marker set to {missing}");
        self.missing = missing;
        self
    }

    /// Set the minimum valid interest
    pub fn with_min_valid_interest(mut self, value: f64) -> Self {
        self.min_valid_interest = value;
        self
    }

    /// Set the assumed noise level at 100 km
    pub fn with_noise_dbz_at_100km(mut self, value: f64) -> Self {
        self.noise_dbz_at_100km = value;
        self
    }
}
