//! Error types for profile handling, threshold configuration and classification

use std::fmt;
use std::path::PathBuf;

/// Errors raised while building or evaluating a temperature profile
#[derive(Debug)]
pub enum ProfileError {
    /// Height and temperature columns have different lengths
    LengthMismatch {
        /// Number of profile heights
        heights: usize,
        /// Number of profile temperatures
        temperatures: usize,
    },
    /// Profile has fewer than the two points linear interpolation needs
    TooFewPoints(usize),
    /// No query heights were supplied
    EmptyQuery,
    /// A profile height or temperature is NaN or infinite
    NonFinite {
        /// Index of the offending profile level
        index: usize,
    },
    /// Profile heights are neither strictly ascending nor strictly descending
    NotMonotonic {
        /// Index of the first level that breaks the ordering
        index: usize,
    },
    /// A profile line could not be parsed
    Parse {
        /// 1-based line number in the source
        line: usize,
        /// What went wrong
        message: String,
    },
    /// The profile source could not be read
    Io(std::io::Error),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::LengthMismatch {
                heights,
                temperatures,
            } => write!(
                f,
                "Profile has {heights} heights but {temperatures} temperatures"
            ),
            ProfileError::TooFewPoints(n) => {
                write!(f, "Profile needs at least 2 points, got {n}")
            }
            ProfileError::EmptyQuery => write!(f, "No query heights supplied"),
            ProfileError::NonFinite { index } => {
                write!(f, "Profile level {index} is not finite")
            }
            ProfileError::NotMonotonic { index } => write!(
                f,
                "Profile heights are not strictly monotonic at level {index}"
            ),
            ProfileError::Parse { line, message } => {
                write!(f, "Failed to parse profile line {line}: {message}")
            }
            ProfileError::Io(e) => write!(f, "Failed to read profile: {e}"),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProfileError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ProfileError {
    fn from(e: std::io::Error) -> Self {
        ProfileError::Io(e)
    }
}

/// Errors raised while resolving the threshold store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Identifier is not one of the known band profiles
    UnknownProfile(String),
    /// Band profile is known but no thresholds location is registered for it
    Unregistered(String),
    /// Thresholds file does not exist
    MissingThresholds(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownProfile(name) => {
                write!(f, "Unknown threshold profile '{name}'")
            }
            ConfigError::Unregistered(name) => {
                write!(f, "No thresholds registered for profile '{name}'")
            }
            ConfigError::MissingThresholds(path) => {
                write!(f, "Thresholds file not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors reported by an external classification engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Thresholds could not be loaded
    Thresholds(String),
    /// The engine failed on a ray
    Ray {
        /// Ray index
        ray: usize,
        /// Engine message
        message: String,
    },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::Thresholds(msg) => write!(f, "Failed to load thresholds: {msg}"),
            ClassifyError::Ray { ray, message } => {
                write!(f, "Classification failed on ray {ray}: {message}")
            }
        }
    }
}

impl std::error::Error for ClassifyError {}

/// Errors from a full scan classification
#[derive(Debug)]
pub enum PidError {
    /// Temperature profile problem
    Profile(ProfileError),
    /// Threshold configuration problem
    Config(ConfigError),
    /// Classification engine failure
    Classifier(ClassifyError),
    /// A moment the classifier cannot run without is absent from the scan
    MissingParameter(&'static str),
    /// Scan has no rays or no bins
    EmptyScan,
    /// A per-ray array does not have one value per bin
    ShapeMismatch {
        /// Ray index
        ray: usize,
        /// Bins in the scan
        expected: usize,
        /// Values supplied
        found: usize,
    },
}

impl fmt::Display for PidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PidError::Profile(e) => write!(f, "{e}"),
            PidError::Config(e) => write!(f, "{e}"),
            PidError::Classifier(e) => write!(f, "{e}"),
            PidError::MissingParameter(name) => {
                write!(f, "Scan is missing required parameter {name}")
            }
            PidError::EmptyScan => write!(f, "Scan has no rays or bins"),
            PidError::ShapeMismatch {
                ray,
                expected,
                found,
            } => write!(f, "Ray {ray} has {found} values for {expected} bins"),
        }
    }
}

impl std::error::Error for PidError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PidError::Profile(e) => Some(e),
            PidError::Config(e) => Some(e),
            PidError::Classifier(e) => Some(e),
            PidError::MissingParameter(_)
            | PidError::EmptyScan
            | PidError::ShapeMismatch { .. } => None,
        }
    }
}

impl From<ProfileError> for PidError {
    fn from(e: ProfileError) -> Self {
        PidError::Profile(e)
    }
}

impl From<ConfigError> for PidError {
    fn from(e: ConfigError) -> Self {
        PidError::Config(e)
    }
}

impl From<ClassifyError> for PidError {
    fn from(e: ClassifyError) -> Self {
        PidError::Classifier(e)
    }
}
