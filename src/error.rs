//! Unified error handling for the scan-map library.
//!
//! Storage and serialization failures surface as a single error type so the
//! host shell sees them instead of an empty map.

use std::fmt;

/// Unified error type for scan-map operations.
#[derive(Debug, Clone)]
pub enum ScanMapError {
    /// Key-value store could not be opened, read or written
    Storage { message: String },
    /// The stored scan history is not a JSON array
    MalformedHistory { key: String, message: String },
    /// A value could not be serialized for storage or export
    Serialization { message: String },
    /// Configuration error
    Config { message: String },
}

impl fmt::Display for ScanMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMapError::Storage { message } => write!(f, "Storage error: {}", message),
            ScanMapError::MalformedHistory { key, message } => {
                write!(f, "Stored value '{}' is not a scan history: {}", key, message)
            }
            ScanMapError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
            ScanMapError::Config { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for ScanMapError {}

impl From<serde_json::Error> for ScanMapError {
    fn from(err: serde_json::Error) -> Self {
        ScanMapError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "persistence")]
impl From<rusqlite::Error> for ScanMapError {
    fn from(err: rusqlite::Error) -> Self {
        ScanMapError::Storage {
            message: err.to_string(),
        }
    }
}

/// Result type alias for scan-map operations.
pub type Result<T> = std::result::Result<T, ScanMapError>;
