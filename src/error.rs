//! Error types for the fallible edges of the crate.
//!
//! The simulation itself never fails. Storage access, JSON decoding and tuning
//! validation do, and hosts are expected to log these and fall back to defaults.

use std::fmt;

/// Errors raised by persistence and configuration.
#[derive(Debug)]
pub enum ArcadeError {
    /// No storage backend is reachable (e.g. LocalStorage disabled).
    StorageUnavailable,

    /// Reading or writing a native storage file failed.
    Io(std::io::Error),

    /// A stored or supplied JSON document could not be encoded or decoded.
    Serialization(serde_json::Error),

    /// A tuning value is outside the range the simulation can run with.
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl fmt::Display for ArcadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArcadeError::StorageUnavailable => write!(f, "storage backend unavailable"),
            ArcadeError::Io(err) => write!(f, "storage I/O failed: {err}"),
            ArcadeError::Serialization(err) => write!(f, "serialization failed: {err}"),
            ArcadeError::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning value `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ArcadeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArcadeError::Io(err) => Some(err),
            ArcadeError::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ArcadeError {
    fn from(err: serde_json::Error) -> Self {
        ArcadeError::Serialization(err)
    }
}

impl From<std::io::Error> for ArcadeError {
    fn from(err: std::io::Error) -> Self {
        ArcadeError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_tuning() {
        let err = ArcadeError::InvalidTuning {
            field: "invader_cols",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid tuning value `invader_cols`: must be at least 1"
        );
    }

    #[test]
    fn test_serialization_error_has_source() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = ArcadeError::from(json_err);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("serialization failed"));
    }

    #[test]
    fn test_io_error_converts() {
        let err = ArcadeError::from(std::io::Error::other("disk full"));
        assert!(matches!(err, ArcadeError::Io(_)));
        assert_eq!(err.to_string(), "storage I/O failed: disk full");
    }
}
