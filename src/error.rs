//! Centralized error types for orderscan.
//!
//! Extraction itself never fails; these errors come from the surfaces around
//! it (loading messages from disk, writing sinks).

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the orderscan library.
#[derive(Error, Debug)]
pub enum OrderScanError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file could not be turned into a message.
    #[error("Invalid message in '{path}': {reason}")]
    InvalidMessage { path: PathBuf, reason: String },

    /// A JSON document did not match the expected message shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input file type is not one we know how to load.
    #[error("Unsupported input (expected .json or .eml): {0}")]
    UnsupportedInput(PathBuf),

    /// Writing records to a sink failed.
    #[error("Export error: {0}")]
    Export(String),
}

/// Convenience alias for `Result<T, OrderScanError>`.
pub type Result<T> = std::result::Result<T, OrderScanError>;

impl OrderScanError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map a read failure to `FileNotFound` when appropriate, `Io` otherwise.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_read_maps_missing_file() {
        let err = OrderScanError::read("/tmp/gone.json", Error::from(ErrorKind::NotFound));
        assert!(matches!(err, OrderScanError::FileNotFound(ref p) if p.ends_with("gone.json")));
    }

    #[test]
    fn test_read_keeps_path_on_other_errors() {
        let err = OrderScanError::read("/tmp/locked.eml", Error::from(ErrorKind::PermissionDenied));
        match err {
            OrderScanError::Io { path, source } => {
                assert_eq!(path, PathBuf::from("/tmp/locked.eml"));
                assert_eq!(source.kind(), ErrorKind::PermissionDenied);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_io_error_message_names_path() {
        let err = OrderScanError::io("out/purchases.csv", Error::from(ErrorKind::Other));
        assert!(err.to_string().contains("out/purchases.csv"));
    }
}
