//! Error types for persistence operations.
//!
//! Every filesystem variant carries the absolute path it was reported for,
//! so a failure can be diagnosed without re-running.

use std::path::PathBuf;

use get5_config_core::MatchError;
use thiserror::Error;

/// Errors that can occur while resolving, reading or writing files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The path was empty or whitespace-only.
    #[error("cannot use an empty or whitespace-only path")]
    EmptyPath,

    /// The path could not be made absolute.
    #[error("couldn't determine absolute path of {}: {source}", .path.display())]
    Resolve {
        /// Path as given.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Nothing exists at the path.
    #[error("path {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The path names a directory rather than a file.
    #[error("path {} is a directory and not a file", .0.display())]
    IsDirectory(PathBuf),

    /// Reading the file failed.
    #[error("couldn't read {}: {source}", .path.display())]
    Read {
        /// Absolute path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the file failed.
    #[error("couldn't write {}: {source}", .path.display())]
    Write {
        /// Absolute path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a usable match document.
    #[error("{}: {source}", .path.display())]
    Match {
        /// Absolute path of the file.
        path: PathBuf,
        /// Decoding or encoding failure.
        #[source]
        source: MatchError,
    },

    /// The tool configuration file could not be parsed or serialized.
    #[error("invalid tool configuration {}: {source}", .path.display())]
    Config {
        /// Absolute path of the file.
        path: PathBuf,
        /// YAML failure.
        #[source]
        source: serde_yaml::Error,
    },
}

impl StoreError {
    /// Returns `true` for filesystem failures, as opposed to content that
    /// could not be decoded.
    pub fn is_io(&self) -> bool {
        !matches!(self, StoreError::Match { .. } | StoreError::Config { .. })
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
