//! Error handling.

use std::path::PathBuf;

/// The error that can occur when accessing repository indexes on disk.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O path error.
    #[error("I/O error at path {path} while {context}:\n{source}")]
    IoPath {
        /// The path at which the error occurred.
        path: PathBuf,

        /// The context in which the error occurred at `path`.
        ///
        /// This is meant to complete the sentence "I/O error at path {path}
        /// while ".
        context: &'static str,

        /// The source of the error.
        source: std::io::Error,
    },

    /// The repository lock is held by another process or cannot be created.
    #[error("Repository at {path} is locked:\n{source}")]
    Locked {
        /// The repository directory that could not be locked.
        path: PathBuf,

        /// The source of the error.
        source: std::io::Error,
    },

    /// An index document does not deserialize or serialize.
    #[error("Malformed index document at {path}:\n{source}")]
    Json {
        /// The overlay file affected.
        path: PathBuf,

        /// The source of the error.
        source: serde_json::Error,
    },

    /// Compressing or decompressing an index document failed.
    #[error("Compression error while {context}:\n{source}")]
    Compression {
        /// The context in which the error occurred.
        context: &'static str,

        /// The source of the error.
        source: std::io::Error,
    },
}
