//! Error types for the Orchard Engine binary.
//!
//! [`AppError`] wraps every failure mode of startup and the run so that
//! `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the Orchard Engine binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: orchard_core::ConfigError,
    },

    /// Engine construction or a tick failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: orchard_core::EngineError,
    },

    /// A climate history file could not be read.
    #[error("failed to read history file {}: {source}", path.display())]
    HistoryRead {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A climate history file was not valid JSON.
    #[error("failed to parse history file {}: {source}", path.display())]
    HistoryParse {
        /// Path that was parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The run report could not be written.
    #[error("report error: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing the report to stdout failed.
    #[error("failed to write report: {source}")]
    Output {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Command-line usage error.
    #[error("usage: {message}")]
    Usage {
        /// Description of the problem.
        message: String,
    },
}
