//! Error types for Spyglass.
//!
//! Uses `thiserror` for ergonomic error definitions. Only [`CatalogError`]
//! and [`ConfigError`] are ever fatal to a run; [`CollectError`] is absorbed
//! by the probe that produced it.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating an indicator catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to parse catalog {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    #[error("invalid confidence level '{0}' (expected low, medium or high)")]
    InvalidConfidence(String),

    #[error("vendor '{vendor}': invalid USB id '{value}'")]
    InvalidUsbId { vendor: String, value: String },

    #[error("vendor '{vendor}': invalid MAC prefix '{prefix}'")]
    InvalidMacPrefix { vendor: String, prefix: String },

    #[error("vendor '{vendor}': favicon hash {value} is outside the 32-bit range")]
    InvalidFaviconHash { vendor: String, value: i64 },

    #[error("catalog contains an empty vendor name")]
    EmptyVendor,

    #[error("no indicator catalog found (searched: {0})")]
    NotFound(String),
}

/// Errors from a single collection attempt.
///
/// These never abort a sweep: the probe that hits one logs it and moves on.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("operation timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("no certificate presented by {0}")]
    NoCertificate(String),

    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("{program} exited with status {code:?}")]
    ProcessFailed { program: String, code: Option<i32> },

    #[error("no descriptor data from {0}")]
    NoData(String),

    #[error("resolution failed for {0}")]
    Unresolved(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectError {
    /// Whether the remote end answered at all (as opposed to being unreachable).
    pub fn host_responded(&self) -> bool {
        matches!(self, Self::HttpStatus(_))
    }
}

/// Configuration and settings errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error for CLI command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for collection attempts.
pub type CollectResult<T> = Result<T, CollectError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for CLI handlers.
pub type CliResult<T> = Result<T, CliError>;
