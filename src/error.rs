//! Error types for Hostsmith
//!
//! Uses `thiserror` for library errors. `main` wraps these in `anyhow`
//! at the CLI boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::RemoteError;

/// Result type alias for Hostsmith operations
pub type HostsmithResult<T> = Result<T, HostsmithError>;

/// Main error type for Hostsmith operations
#[derive(Error, Debug)]
pub enum HostsmithError {
    /// Asset directory missing or not a directory
    #[error("asset directory not found: {path}")]
    AssetDirectoryNotFound { path: PathBuf },

    /// A template placeholder references a key absent from the mapping
    #[error("template {file} references missing key '{key}'")]
    MissingTemplateKey { key: String, file: PathBuf },

    /// A `{` without a matching `}` (or a stray `}`) in a template
    #[error("unbalanced braces in template {file}")]
    UnbalancedBrace { file: PathBuf },

    /// Two templates collapse to the same remote path
    #[error("templates {first} and {second} both map to remote path {path}")]
    DuplicateRemotePath {
        path: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// The task graph contains a dependency cycle
    #[error("dependency cycle involving step '{step}'")]
    DependencyCycle { step: String },

    /// No ACME directory entry matches the requested staging mode
    #[error("no ACME directory matches staging={staging}")]
    AcmeDirectoryNotFound { staging: bool },

    /// Configuration file missing
    #[error("configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Semantically invalid configuration
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A remote query returned something other than the expected shape
    #[error("unexpected remote response: {message}")]
    UnexpectedResponse { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Remote channel failure (connection, copy, or non-zero exit)
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
