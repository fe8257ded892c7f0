//! Error types for the configuration layer.
//!
//! The timer core itself never fails; operations that do not apply are
//! no-ops. Errors only come from loading, validating and saving [`Config`].
//!
//! [`Config`]: crate::config::Config

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while handling widget configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// The config file could not be read.
    #[error("failed to read config at {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be written.
    #[error("failed to write config at {path}: {source}")]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML text did not describe a config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field held a value the widget cannot use.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Result alias used by the configuration layer.
pub type Result<T> = std::result::Result<T, Error>;
