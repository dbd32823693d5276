//! Unified error types for the Stratus workspace.
//!
//! Degraded-mode skips (no domain, no compute node) are never represented
//! here: they are successful compositions reported through diagnostics.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StratusError {
    /// Malformed or contradictory input, or an unresolvable cross-reference.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A component was invoked with a required handle that was never resolved.
    #[error("unresolved dependency for {component}: {missing} is not available")]
    Dependency {
        /// Component that requested the dependency.
        component: String,
        /// Name of the missing handle or resource.
        missing: String,
    },

    /// A low-level parameter is out of range.
    #[error("invalid spec for {component}: {message}")]
    InvalidSpec {
        /// Component that rejected the parameter.
        component: String,
        /// Description of the rejected parameter.
        message: String,
    },

    /// A domain name failed syntactic validation.
    #[error("invalid domain name \"{domain}\": {reason}")]
    InvalidDomain {
        /// The rejected domain name.
        domain: String,
        /// Why the name was rejected.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML serialization or deserialization failed.
    #[error("yaml error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl StratusError {
    /// Shorthand for a [`StratusError::Configuration`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a [`StratusError::Dependency`] error.
    pub fn dependency(component: impl Into<String>, missing: impl Into<String>) -> Self {
        Self::Dependency {
            component: component.into(),
            missing: missing.into(),
        }
    }

    /// Shorthand for a [`StratusError::InvalidSpec`] error.
    pub fn invalid_spec(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StratusError>;
