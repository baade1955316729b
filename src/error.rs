//! Error types for the CI stack tooling.
//!
//! Every failure here is a configuration problem surfaced to the operator
//! before any provisioning call is made. None of them are retryable.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the CI stack tooling.
#[derive(Debug, Error)]
pub enum CiStackError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `serverAccessType` is unset or not a recognized access type.
    #[error(
        "Invalid serverAccessType: received {}, expected one of: ipv4, ipv6, prefixList, securityGroupId",
        received(.value.as_deref())
    )]
    InvalidAccessType {
        /// The received value, if any.
        value: Option<String>,
    },

    /// `restrictServerAccessTo` is unset or empty.
    #[error("Missing restrictServerAccessTo: a value is required for serverAccessType '{access_type}'")]
    MissingAccessValue {
        /// The access type the value was needed for.
        access_type: String,
    },

    /// `authType` is not a recognized authentication mode.
    #[error("Invalid authType: received '{value}', expected one of: default, github, oidc")]
    InvalidAuthType {
        /// The received value.
        value: String,
    },

    /// `jenkinsInstanceType` is not a recognized deployment type.
    #[error("Invalid jenkinsInstanceType: received '{value}', expected one of: BTR, gradle, benchmark, default")]
    InvalidDeploymentType {
        /// The received value.
        value: String,
    },

    /// `useSsl` is unset or not a literal boolean.
    #[error(
        "Invalid useSsl: received {}, expected one of: true, false",
        received(.value.as_deref())
    )]
    InvalidSslFlag {
        /// The received value, if any.
        value: Option<String>,
    },

    /// An optional boolean flag has a non-boolean value.
    #[error("Invalid {parameter}: received '{value}', expected one of: true, false")]
    InvalidFlag {
        /// The parameter name.
        parameter: String,
        /// The received value.
        value: String,
    },

    /// Two agent node definitions share a name.
    #[error("Duplicate agent node name: {name}")]
    DuplicateAgentNode {
        /// The duplicated name.
        name: String,
    },

    /// A context entry is not of the form `key=value`.
    #[error("Invalid context entry '{entry}': expected key=value")]
    InvalidContext {
        /// The malformed entry.
        entry: String,
    },

    /// A parameters or catalog file was not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A parameters or catalog file could not be parsed.
    #[error("Failed to parse {}: {message}", .location.as_deref().unwrap_or("input"))]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },
}

/// Result type alias for CI stack operations.
pub type Result<T> = std::result::Result<T, CiStackError>;

fn received(value: Option<&str>) -> String {
    value.map_or_else(|| String::from("nothing"), |v| format!("'{v}'"))
}

impl ConfigError {
    /// Returns the name of the deployment parameter this error refers to.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::InvalidAccessType { .. } => Some("serverAccessType"),
            Self::MissingAccessValue { .. } => Some("restrictServerAccessTo"),
            Self::InvalidAuthType { .. } => Some("authType"),
            Self::InvalidDeploymentType { .. } => Some("jenkinsInstanceType"),
            Self::InvalidSslFlag { .. } => Some("useSsl"),
            Self::InvalidFlag { parameter, .. } => Some(parameter.as_str()),
            Self::DuplicateAgentNode { .. } => Some("agentNodes"),
            Self::InvalidContext { .. } | Self::FileNotFound { .. } | Self::ParseError { .. } => {
                None
            }
        }
    }

    /// Creates a parse error with an optional source location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: Option<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }
}
