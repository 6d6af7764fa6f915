//! Error types for astrarium.
//!
//! This module provides error types for engine construction, configuration
//! loading, and Oracle queries.

use std::fmt;

/// Errors that can occur while building or running an engine.
#[derive(Debug)]
pub enum EngineError {
    /// Configuration could not be parsed.
    Config(ConfigError),
    /// A structure id was referenced but never configured.
    UnknownStructure(String),
    /// A body id was referenced but does not exist in its structure.
    UnknownBody(String),
    /// The engine was used after `shutdown()`.
    ShutDown,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(e) => write!(f, "Configuration error: {}", e),
            EngineError::UnknownStructure(id) => write!(f, "Unknown structure id: {}", id),
            EngineError::UnknownBody(id) => write!(f, "Unknown body id: {}", id),
            EngineError::ShutDown => write!(f, "Engine has been shut down"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::Config(e)
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// JSON could not be deserialized.
    Json(serde_json::Error),
    /// A value was structurally valid but out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Failed to parse config JSON: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors reported for Oracle queries.
///
/// These never propagate out of the tick loop; they are converted into a
/// fully populated fallback record before consumers see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// No response arrived within the configured window.
    Timeout,
    /// The response did not match the requested schema.
    SchemaMismatch(String),
    /// The external client reported a failure.
    Client(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Timeout => write!(f, "Oracle query timed out"),
            OracleError::SchemaMismatch(msg) => {
                write!(f, "Oracle response did not match schema: {}", msg)
            }
            OracleError::Client(msg) => write!(f, "Oracle client error: {}", msg),
        }
    }
}

impl std::error::Error for OracleError {}
