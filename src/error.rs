//! Error types for pulse-shim.

use thiserror::Error;

/// Result type alias using pulse-shim's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bridging the engine into the host.
#[derive(Error, Debug)]
pub enum Error {
    /// The host rejected a command registration
    #[error("Registration error: alias '{alias}' - {message}")]
    Registration { alias: String, message: String },

    /// The engine rejected or failed a command execution
    #[error("Command error: {0}")]
    Command(String),

    /// No active session/sender to execute against
    #[error("No active command sender")]
    NoActiveSender,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a registration error for a specific alias.
    pub fn registration(alias: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            alias: alias.into(),
            message: message.into(),
        }
    }

    /// Create a command execution error.
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
