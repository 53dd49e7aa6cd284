//! services/client/src/error.rs
//!
//! Defines the primary error type for the entire client service.

use crate::config::ConfigError;
use postwall_core::ports::PortError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bad credentials at login. Surfaced to the login caller only; a prior
    /// session, if any, is left untouched.
    #[error("Invalid username or password")]
    Authentication,

    /// A protected mutation was attempted with no active session. Fetches
    /// degrade silently instead; the gate handles the redirect.
    #[error("No active session")]
    SessionMissing,

    /// Post text was empty or whitespace-only; rejected before any request.
    #[error("Post text must not be empty")]
    EmptyPostText,

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Backend error: {0}")]
    Backend(#[from] PortError),
}
