//! Cross-cutting error types.
//!
//! Domain-specific errors (`ConfigError`, `AuthError`, `SessionError`) live in
//! their own crates. The binary converges them through `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A phase transition was attempted that the state machine does not allow.
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Data failed validation (ranges, format).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
