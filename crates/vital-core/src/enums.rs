//! Session phase enum and its transition rules.
//!
//! Serialized as `snake_case`. [`Phase::allowed_next_states`] enforces the
//! controller's state machine at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

/// Lifecycle phase of one measurement session.
///
/// ```text
/// idle → initializing → active → completed
///                     ↘        ↘
///                       error    error
/// ```
///
/// Restarting is not a phase: it discards the whole controller and a fresh one
/// starts again from `idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Initializing,
    Active,
    Error,
    Completed,
}

impl Phase {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle => &[Self::Initializing],
            Self::Initializing => &[Self::Active, Self::Error],
            Self::Active => &[Self::Error, Self::Completed],
            Self::Error | Self::Completed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Validate a transition, returning [`CoreError::InvalidTransition`] when
    /// the state machine forbids it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if `next` is not reachable from `self`.
    pub fn transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Completed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Error => "error",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_allowed() {
        assert!(Phase::Idle.can_transition_to(Phase::Initializing));
        assert!(Phase::Initializing.can_transition_to(Phase::Active));
        assert!(Phase::Active.can_transition_to(Phase::Completed));
    }

    #[test]
    fn terminal_phases_have_no_successors() {
        assert!(Phase::Error.allowed_next_states().is_empty());
        assert!(Phase::Completed.allowed_next_states().is_empty());
        assert!(Phase::Error.is_terminal());
        assert!(!Phase::Active.is_terminal());
    }

    #[test]
    fn cannot_complete_before_active() {
        let err = Phase::Initializing.transition(Phase::Completed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid phase transition from initializing to completed"
        );
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Phase::Initializing).unwrap();
        assert_eq!(json, "\"initializing\"");
    }
}
