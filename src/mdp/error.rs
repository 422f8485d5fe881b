//! Error type shared by the solvers and the bundled environments.

use thiserror::Error;

/// Failure of a dynamic-programming solve, an episode, or an environment
/// construction.
///
/// States and actions are carried as their `Debug` rendering so the error
/// stays independent of the environment's associated types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DpError {
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error("policy defines no action for non-terminal state {state}")]
    MissingAction { state: String },

    #[error("environment offers no legal action in non-terminal state {state}")]
    NoActions { state: String },

    #[error("state {state} is not part of the enumerated state space")]
    UnknownState { state: String },

    #[error("illegal action {action} in state {state}")]
    IllegalAction { state: String, action: String },

    #[error("did not converge after {sweeps} sweeps (last delta {delta:e})")]
    NotConverged { sweeps: usize, delta: f64 },

    #[error("episode hit the {steps}-step limit before a terminal state")]
    StepLimit { steps: usize },

    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    #[error("episode already finished in terminal state {state}")]
    EpisodeFinished { state: String },
}

impl DpError {
    pub(crate) fn missing_action<S: std::fmt::Debug>(state: &S) -> Self {
        DpError::MissingAction {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn no_actions<S: std::fmt::Debug>(state: &S) -> Self {
        DpError::NoActions {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn unknown_state<S: std::fmt::Debug>(state: &S) -> Self {
        DpError::UnknownState {
            state: format!("{state:?}"),
        }
    }

    pub(crate) fn illegal_action<S: std::fmt::Debug, A: std::fmt::Debug>(
        state: &S,
        action: &A,
    ) -> Self {
        DpError::IllegalAction {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_action_display() {
        let e = DpError::missing_action(&(1usize, 3usize));
        assert_eq!(
            e.to_string(),
            "policy defines no action for non-terminal state (1, 3)"
        );
    }

    #[test]
    fn test_illegal_action_display() {
        let e = DpError::illegal_action(&(0usize, 2usize), &"take");
        let s = e.to_string();
        assert!(s.contains("illegal action \"take\""));
        assert!(s.contains("(0, 2)"));
    }

    #[test]
    fn test_not_converged_display() {
        let e = DpError::NotConverged {
            sweeps: 10,
            delta: 0.5,
        };
        assert!(e.to_string().starts_with("did not converge after 10 sweeps"));
    }
}
