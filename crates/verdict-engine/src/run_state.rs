//! Run lifecycle state and the single-transition invariant.
//!
//! A run begins `INVALID` and is allowed to move away from that state
//! exactly once over its lifetime.  Re-asserting the current state is a
//! no-op; a second distinct transition is an invariant violation.  A run
//! that ends while still `INVALID` never recorded a deliberate decision,
//! which is equally fatal.
//!
//! The machine is a plain value owned by the pipeline and passed by
//! reference; there is no process-wide singleton.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Terminal classification of a run's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    /// Initial, unresolved state.  Ending a run here is fatal.
    Invalid,
    /// The run was deliberately refused.
    Refused,
    /// The run resolved to an advisory decision.
    Advisory,
    /// The run resolved to a blocking decision.
    Blocking,
}

impl RunState {
    /// Stable uppercase name as embedded in artifacts.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Refused => "REFUSED",
            Self::Advisory => "ADVISORY",
            Self::Blocking => "BLOCKING",
        }
    }

    /// Whether this state reflects a deliberate decision.
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).as_str())
    }
}

// ---------------------------------------------------------------------------
// RunStateError
// ---------------------------------------------------------------------------

/// Violations of the run-state lifecycle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStateError {
    /// A second distinct transition was attempted.
    TransitionLimitExceeded,
    /// The run ended without ever leaving the initial state.
    EndedInvalid,
}

impl fmt::Display for RunStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransitionLimitExceeded => {
                f.write_str("Run state transitioned more than once")
            }
            Self::EndedInvalid => f.write_str("Execution ended with run_state = INVALID"),
        }
    }
}

impl std::error::Error for RunStateError {}

impl RunStateError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TransitionLimitExceeded => "run_state_transition_limit",
            Self::EndedInvalid => "run_state_ended_invalid",
        }
    }
}

// ---------------------------------------------------------------------------
// RunStateMachine
// ---------------------------------------------------------------------------

/// Tracks the run's lifecycle state behind a guarded setter.
///
/// The transition counter is the only mutable bookkeeping: identical
/// re-assertions leave it untouched, and the first counter value above 1
/// aborts the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStateMachine {
    current: RunState,
    transitions: u32,
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            current: RunState::Invalid,
            transitions: 0,
        }
    }

    /// Current state, read-only.
    pub fn state(&self) -> RunState {
        self.current
    }

    /// Number of distinct transitions taken so far.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    /// Guarded setter enforcing the single-transition invariant.
    ///
    /// No-op when `new` equals the current state.  On the second distinct
    /// transition the counter trips, the state is left unchanged, and the
    /// violation is returned.
    pub fn set_state(&mut self, new: RunState) -> Result<(), RunStateError> {
        if self.current == new {
            return Ok(());
        }
        self.transitions += 1;
        if self.transitions > 1 {
            return Err(RunStateError::TransitionLimitExceeded);
        }
        self.current = new;
        Ok(())
    }

    /// Terminal check: a run must end in a resolved state.
    pub fn finish(&self) -> Result<RunState, RunStateError> {
        if self.current.is_resolved() {
            Ok(self.current)
        } else {
            Err(RunStateError::EndedInvalid)
        }
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- RunState --

    #[test]
    fn state_names_are_uppercase() {
        assert_eq!(RunState::Invalid.as_str(), "INVALID");
        assert_eq!(RunState::Refused.as_str(), "REFUSED");
        assert_eq!(RunState::Advisory.as_str(), "ADVISORY");
        assert_eq!(RunState::Blocking.as_str(), "BLOCKING");
    }

    #[test]
    fn state_serializes_to_uppercase() {
        let json = serde_json::to_string(&RunState::Advisory).expect("serialize");
        assert_eq!(json, "\"ADVISORY\"");
        let restored: RunState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, RunState::Advisory);
    }

    #[test]
    fn only_invalid_is_unresolved() {
        assert!(!RunState::Invalid.is_resolved());
        assert!(RunState::Refused.is_resolved());
        assert!(RunState::Advisory.is_resolved());
        assert!(RunState::Blocking.is_resolved());
    }

    // -- RunStateMachine --

    #[test]
    fn machine_starts_invalid_with_zero_transitions() {
        let machine = RunStateMachine::new();
        assert_eq!(machine.state(), RunState::Invalid);
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn single_transition_is_accepted() {
        let mut machine = RunStateMachine::new();
        machine.set_state(RunState::Advisory).expect("first transition");
        assert_eq!(machine.state(), RunState::Advisory);
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn reasserting_current_state_never_counts() {
        let mut machine = RunStateMachine::new();
        machine.set_state(RunState::Invalid).expect("no-op");
        machine.set_state(RunState::Invalid).expect("no-op");
        assert_eq!(machine.transition_count(), 0);

        machine.set_state(RunState::Blocking).expect("first transition");
        machine.set_state(RunState::Blocking).expect("no-op");
        machine.set_state(RunState::Blocking).expect("no-op");
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn second_distinct_transition_is_rejected() {
        let mut machine = RunStateMachine::new();
        machine.set_state(RunState::Advisory).expect("first transition");
        let err = machine.set_state(RunState::Refused).unwrap_err();
        assert_eq!(err, RunStateError::TransitionLimitExceeded);
        // State is left where the last valid transition put it.
        assert_eq!(machine.state(), RunState::Advisory);
    }

    #[test]
    fn finish_rejects_unresolved_run() {
        let machine = RunStateMachine::new();
        let err = machine.finish().unwrap_err();
        assert_eq!(err, RunStateError::EndedInvalid);
    }

    #[test]
    fn finish_returns_resolved_state() {
        let mut machine = RunStateMachine::new();
        machine.set_state(RunState::Refused).expect("transition");
        assert_eq!(machine.finish().expect("resolved"), RunState::Refused);
    }

    // -- Error display --

    #[test]
    fn error_display_matches_diagnostics() {
        assert_eq!(
            RunStateError::TransitionLimitExceeded.to_string(),
            "Run state transitioned more than once"
        );
        assert_eq!(
            RunStateError::EndedInvalid.to_string(),
            "Execution ended with run_state = INVALID"
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            RunStateError::TransitionLimitExceeded.error_code(),
            "run_state_transition_limit"
        );
        assert_eq!(RunStateError::EndedInvalid.error_code(), "run_state_ended_invalid");
    }
}
