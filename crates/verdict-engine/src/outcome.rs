//! Outcome-artifact consistency: the terminal artifact must match the
//! machine's recorded state.
//!
//! At most one of the two outcome base names may exist in a run
//! namespace.  A refusal marker demands a `REFUSED` run state; a decision
//! summary demands `ADVISORY` or `BLOCKING`.  No summary output may
//! coexist with an unresolved or refused run.

use std::fmt;
use std::path::PathBuf;

use crate::run_state::RunState;

/// Refusal outcome marker.
pub const REFUSAL_ARTIFACT: &str = "refusal.json";
/// Decision-summary outcome marker.
pub const DECISION_SUMMARY_ARTIFACT: &str = "decision_summary.json";

// ---------------------------------------------------------------------------
// OutcomeError
// ---------------------------------------------------------------------------

/// Violations of outcome consistency.  All fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    /// Both outcome markers exist at once.
    MultipleOutcomes,
    /// The present outcome marker contradicts the recorded run state.
    StateContradiction {
        artifact: String,
        run_state: RunState,
    },
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleOutcomes => f.write_str("More than one outcome artifact exists"),
            Self::StateContradiction { .. } => {
                f.write_str("Run state contradicts outcome artifact type")
            }
        }
    }
}

impl std::error::Error for OutcomeError {}

impl OutcomeError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MultipleOutcomes => "outcome_multiple",
            Self::StateContradiction { .. } => "outcome_state_contradiction",
        }
    }
}

// ---------------------------------------------------------------------------
// Consistency check
// ---------------------------------------------------------------------------

/// Check the enumerated namespace artifacts against the recorded state.
pub fn check_outcome_consistency(
    namespace_artifacts: &[PathBuf],
    run_state: RunState,
) -> Result<(), OutcomeError> {
    let present: Vec<&str> = namespace_artifacts
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
        .filter(|name| *name == REFUSAL_ARTIFACT || *name == DECISION_SUMMARY_ARTIFACT)
        .collect();

    if present.len() > 1 {
        return Err(OutcomeError::MultipleOutcomes);
    }

    if present.contains(&REFUSAL_ARTIFACT) {
        if run_state != RunState::Refused {
            return Err(OutcomeError::StateContradiction {
                artifact: REFUSAL_ARTIFACT.to_string(),
                run_state,
            });
        }
    } else if present.contains(&DECISION_SUMMARY_ARTIFACT)
        && !matches!(run_state, RunState::Advisory | RunState::Blocking)
    {
        return Err(OutcomeError::StateContradiction {
            artifact: DECISION_SUMMARY_ARTIFACT.to_string(),
            run_state,
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
