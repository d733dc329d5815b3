#![forbid(unsafe_code)]

//! Deterministic decision-run validation.
//!
//! One immutable input snapshot in, one content-addressed run namespace
//! of canonical JSON artifacts out.  The pipeline derives the run id from
//! the snapshot bytes, executes a fixed sequence of validation phases
//! that each emit artifacts and a proof, and enforces strict invariants
//! along the way: claims structure, allowlist membership, outcome/state
//! consistency, and a single run-state transition.  The first violation
//! is fatal; artifacts already written stay in place as the audit trail.
//!
//! Everything the validator produces is reproducible: identical
//! snapshots map to identical run ids, artifact serialization uses
//! sorted keys, and every directory walk is sorted before use.

pub mod allowlist;
pub mod canonical;
pub mod claims;
pub mod language_boundary;
pub mod outcome;
pub mod paths;
pub mod pipeline;
pub mod run_identity;
pub mod run_log;
pub mod run_state;
pub mod signature;
pub mod source_screen;

pub use pipeline::{PipelineError, RunPipeline, RunReport, ValidatorConfig};
pub use run_state::{RunState, RunStateMachine};
