//! The sequential decision-run pipeline.
//!
//! One invocation validates exactly one run: derive the content-addressed
//! identity, process claims, classify language boundaries, emit the
//! interface proof and canonical-signature verdict, resolve the run
//! state, then enforce the allowlist and outcome invariants over the full
//! namespace.  The first violation stops the pipeline; artifacts already
//! written stay in place as the audit trail.
//!
//! There is no retry, no concurrency, and no partial-failure recovery.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::allowlist::{Allowlist, AllowlistError};
use crate::canonical::{
    enumerate_json_artifacts, ArtifactWriteError, PhaseProof, PhaseWriter, PROOF_ARTIFACT_NAME,
};
use crate::claims::{self, Claim, ClaimsError};
use crate::language_boundary::{self, BoundaryError, LanguageBoundaryArtifact};
use crate::outcome::{check_outcome_consistency, OutcomeError};
use crate::paths::RunPaths;
use crate::run_identity::{RunIdentity, SnapshotError};
use crate::run_log::{RunLog, RunLogError};
use crate::run_state::{RunState, RunStateError, RunStateMachine};
use crate::signature::{compute_canonical_signature, SignatureError, VerdictArtifact};

// ---------------------------------------------------------------------------
// Phase numbering and artifact names
// ---------------------------------------------------------------------------

/// Final aggregate proof.
pub const PHASE_AGGREGATE: u32 = 0;
/// Claims uncertainty phase.
pub const PHASE_UNCERTAINTY: u32 = 13;
/// Language boundary phase.
pub const PHASE_LANGUAGE_BOUNDARY: u32 = 14;
/// Interface proof phase.
pub const PHASE_INTERFACE: u32 = 15;
/// Canonical-signature verdict phase.
pub const PHASE_VERDICT: u32 = 16;

pub const UNCERTAINTY_ARTIFACT: &str = "uncertainty.decision.json";
pub const LANGUAGE_BOUNDARY_ARTIFACT: &str = "language_boundary.decision.json";
pub const INTERFACE_PROOF_ARTIFACT: &str = "interface.proof.json";
pub const FINAL_VERDICT_ARTIFACT: &str = "final.verdict.json";

/// Interface contract asserted by the interface proof.
pub const INTERFACE_CONTRACT: &str = "artifact-only";
/// Interaction surfaces the validator forswears.
pub const FORBIDDEN_INTERFACES: [&str; 5] =
    ["stdin", "stdout", "UI", "CLI", "logs with decisions"];

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Any fatal condition, from any stage.  Display is the single
/// user-visible diagnostic line.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Claims(#[from] ClaimsError),
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
    #[error(transparent)]
    State(#[from] RunStateError),
    #[error(transparent)]
    Allowlist(#[from] AllowlistError),
    #[error(transparent)]
    Outcome(#[from] OutcomeError),
    #[error(transparent)]
    Artifact(#[from] ArtifactWriteError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Log(#[from] RunLogError),
}

impl PipelineError {
    /// Stable error code for structured logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Snapshot(err) => err.error_code(),
            Self::Claims(err) => err.error_code(),
            Self::Boundary(err) => err.error_code(),
            Self::State(err) => err.error_code(),
            Self::Allowlist(err) => err.error_code(),
            Self::Outcome(err) => err.error_code(),
            Self::Artifact(err) => err.error_code(),
            Self::Signature(err) => err.error_code(),
            Self::Log(err) => err.error_code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration and report
// ---------------------------------------------------------------------------

/// Pipeline configuration, built once by the caller and never mutated.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Working root the filesystem contract resolves against.
    pub root: PathBuf,
    /// Wall-clock timestamp stamped on run-log events.  Caller-supplied
    /// so the library core stays deterministic.
    pub timestamp_unix_ms: u64,
    /// Language-tag corpus classified in the boundary phase.
    pub language_corpus: Vec<String>,
}

impl ValidatorConfig {
    pub fn new(root: impl Into<PathBuf>, timestamp_unix_ms: u64) -> Self {
        Self {
            root: root.into(),
            timestamp_unix_ms,
            language_corpus: language_boundary::fixture_corpus(),
        }
    }
}

/// Summary of a successfully completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub run_state: RunState,
    pub signature: String,
    pub artifact_count: usize,
}

// ---------------------------------------------------------------------------
// Intermediate artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UncertaintyArtifact {
    claims: Vec<Claim>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InterfaceProofArtifact {
    forbidden: Vec<String>,
    interface: String,
}

impl InterfaceProofArtifact {
    fn current() -> Self {
        Self {
            forbidden: FORBIDDEN_INTERFACES.iter().map(|s| (*s).to_string()).collect(),
            interface: INTERFACE_CONTRACT.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RunPipeline
// ---------------------------------------------------------------------------

/// Drives one run front to back.  Consumed by [`RunPipeline::execute`]:
/// a pipeline value validates exactly one run.
#[derive(Debug)]
pub struct RunPipeline {
    paths: RunPaths,
    language_corpus: Vec<String>,
    timestamp_unix_ms: u64,
    state: RunStateMachine,
}

impl RunPipeline {
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            paths: RunPaths::new(config.root),
            language_corpus: config.language_corpus,
            timestamp_unix_ms: config.timestamp_unix_ms,
            state: RunStateMachine::new(),
        }
    }

    /// Execute the full phase sequence.
    ///
    /// On failure the run log is still flushed (best effort) so the audit
    /// trail records what aborted the run; on success a flush failure is
    /// itself fatal.
    pub fn execute(mut self) -> Result<RunReport, PipelineError> {
        let identity = RunIdentity::establish(&self.paths)?;
        let run_dir = self.paths.run_dir(identity.run_id());
        let mut log = RunLog::new(identity.run_id(), self.timestamp_unix_ms);
        log.record_pass("run_identity", "namespace_established");

        let result = self.run_phases(&identity, &run_dir, &mut log);
        match &result {
            Ok(_) => log.record_pass("pipeline", "completed"),
            Err(err) => log.record_fail("pipeline", "aborted", err.error_code()),
        }
        if let Err(flush_err) = log.flush(&run_dir) {
            if result.is_ok() {
                return Err(flush_err.into());
            }
        }
        result
    }

    fn run_phases(
        &mut self,
        identity: &RunIdentity,
        run_dir: &Path,
        log: &mut RunLog,
    ) -> Result<RunReport, PipelineError> {
        let run_id = identity.run_id();

        let allowlist = Allowlist::load(&self.paths.allowlist())?;
        log.record_pass("allowlist", "loaded");

        let mut claims = claims::load_claims(&self.paths.claims())?;
        claims::rewrite_uncertain(&mut claims);
        log.record_pass("claims", "validated");

        // Phase 13: the uncertainty artifact reflects rewritten text; the
        // mutation probe runs before the phase proof closes.
        let mut phase = PhaseWriter::new(run_dir, PHASE_UNCERTAINTY);
        phase.write_json(
            UNCERTAINTY_ARTIFACT,
            &UncertaintyArtifact {
                claims: claims.clone(),
            },
        )?;
        claims::apply_mutation_probe(&mut claims)?;
        phase.emit_proof(run_id, self.state.state())?;
        log.record_pass("claims", "uncertainty_phase_closed");

        // Phase 14: classification precedes any artifact write, so a tie
        // leaves no trace of this phase.
        let baseline = language_boundary::classify(&self.language_corpus)?;
        let mut phase = PhaseWriter::new(run_dir, PHASE_LANGUAGE_BOUNDARY);
        phase.write_json(
            LANGUAGE_BOUNDARY_ARTIFACT,
            &LanguageBoundaryArtifact::from_boundary(&baseline),
        )?;
        language_boundary::perturb_and_verify(&self.language_corpus, &baseline)?;
        phase.emit_proof(run_id, self.state.state())?;
        log.record_pass("language_boundary", "boundary_phase_closed");

        // Phase 15: interface proof.
        let mut phase = PhaseWriter::new(run_dir, PHASE_INTERFACE);
        phase.write_json(INTERFACE_PROOF_ARTIFACT, &InterfaceProofArtifact::current())?;
        phase.emit_proof(run_id, self.state.state())?;
        log.record_pass("interface", "interface_phase_closed");

        // Phase 16: canonical signature sealed into the verdict.
        let signature = compute_canonical_signature(&self.paths.canonical_root())?;
        let mut phase = PhaseWriter::new(run_dir, PHASE_VERDICT);
        phase.write_json(FINAL_VERDICT_ARTIFACT, &VerdictArtifact::valid(signature.clone()))?;
        phase.emit_proof(run_id, self.state.state())?;
        log.record_pass("signature", "verdict_phase_closed");

        // The single deliberate decision of this pipeline.
        self.state.set_state(RunState::Advisory)?;
        log.record_pass("run_state", "resolved_advisory");

        // Enforcement over the full, sorted namespace enumeration.
        let artifacts = enumerate_json_artifacts(run_dir)?;
        allowlist.enforce(&artifacts, self.paths.root())?;
        log.record_pass("allowlist", "enforced");
        check_outcome_consistency(&artifacts, self.state.state())?;
        log.record_pass("outcome", "consistent");

        // Final aggregate proof: every artifact the namespace holds.
        let artifact_list: Vec<String> = artifacts
            .iter()
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
            .map(str::to_string)
            .collect();
        let artifact_count = artifact_list.len();
        let mut phase = PhaseWriter::new(run_dir, PHASE_AGGREGATE);
        phase.write_json(
            PROOF_ARTIFACT_NAME,
            &PhaseProof {
                artifact_list,
                run_id: run_id.to_string(),
                run_state: self.state.state(),
            },
        )?;

        let run_state = self.state.finish()?;
        log.record_pass("run_state", "terminal_check");

        Ok(RunReport {
            run_id: run_id.to_string(),
            run_state,
            signature,
            artifact_count,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
