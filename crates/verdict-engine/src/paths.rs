//! Filesystem contract for a validation run, resolved from a working root.
//!
//! All inputs and outputs live at fixed paths relative to one root
//! directory; nothing in the crate touches a path it did not derive from
//! a [`RunPaths`] value.

use std::path::{Path, PathBuf};

/// Required input snapshot, relative to the working root.
pub const SNAPSHOT_REL: &str = "input/snapshot.bin";
/// Decision-artifact allowlist, relative to the working root.
pub const ALLOWLIST_REL: &str = "schemas/decision_allowlist.json";
/// Claims document, relative to the working root.
pub const CLAIMS_REL: &str = "rules/claims.json";
/// Root of all run namespaces.
pub const RUNS_REL: &str = "runs";
/// Marker asserting that the `runs/` tree is the sole source of validity.
pub const VALIDITY_MARKER_REL: &str = "runs/README.invalid";
/// Read-only canonical artifacts aggregated into the run signature.
pub const CANONICAL_REL: &str = "runs/canonical";

/// Resolves the fixed filesystem contract against a working root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    root: PathBuf,
}

impl RunPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `input/snapshot.bin`: required input; absence is fatal.
    pub fn snapshot(&self) -> PathBuf {
        self.root.join(SNAPSHOT_REL)
    }

    /// `schemas/decision_allowlist.json`: required; a JSON array of strings.
    pub fn allowlist(&self) -> PathBuf {
        self.root.join(ALLOWLIST_REL)
    }

    /// `rules/claims.json`: required; a JSON array of claim records.
    pub fn claims(&self) -> PathBuf {
        self.root.join(CLAIMS_REL)
    }

    /// `runs/`: root of every run namespace.
    pub fn runs_root(&self) -> PathBuf {
        self.root.join(RUNS_REL)
    }

    /// `runs/README.invalid`: namespace validity marker.
    pub fn validity_marker(&self) -> PathBuf {
        self.root.join(VALIDITY_MARKER_REL)
    }

    /// `runs/canonical/`: read-only input to the signature computer.
    pub fn canonical_root(&self) -> PathBuf {
        self.root.join(CANONICAL_REL)
    }

    /// `runs/<run_id>/`: the namespace owned by the current run.
    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.runs_root().join(run_id)
    }

    /// `runs/<run_id>/phase_<n>/`: phase-scoped artifact directory.
    pub fn phase_dir(&self, run_id: &str, phase: u32) -> PathBuf {
        self.run_dir(run_id).join(format!("phase_{phase}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_relative_to_root() {
        let paths = RunPaths::new("/work");
        assert_eq!(paths.snapshot(), PathBuf::from("/work/input/snapshot.bin"));
        assert_eq!(
            paths.allowlist(),
            PathBuf::from("/work/schemas/decision_allowlist.json")
        );
        assert_eq!(paths.claims(), PathBuf::from("/work/rules/claims.json"));
        assert_eq!(paths.runs_root(), PathBuf::from("/work/runs"));
        assert_eq!(
            paths.validity_marker(),
            PathBuf::from("/work/runs/README.invalid")
        );
        assert_eq!(paths.canonical_root(), PathBuf::from("/work/runs/canonical"));
    }

    #[test]
    fn run_namespace_paths_embed_run_id() {
        let paths = RunPaths::new("/work");
        assert_eq!(paths.run_dir("abc123"), PathBuf::from("/work/runs/abc123"));
        assert_eq!(
            paths.phase_dir("abc123", 13),
            PathBuf::from("/work/runs/abc123/phase_13")
        );
    }
}
