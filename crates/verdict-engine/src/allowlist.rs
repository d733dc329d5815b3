//! Decision-artifact allowlist: loading and enforcement.
//!
//! Every artifact whose base name ends in the restricted `.decision.json`
//! suffix must be pre-declared in the allowlist, and no allowlisted name
//! may exist anywhere outside the `runs/` tree.  A namespace that produced
//! no artifacts at all is itself a violation: a run that decided nothing
//! proved nothing.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::paths::RUNS_REL;

/// Suffix marking the restricted decision-artifact category.
pub const DECISION_SUFFIX: &str = ".decision.json";

// ---------------------------------------------------------------------------
// AllowlistError
// ---------------------------------------------------------------------------

/// Violations of the allowlist contract.  All fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowlistError {
    /// The allowlist file does not exist.
    MissingFile,
    /// The allowlist is unreadable, malformed, or not an array of strings.
    Invalid,
    /// A decision artifact in the namespace is not pre-declared.
    Undeclared { name: String },
    /// An allowlisted name exists outside the `runs/` tree.
    OutsideNamespace { name: String },
    /// The namespace holds no artifacts at all.
    NoArtifacts,
    /// Scanning the working tree failed.
    ScanIo { path: String, message: String },
}

impl fmt::Display for AllowlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile => f.write_str("Allowlist file missing"),
            Self::Invalid => f.write_str("Allowlist invalid"),
            Self::Undeclared { name } => {
                write!(f, "Decision artifact {name} not in allowlist")
            }
            Self::OutsideNamespace { name } => {
                write!(f, "Decision artifact {name} exists outside runs/")
            }
            Self::NoArtifacts => f.write_str("Zero decision artifacts exist"),
            Self::ScanIo { path, message } => {
                write!(f, "failed to scan `{path}`: {message}")
            }
        }
    }
}

impl std::error::Error for AllowlistError {}

impl AllowlistError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFile => "allowlist_missing",
            Self::Invalid => "allowlist_invalid",
            Self::Undeclared { .. } => "decision_artifact_undeclared",
            Self::OutsideNamespace { .. } => "decision_artifact_outside_namespace",
            Self::NoArtifacts => "decision_artifacts_empty",
            Self::ScanIo { .. } => "allowlist_scan_io",
        }
    }
}

// ---------------------------------------------------------------------------
// Allowlist
// ---------------------------------------------------------------------------

/// The exhaustive set of permitted decision-artifact base names, loaded
/// once and immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    names: BTreeSet<String>,
}

impl Allowlist {
    /// Load the allowlist from `path`.  The file must parse as a JSON
    /// array of strings.
    pub fn load(path: &Path) -> Result<Self, AllowlistError> {
        if !path.is_file() {
            return Err(AllowlistError::MissingFile);
        }
        let raw = fs::read_to_string(path).map_err(|_| AllowlistError::Invalid)?;
        Self::parse(&raw)
    }

    /// Parse an allowlist document from raw JSON text.
    pub fn parse(raw: &str) -> Result<Self, AllowlistError> {
        let document: Value = serde_json::from_str(raw).map_err(|_| AllowlistError::Invalid)?;
        let Value::Array(entries) = document else {
            return Err(AllowlistError::Invalid);
        };
        let mut names = BTreeSet::new();
        for entry in &entries {
            let Some(name) = entry.as_str() else {
                return Err(AllowlistError::Invalid);
            };
            names.insert(name.to_string());
        }
        Ok(Self { names })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Enforce the allowlist contract over the enumerated namespace
    /// artifacts and the working tree around them.
    ///
    /// Check order: undeclared decision artifacts first, then allowlisted
    /// names outside `runs/`, then namespace emptiness.
    pub fn enforce(
        &self,
        namespace_artifacts: &[PathBuf],
        workspace_root: &Path,
    ) -> Result<(), AllowlistError> {
        for path in namespace_artifacts {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.ends_with(DECISION_SUFFIX) && !self.contains(name) {
                return Err(AllowlistError::Undeclared {
                    name: name.to_string(),
                });
            }
        }

        self.scan_outside_namespace(workspace_root)?;

        if namespace_artifacts.is_empty() {
            return Err(AllowlistError::NoArtifacts);
        }
        Ok(())
    }

    /// Walk the working tree, skipping the `runs/` namespace, and reject
    /// any file whose name is allowlisted.  Entries are collected and
    /// sorted so the first finding is deterministic.
    fn scan_outside_namespace(&self, root: &Path) -> Result<(), AllowlistError> {
        let mut files = Vec::new();
        collect_outside_files(root, &mut files)?;
        files.sort();
        for path in &files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if self.contains(name) {
                return Err(AllowlistError::OutsideNamespace {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn collect_outside_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), AllowlistError> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(dir).map_err(|err| AllowlistError::ScanIo {
        path: dir.display().to_string(),
        message: err.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| AllowlistError::ScanIo {
            path: dir.display().to_string(),
            message: err.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            // The runs/ tree is namespace-scoped; decision artifacts are
            // expected there and only there.
            if path.file_name().is_some_and(|name| name == RUNS_REL) {
                continue;
            }
            collect_outside_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
