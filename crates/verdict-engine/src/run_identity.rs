//! Content-addressed run identity and namespace scaffolding.
//!
//! The run identifier is the lowercase hex SHA-256 of the input snapshot
//! bytes: identical snapshots always map to the same namespace.  Deriving
//! the identity also scaffolds the namespace (idempotently) and writes the
//! top-level marker asserting that the `runs/` tree is the sole source of
//! validity.

use std::fmt;
use std::fs;

use crate::canonical::sha256_hex;
use crate::paths::{RunPaths, SNAPSHOT_REL};

/// Content of the `runs/README.invalid` marker.
pub const VALIDITY_MARKER_TEXT: &str = "THIS DIRECTORY DEFINES VALIDITY.\n";

// ---------------------------------------------------------------------------
// SnapshotError
// ---------------------------------------------------------------------------

/// Failures while ingesting the snapshot or scaffolding the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The required input snapshot does not exist.
    Missing,
    /// Reading the snapshot or creating the namespace failed.
    Io { path: String, message: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "Input file {SNAPSHOT_REL} is missing"),
            Self::Io { path, message } => {
                write!(f, "I/O failure on `{path}`: {message}")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl SnapshotError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Missing => "snapshot_missing",
            Self::Io { .. } => "snapshot_io",
        }
    }
}

// ---------------------------------------------------------------------------
// RunIdentity
// ---------------------------------------------------------------------------

/// A derived run identity: the namespace key for all artifacts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIdentity {
    run_id: String,
}

impl RunIdentity {
    /// Lowercase hex SHA-256 of the snapshot bytes.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Derive the identity from raw snapshot bytes without touching the
    /// filesystem.  Useful for determinism checks.
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Self {
        Self {
            run_id: sha256_hex(bytes),
        }
    }

    /// Ingest the snapshot, derive the run id, and scaffold the namespace.
    ///
    /// Side effects: creates `runs/` and `runs/<run_id>/` (idempotent) and
    /// writes the validity marker.  The snapshot itself is read once and
    /// never mutated.
    pub fn establish(paths: &RunPaths) -> Result<Self, SnapshotError> {
        let snapshot_path = paths.snapshot();
        if !snapshot_path.is_file() {
            return Err(SnapshotError::Missing);
        }
        let bytes = fs::read(&snapshot_path).map_err(|err| SnapshotError::Io {
            path: snapshot_path.display().to_string(),
            message: err.to_string(),
        })?;
        let identity = Self::from_snapshot_bytes(&bytes);

        let run_dir = paths.run_dir(identity.run_id());
        fs::create_dir_all(&run_dir).map_err(|err| SnapshotError::Io {
            path: run_dir.display().to_string(),
            message: err.to_string(),
        })?;

        let marker = paths.validity_marker();
        fs::write(&marker, VALIDITY_MARKER_TEXT).map_err(|err| SnapshotError::Io {
            path: marker.display().to_string(),
            message: err.to_string(),
        })?;

        Ok(identity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
