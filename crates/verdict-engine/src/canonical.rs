//! Canonical artifact serialization and phase-scoped emission.
//!
//! Every artifact the pipeline writes goes through one discipline: UTF-8
//! JSON with lexicographically sorted object keys and no insignificant
//! whitespace.  Serialization is routed through [`serde_json::Value`]
//! (whose map type is a `BTreeMap`) so struct field order can never leak
//! into artifact bytes.
//!
//! Directory enumeration is collected and sorted before use; no output
//! depends on filesystem enumeration order.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::run_state::RunState;

/// Base name of the per-phase proof artifact.
pub const PROOF_ARTIFACT_NAME: &str = "proof.json";

// ---------------------------------------------------------------------------
// ArtifactWriteError
// ---------------------------------------------------------------------------

/// Failures while serializing or writing an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactWriteError {
    Io { path: String, message: String },
    Json { path: String, message: String },
}

impl fmt::Display for ArtifactWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "I/O error writing `{path}`: {message}"),
            Self::Json { path, message } => {
                write!(f, "serialization error for `{path}`: {message}")
            }
        }
    }
}

impl std::error::Error for ArtifactWriteError {}

impl ArtifactWriteError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "artifact_io",
            Self::Json { .. } => "artifact_json",
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical serialization
// ---------------------------------------------------------------------------

/// Canonical JSON bytes: sorted keys, compact separators, UTF-8.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, ArtifactWriteError> {
    let tree = serde_json::to_value(value).map_err(|err| ArtifactWriteError::Json {
        path: String::new(),
        message: err.to_string(),
    })?;
    serde_json::to_vec(&tree).map_err(|err| ArtifactWriteError::Json {
        path: String::new(),
        message: err.to_string(),
    })
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ArtifactWriteError> {
    let tmp_path = path.with_extension(format!("tmp-{}", std::process::id()));
    fs::write(&tmp_path, bytes).map_err(|err| ArtifactWriteError::Io {
        path: tmp_path.display().to_string(),
        message: err.to_string(),
    })?;
    fs::rename(&tmp_path, path).map_err(|err| ArtifactWriteError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

// ---------------------------------------------------------------------------
// PhaseProof
// ---------------------------------------------------------------------------

/// Record attesting which artifacts a phase produced, alongside the run id
/// and the run state current at emission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProof {
    pub artifact_list: Vec<String>,
    pub run_id: String,
    pub run_state: RunState,
}

// ---------------------------------------------------------------------------
// PhaseWriter
// ---------------------------------------------------------------------------

/// Writes canonical artifacts into one `phase_<n>` directory and tracks
/// their base names for the closing proof artifact.
#[derive(Debug)]
pub struct PhaseWriter {
    dir: PathBuf,
    written: Vec<String>,
}

impl PhaseWriter {
    pub fn new(run_dir: &Path, phase: u32) -> Self {
        Self {
            dir: run_dir.join(format!("phase_{phase}")),
            written: Vec::new(),
        }
    }

    /// Phase directory this writer owns.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Base names written so far, in emission order.
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Write one canonical JSON artifact into the phase directory.
    ///
    /// Creates the directory on first use (idempotent).
    pub fn write_json<T: Serialize>(
        &mut self,
        name: &str,
        value: &T,
    ) -> Result<PathBuf, ArtifactWriteError> {
        fs::create_dir_all(&self.dir).map_err(|err| ArtifactWriteError::Io {
            path: self.dir.display().to_string(),
            message: err.to_string(),
        })?;
        let path = self.dir.join(name);
        let bytes = canonical_json_bytes(value).map_err(|err| match err {
            ArtifactWriteError::Json { message, .. } => ArtifactWriteError::Json {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        write_atomic(&path, &bytes)?;
        self.written.push(name.to_string());
        Ok(path)
    }

    /// Close the phase: emit `proof.json` naming every artifact written in
    /// this phase plus the proof itself.
    pub fn emit_proof(
        &mut self,
        run_id: &str,
        run_state: RunState,
    ) -> Result<PathBuf, ArtifactWriteError> {
        let mut artifact_list = self.written.clone();
        artifact_list.push(PROOF_ARTIFACT_NAME.to_string());
        let proof = PhaseProof {
            artifact_list,
            run_id: run_id.to_string(),
            run_state,
        };
        self.write_json(PROOF_ARTIFACT_NAME, &proof)
    }
}

// ---------------------------------------------------------------------------
// Namespace enumeration
// ---------------------------------------------------------------------------

/// Every `.json` artifact under `dir`, recursively, sorted by path.
pub fn enumerate_json_artifacts(dir: &Path) -> Result<Vec<PathBuf>, ArtifactWriteError> {
    let mut found = Vec::new();
    collect_json_files(dir, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ArtifactWriteError> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(dir).map_err(|err| ArtifactWriteError::Io {
        path: dir.display().to_string(),
        message: err.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| ArtifactWriteError::Io {
            path: dir.display().to_string(),
            message: err.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("verdict_engine_{label}_{nanos}_{}", std::process::id()))
    }

    // -- Canonical serialization --

    #[derive(Serialize)]
    struct Unordered {
        zulu: u32,
        alpha: u32,
        mike: u32,
    }

    #[test]
    fn canonical_json_sorts_keys_regardless_of_field_order() {
        let bytes = canonical_json_bytes(&Unordered {
            zulu: 1,
            alpha: 2,
            mike: 3,
        })
        .expect("serialize");
        assert_eq!(
            String::from_utf8(bytes).expect("utf-8"),
            "{\"alpha\":2,\"mike\":3,\"zulu\":1}"
        );
    }

    #[test]
    fn canonical_json_is_byte_stable() {
        let a = canonical_json_bytes(&Unordered {
            zulu: 9,
            alpha: 9,
            mike: 9,
        })
        .expect("serialize");
        let b = canonical_json_bytes(&Unordered {
            zulu: 9,
            alpha: 9,
            mike: 9,
        })
        .expect("serialize");
        assert_eq!(a, b);
    }

    // -- Hashing --

    #[test]
    fn sha256_hex_is_lowercase_and_stable() {
        let digest = sha256_hex(b"snapshot bytes");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, digest.to_lowercase());
        assert_eq!(digest, sha256_hex(b"snapshot bytes"));
    }

    #[test]
    fn sha256_hex_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    // -- PhaseWriter --

    #[test]
    fn phase_writer_emits_artifact_then_proof() {
        let root = temp_dir("phase_writer");
        let mut phase = PhaseWriter::new(&root, 13);

        #[derive(Serialize)]
        struct Artifact {
            value: u32,
        }

        phase
            .write_json("uncertainty.decision.json", &Artifact { value: 7 })
            .expect("write artifact");
        phase.emit_proof("run-abc", RunState::Invalid).expect("emit proof");

        let proof_raw =
            fs::read_to_string(root.join("phase_13").join("proof.json")).expect("read proof");
        let proof: PhaseProof = serde_json::from_str(&proof_raw).expect("parse proof");
        assert_eq!(
            proof.artifact_list,
            vec!["uncertainty.decision.json".to_string(), "proof.json".to_string()]
        );
        assert_eq!(proof.run_id, "run-abc");
        assert_eq!(proof.run_state, RunState::Invalid);

        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn phase_proof_serializes_with_sorted_keys() {
        let proof = PhaseProof {
            artifact_list: vec!["a.json".to_string()],
            run_id: "r".to_string(),
            run_state: RunState::Advisory,
        };
        let bytes = canonical_json_bytes(&proof).expect("serialize");
        assert_eq!(
            String::from_utf8(bytes).expect("utf-8"),
            "{\"artifact_list\":[\"a.json\"],\"run_id\":\"r\",\"run_state\":\"ADVISORY\"}"
        );
    }

    // -- Enumeration --

    #[test]
    fn enumeration_is_sorted_and_filters_non_json() {
        let root = temp_dir("enumeration");
        fs::create_dir_all(root.join("phase_14")).expect("mkdir");
        fs::create_dir_all(root.join("phase_13")).expect("mkdir");
        fs::write(root.join("phase_14").join("b.json"), b"{}").expect("write");
        fs::write(root.join("phase_13").join("a.json"), b"{}").expect("write");
        fs::write(root.join("events.jsonl"), b"").expect("write");
        fs::write(root.join("notes.txt"), b"").expect("write");

        let found = enumerate_json_artifacts(&root).expect("enumerate");
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(&root).expect("prefix").display().to_string())
            .collect();
        assert_eq!(names, vec!["phase_13/a.json", "phase_14/b.json"]);

        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn enumeration_of_missing_dir_is_empty() {
        let found = enumerate_json_artifacts(Path::new("/nonexistent/verdict")).expect("enumerate");
        assert!(found.is_empty());
    }
}
