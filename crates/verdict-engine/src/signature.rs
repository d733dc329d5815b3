//! Canonical-artifact signature: a tamper-evidence seal over the sorted
//! contents of every canonical artifact.
//!
//! The raw bytes of every `.json` file under the canonical directory are
//! collected, sorted lexicographically as byte sequences, concatenated,
//! and hashed.  Sorting by content makes the signature independent of both
//! file naming and filesystem enumeration order: relocating or renaming
//! canonical artifacts without changing their bytes leaves the seal
//! intact.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Verdict value asserted when the signature is computed.
pub const VERDICT_VALID: &str = "VALID";

// ---------------------------------------------------------------------------
// SignatureError
// ---------------------------------------------------------------------------

/// Failure while reading canonical artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    Io { path: String, message: String },
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "failed to read canonical artifact `{path}`: {message}")
            }
        }
    }
}

impl std::error::Error for SignatureError {}

impl SignatureError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "signature_io",
        }
    }
}

// ---------------------------------------------------------------------------
// Signature computation
// ---------------------------------------------------------------------------

/// Compute the canonical signature over every `.json` file under
/// `canonical_root`, recursively.  A missing directory contributes no
/// bytes; the signature of an empty canonical set is the hash of the
/// empty string.
pub fn compute_canonical_signature(canonical_root: &Path) -> Result<String, SignatureError> {
    let mut blobs: Vec<Vec<u8>> = Vec::new();
    collect_canonical_bytes(canonical_root, &mut blobs)?;
    blobs.sort();

    let mut hasher = Sha256::new();
    for blob in &blobs {
        hasher.update(blob);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn collect_canonical_bytes(dir: &Path, out: &mut Vec<Vec<u8>>) -> Result<(), SignatureError> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(dir).map_err(|err| SignatureError::Io {
        path: dir.display().to_string(),
        message: err.to_string(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| SignatureError::Io {
            path: dir.display().to_string(),
            message: err.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_canonical_bytes(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            let bytes = fs::read(&path).map_err(|err| SignatureError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
            out.push(bytes);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// VerdictArtifact
// ---------------------------------------------------------------------------

/// Final verdict artifact embedding the canonical signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictArtifact {
    pub signature: String,
    pub verdict: String,
}

impl VerdictArtifact {
    pub fn valid(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            verdict: VERDICT_VALID.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!("verdict_engine_{label}_{nanos}_{}", std::process::id()))
    }

    #[test]
    fn empty_canonical_set_hashes_empty_string() {
        let signature =
            compute_canonical_signature(Path::new("/nonexistent/canonical")).expect("compute");
        assert_eq!(
            signature,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn signature_is_independent_of_file_names() {
        let root_a = temp_dir("sig_names_a");
        let root_b = temp_dir("sig_names_b");
        fs::create_dir_all(&root_a).expect("mkdir");
        fs::create_dir_all(&root_b).expect("mkdir");

        fs::write(root_a.join("one.json"), b"{\"k\":1}").expect("write");
        fs::write(root_a.join("two.json"), b"{\"k\":2}").expect("write");
        // Same contents under swapped names.
        fs::write(root_b.join("two.json"), b"{\"k\":1}").expect("write");
        fs::write(root_b.join("one.json"), b"{\"k\":2}").expect("write");

        let sig_a = compute_canonical_signature(&root_a).expect("compute");
        let sig_b = compute_canonical_signature(&root_b).expect("compute");
        assert_eq!(sig_a, sig_b);

        fs::remove_dir_all(&root_a).expect("cleanup");
        fs::remove_dir_all(&root_b).expect("cleanup");
    }

    #[test]
    fn signature_sees_nested_directories_and_skips_non_json() {
        let root = temp_dir("sig_nested");
        fs::create_dir_all(root.join("nested")).expect("mkdir");
        fs::write(root.join("nested").join("deep.json"), b"{\"d\":true}").expect("write");
        fs::write(root.join("ignored.txt"), b"not json").expect("write");

        let with_extra = compute_canonical_signature(&root).expect("compute");
        fs::remove_file(root.join("ignored.txt")).expect("remove");
        let without_extra = compute_canonical_signature(&root).expect("compute");
        assert_eq!(with_extra, without_extra);

        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn signature_changes_with_content() {
        let root = temp_dir("sig_content");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("a.json"), b"{\"k\":1}").expect("write");
        let before = compute_canonical_signature(&root).expect("compute");
        fs::write(root.join("a.json"), b"{\"k\":2}").expect("write");
        let after = compute_canonical_signature(&root).expect("compute");
        assert_ne!(before, after);

        fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn verdict_artifact_asserts_valid() {
        let artifact = VerdictArtifact::valid("deadbeef");
        assert_eq!(artifact.verdict, VERDICT_VALID);
        assert_eq!(artifact.signature, "deadbeef");
    }
}
