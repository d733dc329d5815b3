//! Claims document: loading, strict structural validation, the uncertainty
//! rewrite, and the designed mutation-sensitivity probe.
//!
//! A claim is either `known` (evidence present, possibly empty) or
//! `unknown` (no evidence key at all).  Validation is strict and ordered:
//! record shape first, then status, then the evidence/status pairing; the
//! first violation wins.  No silent normalization.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix applied to every unknown claim before the uncertainty artifact
/// is emitted.
pub const UNCERTAINTY_PREFIX: &str = "It is uncertain whether ";
/// Evidence marker attached by the mutation-sensitivity probe.
pub const MUTATION_EVIDENCE_MARKER: &str = "mutation.evidence";

// ---------------------------------------------------------------------------
// ClaimStatus / Claim
// ---------------------------------------------------------------------------

/// Epistemic status of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Known,
    Unknown,
}

impl ClaimStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Known => "known",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One claim record.  The wire field for the claim text is `claim`; an
/// `unknown` claim serializes without any `evidence` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "claim")]
    pub text: String,
    pub status: ClaimStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// ClaimsError
// ---------------------------------------------------------------------------

/// Violations of the claims-document contract.  All fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    /// The document could not be read or is not valid JSON.
    Invalid,
    /// The document parsed but is not a JSON array.
    NotAList,
    /// A record is not an object carrying `claim` and `status`.
    InvalidClaim,
    /// A record's status is not `known` or `unknown`.
    InvalidStatus,
    /// A `known` claim is missing its evidence sequence.
    KnownMissingEvidence,
    /// An `unknown` claim carries an evidence key.
    UnknownHasEvidence,
    /// The mutation probe left the unknown count unchanged.
    UnknownCountUnchanged,
}

impl fmt::Display for ClaimsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("Claims invalid"),
            Self::NotAList => f.write_str("Claims not a list"),
            Self::InvalidClaim => f.write_str("Invalid claim"),
            Self::InvalidStatus => f.write_str("Invalid status"),
            Self::KnownMissingEvidence => f.write_str("Known missing evidence"),
            Self::UnknownHasEvidence => f.write_str("Unknown has evidence"),
            Self::UnknownCountUnchanged => f.write_str("Unknown count unchanged"),
        }
    }
}

impl std::error::Error for ClaimsError {}

impl ClaimsError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid => "claims_invalid",
            Self::NotAList => "claims_not_a_list",
            Self::InvalidClaim => "claim_invalid",
            Self::InvalidStatus => "claim_status_invalid",
            Self::KnownMissingEvidence => "claim_known_missing_evidence",
            Self::UnknownHasEvidence => "claim_unknown_has_evidence",
            Self::UnknownCountUnchanged => "claims_unknown_count_unchanged",
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

/// Load and validate the claims document at `path`.
pub fn load_claims(path: &Path) -> Result<Vec<Claim>, ClaimsError> {
    let raw = fs::read_to_string(path).map_err(|_| ClaimsError::Invalid)?;
    parse_claims(&raw)
}

/// Parse and validate a claims document from raw JSON text.
///
/// Validation order per record: object shape with `claim` and `status`,
/// then the status value, then the evidence/status pairing.
pub fn parse_claims(raw: &str) -> Result<Vec<Claim>, ClaimsError> {
    let document: Value = serde_json::from_str(raw).map_err(|_| ClaimsError::Invalid)?;
    let Value::Array(records) = document else {
        return Err(ClaimsError::NotAList);
    };
    records.iter().map(validate_record).collect()
}

fn validate_record(record: &Value) -> Result<Claim, ClaimsError> {
    let Some(fields) = record.as_object() else {
        return Err(ClaimsError::InvalidClaim);
    };
    let Some(text) = fields.get("claim").and_then(Value::as_str) else {
        return Err(ClaimsError::InvalidClaim);
    };
    if !fields.contains_key("status") {
        return Err(ClaimsError::InvalidClaim);
    }

    let status = match fields.get("status").and_then(Value::as_str) {
        Some("known") => ClaimStatus::Known,
        Some("unknown") => ClaimStatus::Unknown,
        _ => return Err(ClaimsError::InvalidStatus),
    };

    let evidence = match (status, fields.get("evidence")) {
        (ClaimStatus::Known, Some(Value::Array(items))) => {
            let mut evidence = Vec::with_capacity(items.len());
            for item in items {
                let Some(entry) = item.as_str() else {
                    return Err(ClaimsError::KnownMissingEvidence);
                };
                evidence.push(entry.to_string());
            }
            Some(evidence)
        }
        (ClaimStatus::Known, _) => return Err(ClaimsError::KnownMissingEvidence),
        (ClaimStatus::Unknown, Some(_)) => return Err(ClaimsError::UnknownHasEvidence),
        (ClaimStatus::Unknown, None) => None,
    };

    Ok(Claim {
        text: text.to_string(),
        status,
        evidence,
    })
}

// ---------------------------------------------------------------------------
// Transformation and mutation probe
// ---------------------------------------------------------------------------

/// Number of `unknown` claims.
pub fn unknown_count(claims: &[Claim]) -> usize {
    claims
        .iter()
        .filter(|claim| claim.status == ClaimStatus::Unknown)
        .count()
}

/// Rewrite every `unknown` claim's text into its uncertainty form.
///
/// Must run before the uncertainty artifact is emitted so the artifact
/// reflects transformed text.
pub fn rewrite_uncertain(claims: &mut [Claim]) {
    for claim in claims.iter_mut() {
        if claim.status == ClaimStatus::Unknown {
            claim.text = format!("{UNCERTAINTY_PREFIX}{}", claim.text.to_lowercase());
        }
    }
}

/// Designed sentinel proving claim mutation is observable.
///
/// Promotes the second claim (index 1), when present and `unknown`, to
/// `known` with the fixed evidence marker, then requires the unknown count
/// to strictly decrease.  Fixtures that never exercise the promotion fail
/// the comparison literally; that is a precondition on the fixture, not a
/// recoverable state.
pub fn apply_mutation_probe(claims: &mut [Claim]) -> Result<(), ClaimsError> {
    let original_unknown = unknown_count(claims);
    if let Some(second) = claims.get_mut(1) {
        if second.status == ClaimStatus::Unknown {
            second.status = ClaimStatus::Known;
            second.evidence = Some(vec![MUTATION_EVIDENCE_MARKER.to_string()]);
        }
    }
    if unknown_count(claims) >= original_unknown {
        return Err(ClaimsError::UnknownCountUnchanged);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
