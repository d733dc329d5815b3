//! Primary/secondary language classification with a designed sensitivity
//! check.
//!
//! The classification is derived from a flat multiset of language tags.
//! A tie for maximum frequency is rejected outright: "primary language"
//! must be unambiguous.  After classifying, the corpus is perturbed with
//! one occurrence of a new tag and re-classified; an unchanged result
//! proves the classifier ignored its input and is fatal.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Boundary rule embedded in the decision artifact.
pub const BOUNDARY_RULES: &str = "No semantic references to secondary languages";
/// Tag injected by the perturbation check.
pub const PERTURBATION_TAG: &str = "js";

/// Default corpus: the homogeneous tag multiset the pipeline classifies.
pub fn fixture_corpus() -> Vec<String> {
    vec!["py".to_string(); 10]
}

// ---------------------------------------------------------------------------
// BoundaryError
// ---------------------------------------------------------------------------

/// Violations raised by the classifier.  All fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// The corpus holds no tags at all.
    EmptyCorpus,
    /// More than one tag is tied for maximum frequency.
    Tie,
    /// The perturbed corpus classified identically to the original.
    Unchanged,
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCorpus => f.write_str("Empty language corpus"),
            Self::Tie => f.write_str("Tie in language count"),
            Self::Unchanged => f.write_str("Boundaries unchanged"),
        }
    }
}

impl std::error::Error for BoundaryError {}

impl BoundaryError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCorpus => "language_corpus_empty",
            Self::Tie => "language_count_tie",
            Self::Unchanged => "language_boundaries_unchanged",
        }
    }
}

// ---------------------------------------------------------------------------
// LanguageBoundary
// ---------------------------------------------------------------------------

/// A resolved classification: one strict-majority primary tag and the
/// remaining tags in ascending lexical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageBoundary {
    pub primary: String,
    pub secondary: Vec<String>,
}

/// Decision artifact emitted for the language-boundary phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageBoundaryArtifact {
    pub boundary_rules: String,
    pub primary_language: String,
    pub secondary_languages: Vec<String>,
}

impl LanguageBoundaryArtifact {
    pub fn from_boundary(boundary: &LanguageBoundary) -> Self {
        Self {
            boundary_rules: BOUNDARY_RULES.to_string(),
            primary_language: boundary.primary.clone(),
            secondary_languages: boundary.secondary.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a tag multiset into primary and secondary languages.
///
/// The primary tag must hold a strictly maximal count; any tie for the
/// maximum is rejected.  Counting runs over a `BTreeMap`, so the result is
/// independent of input order.
pub fn classify(tags: &[String]) -> Result<LanguageBoundary, BoundaryError> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in tags {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }
    let Some(&max_count) = counts.values().max() else {
        return Err(BoundaryError::EmptyCorpus);
    };

    let leaders: Vec<&str> = counts
        .iter()
        .filter(|(_, &count)| count == max_count)
        .map(|(&tag, _)| tag)
        .collect();
    if leaders.len() > 1 {
        return Err(BoundaryError::Tie);
    }

    let primary = leaders[0].to_string();
    let secondary = counts
        .keys()
        .filter(|&&tag| tag != primary)
        .map(|&tag| tag.to_string())
        .collect();

    Ok(LanguageBoundary { primary, secondary })
}

/// Sensitivity check: inject one occurrence of [`PERTURBATION_TAG`] and
/// re-classify.  A result identical in both primary and secondary set is
/// fatal.  Returns the perturbed classification for inspection.
pub fn perturb_and_verify(
    tags: &[String],
    baseline: &LanguageBoundary,
) -> Result<LanguageBoundary, BoundaryError> {
    let mut perturbed = tags.to_vec();
    perturbed.push(PERTURBATION_TAG.to_string());
    let reclassified = classify(&perturbed)?;
    if reclassified.primary == baseline.primary && reclassified.secondary == baseline.secondary {
        return Err(BoundaryError::Unchanged);
    }
    Ok(reclassified)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
