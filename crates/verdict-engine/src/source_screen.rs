//! Heuristic source-text screen for candidate policy scripts.
//!
//! Four independent boolean predicates over raw source text, consumed by
//! policy tooling outside the validation pipeline (the pipeline itself
//! never calls them).  Matching is plain substring containment, not
//! tokenized analysis; the pattern sets and their false-positive/negative
//! profile are part of the contract with downstream consumers and must
//! not be "improved".

/// Patterns indicating non-deterministic time, identity, randomness, or
/// environment access.
pub const ENTROPY_PATTERNS: [&str; 10] = [
    "import time",
    "from time import",
    "import datetime",
    "from datetime import",
    "import uuid",
    "from uuid import",
    "import random",
    "from random import",
    "os.environ",
    "os.getenv",
];

/// Patterns indicating concurrency primitives.
pub const CONCURRENCY_PATTERNS: [&str; 7] = [
    "import threading",
    "from threading import",
    "import asyncio",
    "from asyncio import",
    "import multiprocessing",
    "from multiprocessing import",
    "from concurrent.futures import",
];

/// Non-deterministic time/identity/randomness/environment access.
pub fn has_forbidden_entropy(source: &str) -> bool {
    ENTROPY_PATTERNS.iter().any(|pattern| source.contains(pattern))
}

/// Concurrency primitives.
pub fn has_concurrency_primitives(source: &str) -> bool {
    CONCURRENCY_PATTERNS
        .iter()
        .any(|pattern| source.contains(pattern))
}

/// Iteration over unordered containers without an explicit sort.
pub fn has_unordered_iteration(source: &str) -> bool {
    source.contains("for ")
        && (source.contains("dict(") || source.contains("set("))
        && !source.contains("sorted(")
}

/// Non-canonical serialization: unsorted-key JSON writes or raw unmanaged
/// file writes.
pub fn has_non_canonical_serialization(source: &str) -> bool {
    if source.contains("json.dump") && !source.contains("sort_keys") {
        return true;
    }
    source.contains(".write(") || (source.contains("open(") && source.contains("'w'"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
