//! Artifact-only structured run log.
//!
//! The validator writes no free-form logs; its audit trail is a JSON
//! Lines file of versioned event envelopes with stable keys, flushed into
//! the run namespace.  Timestamps are caller-supplied so the event stream
//! stays deterministic under test.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Schema version stamped on every event.
pub const RUN_LOG_EVENT_SCHEMA_VERSION: &str = "verdict-engine.run-log-event.v1";
/// Base name of the log file inside the run namespace.  The `.jsonl`
/// suffix keeps the log out of the `.json` artifact enumeration.
pub const RUN_LOG_FILE_NAME: &str = "events.jsonl";

// ---------------------------------------------------------------------------
// RunLogError
// ---------------------------------------------------------------------------

/// Failure while flushing the run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunLogError {
    Io { path: String, message: String },
    Json { message: String },
}

impl fmt::Display for RunLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "I/O error writing run log `{path}`: {message}")
            }
            Self::Json { message } => write!(f, "run log serialization error: {message}"),
        }
    }
}

impl std::error::Error for RunLogError {}

impl RunLogError {
    /// Stable error code for structured logging.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "run_log_io",
            Self::Json { .. } => "run_log_json",
        }
    }
}

// ---------------------------------------------------------------------------
// RunLogEvent
// ---------------------------------------------------------------------------

/// One structured log event.  Every field is always present; `error_code`
/// is `null` for passing steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEvent {
    pub schema_version: String,
    pub run_id: String,
    pub sequence: u64,
    pub component: String,
    pub event: String,
    pub outcome: String,
    pub error_code: Option<String>,
    pub timestamp_unix_ms: u64,
}

// ---------------------------------------------------------------------------
// RunLog
// ---------------------------------------------------------------------------

/// Collects run events in sequence order and flushes them as JSON Lines.
#[derive(Debug, Clone)]
pub struct RunLog {
    run_id: String,
    timestamp_unix_ms: u64,
    events: Vec<RunLogEvent>,
}

impl RunLog {
    pub fn new(run_id: impl Into<String>, timestamp_unix_ms: u64) -> Self {
        Self {
            run_id: run_id.into(),
            timestamp_unix_ms,
            events: Vec::new(),
        }
    }

    /// Record a passing step.
    pub fn record_pass(&mut self, component: &str, event: &str) {
        self.record(component, event, "pass", None);
    }

    /// Record a failing step with its stable error code.
    pub fn record_fail(&mut self, component: &str, event: &str, error_code: &str) {
        self.record(component, event, "fail", Some(error_code));
    }

    fn record(&mut self, component: &str, event: &str, outcome: &str, error_code: Option<&str>) {
        let sequence = self.events.len() as u64;
        self.events.push(RunLogEvent {
            schema_version: RUN_LOG_EVENT_SCHEMA_VERSION.to_string(),
            run_id: self.run_id.clone(),
            sequence,
            component: component.to_string(),
            event: event.to_string(),
            outcome: outcome.to_string(),
            error_code: error_code.map(str::to_string),
            timestamp_unix_ms: self.timestamp_unix_ms,
        });
    }

    /// Events recorded so far, in sequence order.
    pub fn events(&self) -> &[RunLogEvent] {
        &self.events
    }

    /// Flush all events to `<run_dir>/events.jsonl`, one JSON object per
    /// line.  The whole file is rewritten; the log is the single writer
    /// for its namespace.
    pub fn flush(&self, run_dir: &Path) -> Result<PathBuf, RunLogError> {
        let path = run_dir.join(RUN_LOG_FILE_NAME);
        let mut buffer = String::new();
        for event in &self.events {
            let line = serde_json::to_string(event).map_err(|err| RunLogError::Json {
                message: err.to_string(),
            })?;
            buffer.push_str(&line);
            buffer.push('\n');
        }
        fs::write(&path, buffer.as_bytes()).map_err(|err| RunLogError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
