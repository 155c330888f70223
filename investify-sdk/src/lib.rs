use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix written in front of every serialized event on stderr
pub const EVENT_PREFIX: &str = "__INVESTIFY_EVENT__:";

/// Structured events emitted while an analysis runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisLog {
    /// Orchestration started
    AnalysisStarted {
        request_id: String,
        content_length: usize,
        steps: Vec<String>,
        timestamp: DateTime<Utc>,
    },
    /// A step was attempted
    StepStarted {
        request_id: String,
        step: String,
    },
    /// A step finished and produced a usable result
    StepCompleted {
        request_id: String,
        step: String,
        elapsed_ms: u64,
    },
    /// A step raised an error (invalid input, upstream failure, bad output)
    StepFailed {
        request_id: String,
        step: String,
        error: String,
        elapsed_ms: u64,
    },
    /// A step was enabled but not attempted
    StepSkipped {
        request_id: String,
        step: String,
        reason: String,
    },
    /// Orchestration finished
    AnalysisCompleted {
        request_id: String,
        agents_run: Vec<String>,
        error_count: usize,
        execution_time_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl AnalysisLog {
    /// Emit this event to stderr as a single prefixed JSON line
    pub fn emit(&self) {
        if let Some(line) = self.to_line() {
            use std::io::Write;
            eprintln!("{}", line);
            // Force flush stderr in async/concurrent contexts
            let _ = std::io::stderr().flush();
        }
    }

    /// Render the prefixed line written by [`AnalysisLog::emit`]
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self)
            .ok()
            .map(|json| format!("{}{}", EVENT_PREFIX, json))
    }

    /// Parse a line produced by [`AnalysisLog::emit`]; other lines yield `None`
    pub fn from_line(line: &str) -> Option<Self> {
        line.trim()
            .strip_prefix(EVENT_PREFIX)
            .and_then(|json| serde_json::from_str(json).ok())
    }

    /// Request this event belongs to
    pub fn request_id(&self) -> &str {
        match self {
            AnalysisLog::AnalysisStarted { request_id, .. }
            | AnalysisLog::StepStarted { request_id, .. }
            | AnalysisLog::StepCompleted { request_id, .. }
            | AnalysisLog::StepFailed { request_id, .. }
            | AnalysisLog::StepSkipped { request_id, .. }
            | AnalysisLog::AnalysisCompleted { request_id, .. } => request_id,
        }
    }
}

// ============================================================================
// Console Logging Macros (for the CLI)
// ============================================================================
// Colored, human-readable output on stdout/stderr, complementing the
// structured AnalysisLog events.
// ============================================================================

/// Logs an informational message.
///
/// # Example
/// ```
/// use investify_sdk::log_info;
/// log_info!("Reading investment description...");
/// ```
///
/// Outputs:
/// ```text
/// ℹ Reading investment description...
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        eprintln!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        eprintln!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use investify_sdk::log_warning;
/// log_warning!("Scoring agent skipped");
/// ```
///
/// Outputs:
/// ```text
/// ⚠ Warning: Scoring agent skipped
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        eprintln!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        eprintln!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
///
/// # Example
/// ```
/// use investify_sdk::log_file_saved;
/// log_file_saved!("./analysis.json");
/// ```
///
/// Outputs:
/// ```text
/// ✓ Saved: ./analysis.json
/// ```
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        eprintln!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}

/// Logs a one-line run summary.
///
/// # Example
/// ```
/// use investify_sdk::log_summary;
/// log_summary!(4, 1, 5321);
/// ```
///
/// Outputs:
/// ```text
/// Total: 4 agents run, 1 errors, 5.3s
/// ```
#[macro_export]
macro_rules! log_summary {
    ($agents_run:expr, $error_count:expr, $duration_ms:expr) => {
        eprintln!(
            "\x1b[1mTotal: {} agents run, {} errors, {:.1}s\x1b[0m",
            $agents_run,
            $error_count,
            $duration_ms as f64 / 1000.0
        );
    };
}
