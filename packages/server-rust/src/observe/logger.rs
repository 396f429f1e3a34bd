//! Logger collaborator used by the dispatch pipeline.
//!
//! The pipeline never reaches for a global logger: a `HookLogger` is injected
//! through `HookOptions` and shared by every request. Level-specific methods
//! are required; the generic `log` entry point dispatches to them by default
//! and may be overridden by loggers that prefer a single sink.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// LogLevel / LogRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured log record: level, human message, and flattened fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            level,
            message: message.into(),
            fields,
        }
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Renders the record as a single JSON line.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"message\":{:?}}}", self.message))
    }
}

// ---------------------------------------------------------------------------
// HookLogger trait
// ---------------------------------------------------------------------------

/// Leveled structured logger accepted by the pipeline.
pub trait HookLogger: Send + Sync {
    fn debug(&self, record: &LogRecord);
    fn info(&self, record: &LogRecord);
    fn warn(&self, record: &LogRecord);
    fn error(&self, record: &LogRecord);

    /// Generic entry point. Dispatches to the level-specific method unless
    /// overridden.
    fn log(&self, record: &LogRecord) {
        match record.level {
            LogLevel::Debug => self.debug(record),
            LogLevel::Info => self.info(record),
            LogLevel::Warn => self.warn(record),
            LogLevel::Error => self.error(record),
        }
    }
}

/// Emits a record through the logger's generic entry point.
pub fn print_log(logger: &dyn HookLogger, record: &LogRecord) {
    logger.log(record);
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Default logger: forwards records to `tracing` under the `hasura_hooks`
/// target, with the serialized record attached as the `record` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl HookLogger for TracingLogger {
    fn debug(&self, record: &LogRecord) {
        tracing::debug!(target: "hasura_hooks", record = %record.to_json(), "{}", record.message);
    }

    fn info(&self, record: &LogRecord) {
        tracing::info!(target: "hasura_hooks", record = %record.to_json(), "{}", record.message);
    }

    fn warn(&self, record: &LogRecord) {
        tracing::warn!(target: "hasura_hooks", record = %record.to_json(), "{}", record.message);
    }

    fn error(&self, record: &LogRecord) {
        tracing::error!(target: "hasura_hooks", record = %record.to_json(), "{}", record.message);
    }
}

/// Prints one JSON line per record: stdout for debug/info, stderr for
/// warn/error. Works without any subscriber installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutLogger;

impl HookLogger for StdoutLogger {
    fn debug(&self, record: &LogRecord) {
        println!("{}", record.to_json());
    }

    fn info(&self, record: &LogRecord) {
        println!("{}", record.to_json());
    }

    fn warn(&self, record: &LogRecord) {
        eprintln!("{}", record.to_json());
    }

    fn error(&self, record: &LogRecord) {
        eprintln!("{}", record.to_json());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
