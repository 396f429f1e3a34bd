//! Structured error type shared by validation, handler resolution, and user
//! handlers.
//!
//! `HookError` is the only error vocabulary that crosses the pipeline
//! boundary. It always carries a human-readable message and optionally a
//! short machine-readable code, an `extensions` map (the GraphQL-style
//! carrier Hasura forwards to clients), opaque diagnostic `details`, and a
//! debug trace that is logged but never returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::VALIDATION_ERROR;

/// Key under which the machine-readable code is stored inside `extensions`.
const CODE_KEY: &str = "code";

// ---------------------------------------------------------------------------
// HookError
// ---------------------------------------------------------------------------

/// Structured, catchable error returned by validators, resolvers, and handlers.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    extensions: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    details: Option<Value>,
    #[serde(skip)]
    trace: Option<String>,
}

impl HookError {
    /// Creates a code-less error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            extensions: None,
            details: None,
            trace: None,
        }
    }

    /// Creates a payload validation error tagged with
    /// `extensions.code = "validation_error"`.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        let mut extensions = Map::new();
        extensions.insert(CODE_KEY.to_string(), Value::from(VALIDATION_ERROR));
        Self::new(message).with_extensions(extensions)
    }

    /// Sets the top-level code. When no extensions map has been attached yet,
    /// the code is also recorded as `extensions.code`.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        if self.extensions.is_none() {
            let mut extensions = Map::new();
            extensions.insert(CODE_KEY.to_string(), Value::from(code.clone()));
            self.extensions = Some(extensions);
        }
        self.code = Some(code);
        self
    }

    /// Replaces the extensions map.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Map<String, Value>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches a debug trace (cause chain, backtrace). Only ever logged, and
    /// only when debug mode is on.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Explicit top-level code, if one was set.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// `extensions.code`, if present and a string.
    #[must_use]
    pub fn extension_code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get(CODE_KEY))
            .and_then(Value::as_str)
    }

    #[must_use]
    pub fn extensions(&self) -> Option<&Map<String, Value>> {
        self.extensions.as_ref()
    }

    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    /// Returns true for errors produced by the payload validators.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.extension_code() == Some(VALIDATION_ERROR)
    }

    /// Renders the response body returned to the caller on the error path.
    #[must_use]
    pub fn to_body(&self, format: ErrorBodyFormat) -> Value {
        let mut body = Map::new();
        if let Some(code) = &self.code {
            body.insert("code".to_string(), Value::from(code.clone()));
        }
        body.insert("message".to_string(), Value::from(self.message.clone()));
        if format == ErrorBodyFormat::WithExtensions {
            if let Some(extensions) = &self.extensions {
                body.insert("extensions".to_string(), Value::Object(extensions.clone()));
            }
        }
        Value::Object(body)
    }
}

impl From<anyhow::Error> for HookError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(hook_err) = err.downcast_ref::<HookError>() {
            return hook_err.clone();
        }
        HookError::new(err.to_string()).with_trace(format!("{err:?}"))
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        HookError::new(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// ErrorBodyFormat
// ---------------------------------------------------------------------------

/// Shape of the JSON body returned on the error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorBodyFormat {
    /// `{ "code"?, "message" }` with `code` taken from the explicit top-level
    /// code only. Validation and resolution errors render as `{ "message" }`.
    #[default]
    Flat,
    /// `Flat` plus `"extensions"` when the error carries them.
    WithExtensions,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
