//! Per-pipeline options: debug switches, logger, static context, error body
//! format, and status code overrides.

use std::fmt;
use std::sync::Arc;

use hasura_hooks_core::ErrorBodyFormat;
use http::{Extensions, StatusCode};

use super::kind::StatusPair;
use crate::observe::{HookLogger, TracingLogger};

/// HTTP status codes used for success and failure responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCodes {
    pub success: StatusCode,
    pub error: StatusCode,
}

impl StatusCodes {
    #[must_use]
    pub fn new(success: StatusCode, error: StatusCode) -> Self {
        Self { success, error }
    }

    /// Converts a raw `(success, error)` pair. Out-of-range codes fall back to
    /// 200 and 400 respectively.
    #[must_use]
    pub fn from_pair((success, error): StatusPair) -> Self {
        Self {
            success: StatusCode::from_u16(success).unwrap_or(StatusCode::OK),
            error: StatusCode::from_u16(error).unwrap_or(StatusCode::BAD_REQUEST),
        }
    }
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self::new(StatusCode::OK, StatusCode::BAD_REQUEST)
    }
}

/// Options shared by every request served by one pipeline.
///
/// `context` holds values handlers read back through
/// `ExecutionContext::extension`. When `status` is `None` the hook kind's
/// defaults apply.
#[derive(Clone)]
pub struct HookOptions {
    /// Adds error traces to log records and echoes response data.
    pub debug: bool,
    /// Echo the raw request body into log records.
    pub log_request_body: bool,
    /// Echo handler results into success log records.
    pub log_response_data: bool,
    pub logger: Arc<dyn HookLogger>,
    pub context: Arc<Extensions>,
    pub error_format: ErrorBodyFormat,
    pub status: Option<StatusCodes>,
}

impl HookOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_request_body_logging(mut self, enabled: bool) -> Self {
        self.log_request_body = enabled;
        self
    }

    #[must_use]
    pub fn with_response_data_logging(mut self, enabled: bool) -> Self {
        self.log_response_data = enabled;
        self
    }

    #[must_use]
    pub fn with_logger<L: HookLogger + 'static>(mut self, logger: L) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Adds a static value visible to every handler invocation. A later value
    /// of the same type replaces the earlier one.
    #[must_use]
    pub fn with_context<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        Arc::make_mut(&mut self.context).insert(value);
        self
    }

    #[must_use]
    pub fn with_error_format(mut self, format: ErrorBodyFormat) -> Self {
        self.error_format = format;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCodes) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether handler results are echoed into success log records.
    #[must_use]
    pub fn echoes_response(&self) -> bool {
        self.debug || self.log_response_data
    }
}

impl Default for HookOptions {
    fn default() -> Self {
        Self {
            debug: false,
            log_request_body: false,
            log_response_data: false,
            logger: Arc::new(TracingLogger),
            context: Arc::new(Extensions::new()),
            error_format: ErrorBodyFormat::default(),
            status: None,
        }
    }
}

impl fmt::Debug for HookOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookOptions")
            .field("debug", &self.debug)
            .field("log_request_body", &self.log_request_body)
            .field("log_response_data", &self.log_response_data)
            .field("context", &self.context)
            .field("error_format", &self.error_format)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_quiet() {
        let options = HookOptions::default();
        assert!(!options.debug);
        assert!(!options.echoes_response());
        assert_eq!(options.error_format, ErrorBodyFormat::Flat);
        assert!(options.status.is_none());
    }

    #[test]
    fn debug_implies_response_echo() {
        assert!(HookOptions::new().with_debug(true).echoes_response());
        assert!(HookOptions::new()
            .with_response_data_logging(true)
            .echoes_response());
    }

    #[test]
    fn context_values_do_not_leak_into_clones_taken_earlier() {
        let base = HookOptions::new();
        let extended = base.clone().with_context(7_u32);
        assert!(base.context.get::<u32>().is_none());
        assert_eq!(extended.context.get::<u32>(), Some(&7));
    }

    #[test]
    fn status_pair_conversion() {
        let codes = StatusCodes::from_pair((200, 400));
        assert_eq!(codes, StatusCodes::default());
        let codes = StatusCodes::from_pair((1, 2));
        assert_eq!(codes.success, StatusCode::OK);
        assert_eq!(codes.error, StatusCode::BAD_REQUEST);
    }
}
