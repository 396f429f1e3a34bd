//! Per-invocation execution context handed to user handlers.

use std::fmt;
use std::sync::Arc;

use http::{Extensions, HeaderMap, Method, Uri};

use crate::observe::{print_log, HookLogger, LogRecord};

// ---------------------------------------------------------------------------
// RequestInfo
// ---------------------------------------------------------------------------

/// Transport-level view of the inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestInfo {
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// A request carrying only headers, for callers outside an HTTP stack.
    #[must_use]
    pub fn from_headers(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// ExecutionContext
// ---------------------------------------------------------------------------

/// Built fresh for every request and owned by that request's handler call.
///
/// The logger and the static context extensions are shared across requests
/// via `Arc`; nothing in the context is mutable.
#[derive(Clone)]
pub struct ExecutionContext {
    request: Arc<RequestInfo>,
    logger: Arc<dyn HookLogger>,
    debug: bool,
    extensions: Arc<Extensions>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(
        request: Arc<RequestInfo>,
        logger: Arc<dyn HookLogger>,
        debug: bool,
        extensions: Arc<Extensions>,
    ) -> Self {
        Self {
            request,
            logger,
            debug,
            extensions,
        }
    }

    #[must_use]
    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    #[must_use]
    pub fn logger(&self) -> &dyn HookLogger {
        self.logger.as_ref()
    }

    /// Convenience for `print_log(ctx.logger(), record)`.
    pub fn log(&self, record: &LogRecord) {
        print_log(self.logger.as_ref(), record);
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Looks up a value registered with `HookOptions::with_context`.
    #[must_use]
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("request", &self.request)
            .field("debug", &self.debug)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::TracingLogger;

    #[derive(Debug, Clone, PartialEq)]
    struct AppKind(&'static str);

    #[test]
    fn extensions_are_visible_through_context() {
        let mut extensions = Extensions::new();
        extensions.insert(AppKind("Action"));
        let ctx = ExecutionContext::new(
            Arc::new(RequestInfo::default()),
            Arc::new(TracingLogger),
            true,
            Arc::new(extensions),
        );
        assert_eq!(ctx.extension::<AppKind>(), Some(&AppKind("Action")));
        assert!(ctx.extension::<String>().is_none());
        assert!(ctx.debug());
    }

    #[test]
    fn headers_come_from_request() {
        let mut headers = HeaderMap::new();
        headers.insert("x-hasura-role", "admin".parse().unwrap());
        let ctx = ExecutionContext::new(
            Arc::new(RequestInfo::from_headers(headers)),
            Arc::new(TracingLogger),
            false,
            Arc::new(Extensions::new()),
        );
        assert_eq!(ctx.headers()["x-hasura-role"], "admin");
        assert_eq!(ctx.request().method, Method::GET);
    }
}
