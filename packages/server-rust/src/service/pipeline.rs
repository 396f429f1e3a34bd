//! Request pipeline: validate -> resolve -> build context -> invoke -> respond.
//!
//! The sequence is identical for every hook kind; `HookKind` supplies the
//! validator, the resolver key, and the log serializer. Any failure in the
//! first three steps short-circuits to the single error path, which logs the
//! error once and renders the fixed-shape error body.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use hasura_hooks_core::HookError;
use http::StatusCode;
use serde_json::{Map, Value};
use tower::Service;
use tracing::{info_span, Instrument};

use super::config::{HookOptions, StatusCodes};
use super::context::{ExecutionContext, RequestInfo};
use super::kind::HookKind;
use super::registry::Resolver;
use crate::observe::{print_log, LogLevel, LogRecord};

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// One inbound hook call as handed over by the host HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct HookRequest {
    pub request: RequestInfo,
    /// Parsed JSON body; `Value::Null` when the body was empty or unparseable.
    pub body: Value,
}

impl HookRequest {
    #[must_use]
    pub fn new(request: RequestInfo, body: Value) -> Self {
        Self { request, body }
    }
}

/// `(status, body)` returned to the host HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HookResponse {
    pub status: StatusCode,
    pub body: Value,
}

// ---------------------------------------------------------------------------
// HookPipeline
// ---------------------------------------------------------------------------

/// Dispatch pipeline for one hook kind.
///
/// Cheap to clone: the resolver and options are shared.
pub struct HookPipeline<K: HookKind> {
    resolver: Resolver<K>,
    options: Arc<HookOptions>,
    status: StatusCodes,
}

impl<K: HookKind> HookPipeline<K> {
    #[must_use]
    pub fn new(resolver: Resolver<K>, options: HookOptions) -> Self {
        let status = options
            .status
            .unwrap_or_else(|| StatusCodes::from_pair(K::STATUS));
        Self {
            resolver,
            options: Arc::new(options),
            status,
        }
    }

    #[must_use]
    pub fn options(&self) -> &HookOptions {
        &self.options
    }

    #[must_use]
    pub fn status(&self) -> StatusCodes {
        self.status
    }

    /// Runs one request through the pipeline. Never fails: every error is
    /// logged and rendered as the error response.
    pub async fn dispatch(&self, req: HookRequest) -> HookResponse {
        let start = Instant::now();
        let HookRequest { request, body } = req;
        let request = Arc::new(request);

        let span = info_span!(
            "hook",
            kind = K::LABEL,
            outcome = tracing::field::Empty,
        );

        async move {
            match self.invoke(&request, &body).await {
                Ok((message, result)) => {
                    tracing::Span::current().record("outcome", "ok");
                    self.log_success(&request, &body, start, message, &result);
                    HookResponse {
                        status: self.status.success,
                        body: result,
                    }
                }
                Err(err) => {
                    tracing::Span::current().record("outcome", "error");
                    self.log_failure(&request, &body, start, &err);
                    HookResponse {
                        status: self.status.error,
                        body: err.to_body(self.options.error_format),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Steps 2-4. Returns the success log message together with the handler's
    /// result.
    async fn invoke(
        &self,
        request: &Arc<RequestInfo>,
        body: &Value,
    ) -> Result<(String, Value), HookError> {
        let payload = K::parse(body)?;
        let handler = self.resolver.resolve(&payload).await?;
        let message = K::success_message(&payload);

        let ctx = ExecutionContext::new(
            Arc::clone(request),
            Arc::clone(&self.options.logger),
            self.options.debug,
            Arc::clone(&self.options.context),
        );
        let result = handler.call(ctx, payload).await?;
        Ok((message, result))
    }

    fn request_fields(&self, request: &RequestInfo, body: &Value, start: Instant) -> Map<String, Value> {
        let echo_body = self.options.debug || self.options.log_request_body;
        K::serialize_request(body, &request.headers, start, echo_body)
    }

    fn log_success(
        &self,
        request: &RequestInfo,
        body: &Value,
        start: Instant,
        message: String,
        result: &Value,
    ) {
        let mut fields = self.request_fields(request, body, start);
        fields.insert("http_code".into(), Value::from(self.status.success.as_u16()));
        let response = if self.options.echoes_response() {
            result.clone()
        } else {
            Value::Null
        };
        fields.insert("response".into(), response);

        print_log(
            self.options.logger.as_ref(),
            &LogRecord::new(LogLevel::Info, message, fields),
        );
    }

    fn log_failure(&self, request: &RequestInfo, body: &Value, start: Instant, err: &HookError) {
        let mut fields = self.request_fields(request, body, start);
        fields.insert("http_code".into(), Value::from(self.status.error.as_u16()));

        let mut error = match serde_json::to_value(err) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        if self.options.debug {
            if let Some(trace) = err.trace() {
                error.insert("trace".into(), Value::from(trace));
            }
        }
        fields.insert("error".into(), Value::Object(error));

        print_log(
            self.options.logger.as_ref(),
            &LogRecord::new(LogLevel::Error, err.message(), fields),
        );
    }
}

impl<K: HookKind> Clone for HookPipeline<K> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            options: Arc::clone(&self.options),
            status: self.status,
        }
    }
}

impl<K: HookKind> fmt::Debug for HookPipeline<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookPipeline")
            .field("kind", &K::LABEL)
            .field("resolver", &self.resolver)
            .field("options", &self.options)
            .field("status", &self.status)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// tower::Service
// ---------------------------------------------------------------------------

impl<K: HookKind> Service<HookRequest> for HookPipeline<K> {
    type Response = HookResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<HookResponse, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: HookRequest) -> Self::Future {
        let pipeline = self.clone();
        Box::pin(async move { Ok(pipeline.dispatch(req).await) })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
