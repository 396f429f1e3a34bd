//! Hook endpoint: adapts an axum request to a `HookRequest` and the
//! pipeline's `HookResponse` back to an axum response.

use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::Value;
use tracing::debug;

use crate::service::{HookKind, HookPipeline, HookRequest, RequestInfo};

/// Runs the pipeline selected by the route's state.
///
/// The body is read raw and parsed here rather than through the `Json`
/// extractor, so a missing content type or a malformed body reaches the
/// validators as `null` and is answered with the hook error shape instead of
/// axum's rejection.
pub async fn hook_endpoint<K: HookKind>(
    State(pipeline): State<HookPipeline<K>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let parsed = parse_body(&body);
    let request = HookRequest::new(RequestInfo::new(method, uri, headers), parsed);
    let response = pipeline.dispatch(request).await;
    (response.status, Json(response.body)).into_response()
}

fn parse_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        debug!(error = %err, "hook body is not valid JSON");
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body(b""), Value::Null);
    }

    #[test]
    fn malformed_body_is_null() {
        assert_eq!(parse_body(b"{\"action\":"), Value::Null);
    }

    #[test]
    fn json_body_is_parsed() {
        assert_eq!(parse_body(br#"{"id":"x"}"#), json!({ "id": "x" }));
        assert_eq!(parse_body(b"[1,2]"), json!([1, 2]));
    }
}
