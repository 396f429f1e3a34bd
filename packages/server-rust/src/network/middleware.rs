//! Transport layers wrapped around the hook routes.
//!
//! Every request gets a request id before any hook pipeline runs, so the id
//! is part of the `request_headers` in the hook's log record and is echoed on
//! the response. CORS and the request timeout are optional: Hasura calls
//! webhooks server-to-server, so CORS is off unless origins are configured.
//!
//! Layer order, outermost first: request id, access-log span, CORS, timeout,
//! request id propagation.

use axum::body::Body;
use axum::http::header::HeaderName;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn, Span};

use super::config::NetworkConfig;

const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

/// Wraps `router` with the transport layers selected by `config`.
#[must_use]
pub fn apply_http_layers(router: Router, config: &NetworkConfig) -> Router {
    let request_id = request_id_header(&config.request_id_header);

    let mut router = router.layer(PropagateRequestIdLayer::new(request_id.clone()));
    if let Some(timeout) = config.request_timeout {
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ));
    }
    if let Some(cors) = build_cors_layer(&config.cors_origins) {
        router = router.layer(cors);
    }

    let span_header = request_id.clone();
    router
        .layer(TraceLayer::new_for_http().make_span_with(move |req: &Request<Body>| {
            hook_request_span(req, &span_header)
        }))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

/// Access-log span carrying the request id, so transport logs and hook
/// records can be joined.
fn hook_request_span(req: &Request<Body>, request_id: &HeaderName) -> Span {
    let id = req
        .headers()
        .get(request_id)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    info_span!(
        "hook_http",
        method = %req.method(),
        path = req.uri().path(),
        request_id = id,
    )
}

fn request_id_header(name: &str) -> HeaderName {
    HeaderName::from_bytes(name.as_bytes()).unwrap_or_else(|_| {
        warn!(header = name, "invalid request id header name, using x-request-id");
        HeaderName::from_static(DEFAULT_REQUEST_ID_HEADER)
    })
}

/// `None` when no origins are configured. A `"*"` entry allows any origin;
/// otherwise unparseable origins are skipped.
fn build_cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse().ok()))
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::POST])
            .allow_headers(Any),
    )
}
