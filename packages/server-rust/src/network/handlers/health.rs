//! Liveness endpoint.

use axum::http::StatusCode;

/// Liveness probe: always 200 OK while the process is serving.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}
