//! Network module with deferred startup lifecycle.
//!
//! `new()` records the configuration, pipelines are mounted onto routes,
//! `start()` binds the TCP listener, and `serve()` accepts connections until
//! the shutdown future resolves.

use std::future::Future;

use anyhow::Context as _;
use axum::routing::{get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tracing::info;

use super::config::NetworkConfig;
use super::handlers::{hook_endpoint, liveness_handler};
use super::middleware::apply_http_layers;
use crate::service::{ActionKind, EventKind, HookKind, HookPipeline, ScheduledKind};

/// Owns the HTTP server lifecycle for a set of hook pipelines.
///
/// Each pipeline is mounted as `POST <path>`; `GET /health/live` is always
/// present.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    routes: Router,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            listener: None,
            routes: Router::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Mounts `pipeline` as `POST path`.
    #[must_use]
    pub fn mount<K: HookKind>(mut self, path: &str, pipeline: HookPipeline<K>) -> Self {
        info!(path, kind = K::LABEL, "mounting hook pipeline");
        self.routes = self
            .routes
            .route(path, post(hook_endpoint::<K>).with_state(pipeline));
        self
    }

    /// Mounts an action pipeline at the configured actions path.
    #[must_use]
    pub fn with_actions<I>(self, pipeline: HookPipeline<ActionKind<I>>) -> Self
    where
        I: DeserializeOwned + Send + Sync + 'static,
    {
        let path = self.config.actions_path.clone();
        self.mount(&path, pipeline)
    }

    /// Mounts an event trigger pipeline at the configured events path.
    #[must_use]
    pub fn with_events<D>(self, pipeline: HookPipeline<EventKind<D>>) -> Self
    where
        D: DeserializeOwned + Send + Sync + 'static,
    {
        let path = self.config.events_path.clone();
        self.mount(&path, pipeline)
    }

    /// Mounts a scheduled trigger pipeline at the configured scheduled path.
    #[must_use]
    pub fn with_scheduled_triggers<P>(self, pipeline: HookPipeline<ScheduledKind<P>>) -> Self
    where
        P: DeserializeOwned + Send + Sync + 'static,
    {
        let path = self.config.scheduled_path.clone();
        self.mount(&path, pipeline)
    }

    /// Assembles the axum router: mounted hook routes, the liveness probe,
    /// and the transport middleware.
    pub fn build_router(&self) -> Router {
        let routes = self
            .routes
            .clone()
            .route("/health/live", get(liveness_handler));
        apply_http_layers(routes, &self.config)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which differs from the configured port
    /// when port 0 is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then lets in-flight requests
    /// finish.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or the server hits
    /// a fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .take()
            .context("start() must be called before serve()")?;

        info!("Serving hook endpoints");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Hook server stopped");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use hasura_hooks_core::{ActionPayload, EventPayload, HookError, ScheduledTriggerPayload};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::observe::logger::tests::RecordingLogger;
    use crate::service::{
        use_actions, use_events, use_scheduled_triggers, ExecutionContext, HandlerMap,
        HookOptions,
    };

    fn module(logger: &RecordingLogger) -> NetworkModule {
        let options = HookOptions::new().with_logger(logger.clone());

        let actions = use_actions(
            HandlerMap::<ActionKind>::new().with(
                "login",
                |_ctx: ExecutionContext, payload: ActionPayload| async move {
                    Ok::<_, HookError>(payload.input)
                },
            ),
            options.clone(),
        );
        let events = use_events(
            HandlerMap::<EventKind>::new().with(
                "hello",
                |_ctx: ExecutionContext, _payload: EventPayload| async {
                    Ok::<_, HookError>(json!({ "hello": "world" }))
                },
            ),
            options.clone(),
        );
        let scheduled = use_scheduled_triggers(
            HandlerMap::<ScheduledKind>::new().with(
                "hello",
                |_ctx: ExecutionContext, _payload: ScheduledTriggerPayload| async {
                    Ok::<_, HookError>(json!({ "hello": "world" }))
                },
            ),
            options,
        );

        NetworkModule::new(NetworkConfig::default())
            .with_actions(actions)
            .with_events(events)
            .with_scheduled_triggers(scheduled)
    }

    async fn post_json(router: Router, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .header("x-hasura-role", "admin")
            .body(Body::from(body.to_owned()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn action_echoes_input() {
        let logger = RecordingLogger::default();
        let router = module(&logger).build_router();
        let body = json!({
            "action": { "name": "login" },
            "session_variables": { "x-hasura-role": "anonymous" },
            "input": { "email": "a@b.com", "password": "x" }
        });

        let (status, json) = post_json(router, "/actions", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "email": "a@b.com", "password": "x" }));

        let records = logger.records();
        assert_eq!(records.len(), 1);
        let headers = records[0].1.field("request_headers").cloned().unwrap();
        assert_eq!(headers["x-hasura-role"], json!("admin"));
        assert!(headers.get("x-request-id").is_some());
    }

    #[tokio::test]
    async fn hasura_request_id_is_recorded_and_echoed() {
        let logger = RecordingLogger::default();
        let router = module(&logger).build_router();
        let request = Request::builder()
            .method("POST")
            .uri("/actions")
            .header("content-type", "application/json")
            .header("x-request-id", "7f3c")
            .body(Body::from(
                json!({
                    "action": { "name": "login" },
                    "session_variables": { "x-hasura-role": "anonymous" },
                    "input": {}
                })
                .to_string(),
            ))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "7f3c");

        let records = logger.records();
        let headers = records[0].1.field("request_headers").cloned().unwrap();
        assert_eq!(headers["x-request-id"], json!("7f3c"));
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let logger = RecordingLogger::default();
        let router = module(&logger).build_router();
        let body = json!({
            "action": { "name": "signup" },
            "session_variables": { "x-hasura-role": "anonymous" },
            "input": {}
        });

        let (status, json) = post_json(router, "/actions", &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "message": "action signup doesn't exist" }));
    }

    #[tokio::test]
    async fn event_without_id_is_rejected() {
        let logger = RecordingLogger::default();
        let router = module(&logger).build_router();
        let body = json!({
            "created_at": "2022-05-29T09:56:00Z",
            "trigger": { "name": "hello" },
            "table": { "schema": "public", "name": "users" },
            "event": {
                "session_variables": { "x-hasura-role": "admin" },
                "op": "INSERT",
                "data": { "old": null, "new": { "id": 1 } }
            }
        });

        let (status, json) = post_json(router, "/events", &body.to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "message": "empty hasura event trigger id" }));
    }

    #[tokio::test]
    async fn scheduled_trigger_returns_handler_result() {
        let logger = RecordingLogger::default();
        let router = module(&logger).build_router();
        let body = json!({
            "id": "x",
            "name": "hello",
            "payload": {},
            "scheduled_time": "2022-05-29T09:56:00Z"
        });

        let (status, json) = post_json(router, "/schedulers", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "hello": "world" }));
    }

    #[tokio::test]
    async fn malformed_body_gets_invalid_body_error() {
        let logger = RecordingLogger::default();
        let router = module(&logger).build_router();

        let (status, json) = post_json(router, "/events", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"]
            .as_str()
            .unwrap()
            .starts_with("empty or invalid body"));
        assert_eq!(logger.records()[0].0, "error");
    }

    #[tokio::test]
    async fn liveness_probe_is_mounted() {
        let router = NetworkModule::new(NetworkConfig::default()).build_router();
        let request = Request::builder()
            .uri("/health/live")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unmounted_kind_is_not_routed() {
        let router = NetworkModule::new(NetworkConfig::default()).build_router();
        let request = Request::builder()
            .method("POST")
            .uri("/actions")
            .body(Body::from("{}"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = NetworkModule::new(NetworkConfig {
            host: "127.0.0.1".to_string(),
            ..NetworkConfig::default()
        });
        let port = module.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_is_an_error() {
        let module = NetworkModule::new(NetworkConfig::default());
        let err = module.serve(std::future::pending::<()>()).await.unwrap_err();
        assert!(err.to_string().contains("start() must be called"));
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown_signal() {
        let mut module = NetworkModule::new(NetworkConfig {
            host: "127.0.0.1".to_string(),
            ..NetworkConfig::default()
        });
        module.start().await.unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            module.serve(std::future::ready(())),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
