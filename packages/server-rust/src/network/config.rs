//! Network configuration for the reference hook server.

use std::time::Duration;

/// Top-level network configuration for the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Allowed CORS origins. Empty disables CORS; `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    /// Maximum time to wait for a request to complete. `None` disables the
    /// timeout.
    pub request_timeout: Option<Duration>,
    /// Header carrying the request id. Generated when absent and echoed on
    /// the response.
    pub request_id_header: String,
    /// Route serving action invocations.
    pub actions_path: String,
    /// Route serving event triggers.
    pub events_path: String,
    /// Route serving scheduled triggers.
    pub scheduled_path: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            cors_origins: Vec::new(),
            request_timeout: Some(Duration::from_secs(30)),
            request_id_header: "x-request-id".to_string(),
            actions_path: "/actions".to_string(),
            events_path: "/events".to_string(),
            scheduled_path: "/schedulers".to_string(),
        }
    }
}
