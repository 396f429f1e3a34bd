//! Hasura hooks server: handler registry, dispatch pipeline, structured
//! observability, and a reference axum transport.

pub mod network;
pub mod observe;
pub mod service;

pub use network::{NetworkConfig, NetworkModule};
pub use observe::{HookLogger, LogLevel, LogRecord, StdoutLogger, TracingLogger};
pub use service::{
    use_action, use_actions, use_event, use_events, use_scheduled_trigger,
    use_scheduled_triggers, ExecutionContext, HandlerMap, HookOptions, HookPipeline,
};
