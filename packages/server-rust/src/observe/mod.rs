//! Observability: the injected logger collaborator and the per-kind log
//! record serializers.
//!
//! - [`logger`]: `HookLogger` trait, `LogRecord`, default implementations
//! - [`serialize`]: identifying fields, header echo, and latency per hook kind

pub mod logger;
pub mod serialize;

pub use logger::{print_log, HookLogger, LogLevel, LogRecord, StdoutLogger, TracingLogger};
pub use serialize::{
    headers_to_json, latency_ms, serialize_action_request, serialize_scheduled_request,
    serialize_trigger_request,
};
