//! Hook dispatch framework.
//!
//! Every inbound call goes through the same sequence:
//!
//! 1. **Validation** (`kind`): raw JSON -> typed payload, or a `validation_error`
//! 2. **Resolution** (`registry`): payload name -> handler, with event fallbacks
//! 3. **Context** (`context`): fresh `ExecutionContext` per request
//! 4. **Invocation** (`handler`): the user's async handler
//! 5. **Response + log** (`pipeline`): `(status, body)` plus one structured record
//!
//! `hooks` is the registration surface integrators start from.

pub mod config;
pub mod context;
pub mod handler;
pub mod hooks;
pub mod kind;
pub mod pipeline;
pub mod registry;

// Re-export key types for convenient access.
pub use config::{HookOptions, StatusCodes};
pub use context::{ExecutionContext, RequestInfo};
pub use handler::{BoxHandler, Handler};
pub use hooks::{
    use_action, use_actions, use_event, use_events, use_scheduled_trigger,
    use_scheduled_triggers, ActionPipeline, EventPipeline, ScheduledPipeline,
};
pub use kind::{ActionKind, EventKind, HookKind, ScheduledKind};
pub use pipeline::{HookPipeline, HookRequest, HookResponse};
pub use registry::{HandlerMap, Resolver};
