//! Hasura hooks core: payload model, validators, and the structured error type
//! shared by actions, event triggers, and scheduled triggers.

pub mod constants;
pub mod date;
pub mod error;
pub mod payload;
pub mod session;
pub mod validate;

pub use date::{is_valid_date, DateValue};
pub use error::{ErrorBodyFormat, HookError};
pub use payload::{
    ActionInfo, ActionPayload, DeliveryInfo, EventBody, EventData, EventOp, EventPayload,
    ScheduledTriggerPayload, TableInfo, TraceContext, TriggerInfo,
};
pub use session::SessionVariables;
pub use validate::{
    validate_action_payload, validate_event_payload, validate_scheduled_trigger_payload,
};
