use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{from_validated, lenient};
use crate::date::DateValue;
use crate::error::HookError;
use crate::session::SessionVariables;
use crate::validate::validate_event_payload;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Data operation that fired the event trigger.
///
/// Variant names use `SCREAMING_CASE` to match the wire format exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum EventOp {
    INSERT,
    UPDATE,
    DELETE,
    MANUAL,
}

impl EventOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventOp::INSERT => "INSERT",
            EventOp::UPDATE => "UPDATE",
            EventOp::DELETE => "DELETE",
            EventOp::MANUAL => "MANUAL",
        }
    }

    /// Parses an operation name; `None` for anything outside the four
    /// supported operations.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "INSERT" => Some(EventOp::INSERT),
            "UPDATE" => Some(EventOp::UPDATE),
            "DELETE" => Some(EventOp::DELETE),
            "MANUAL" => Some(EventOp::MANUAL),
            _ => None,
        }
    }
}

impl fmt::Display for EventOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerInfo {
    pub name: String,
}

/// Table the trigger is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
}

/// Row snapshots before and after the operation.
///
/// `old` is absent for INSERT and MANUAL, `new` is absent for DELETE. Falsy
/// snapshots (`false`, `0`, `""`) count as absent, like `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned"))]
pub struct EventData<D = Value> {
    #[serde(default = "Option::default", deserialize_with = "lenient::snapshot")]
    pub old: Option<D>,
    #[serde(default = "Option::default", deserialize_with = "lenient::snapshot")]
    pub new: Option<D>,
}

/// Trace propagation ids. Pass-through only, never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
}

/// Delivery bookkeeping. Pass-through only, never validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub max_retries: u32,
    pub current_retry: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned"))]
pub struct EventBody<D = Value> {
    #[serde(default)]
    pub session_variables: Option<SessionVariables>,
    pub op: EventOp,
    pub data: EventData<D>,
    /// `None` when absent or not shaped like a trace context.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "lenient::option"
    )]
    pub trace_context: Option<TraceContext>,
}

/// Event trigger payload.
///
/// Maps to <https://hasura.io/docs/latest/event-triggers/payload/>.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned"))]
pub struct EventPayload<D = Value> {
    pub id: String,
    pub created_at: DateValue,
    pub trigger: TriggerInfo,
    pub table: TableInfo,
    pub event: EventBody<D>,
    /// `None` when absent or not shaped like delivery info.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "lenient::option"
    )]
    pub delivery_info: Option<DeliveryInfo>,
}

impl<D: DeserializeOwned> EventPayload<D> {
    /// Validates `body` and converts it into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns a `validation_error` for the first structural violation, or
    /// when the row snapshots do not fit `D`.
    pub fn parse(body: &Value) -> Result<Self, HookError> {
        validate_event_payload(body)?;
        from_validated(body, "event")
    }
}

impl<D> EventPayload<D> {
    #[must_use]
    pub fn trigger_name(&self) -> &str {
        &self.trigger.name
    }

    #[must_use]
    pub fn op(&self) -> EventOp {
        self.event.op
    }

    /// `created_at` resolved to a UTC instant.
    #[must_use]
    pub fn created_at_instant(&self) -> Option<DateTime<Utc>> {
        self.created_at.to_datetime()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        crate::session::event_user_id(self)
    }

    #[must_use]
    pub fn user_role(&self) -> Option<&str> {
        crate::session::event_user_role(self)
    }
}
