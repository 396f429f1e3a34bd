//! Typed views over the three inbound payload shapes.
//!
//! The envelope fields (names, ids, operation, `data.old`/`data.new`
//! presence) are fixed. The business-specific inner shapes (`input`,
//! `data.old`/`data.new`, `payload`) are type parameters chosen by the
//! integrator and default to `serde_json::Value`.
//!
//! Field names follow the Hasura wire format (snake_case), so no serde
//! renaming is needed.

pub mod action;
pub mod event;
pub mod scheduled;

pub use action::{ActionInfo, ActionPayload};
pub use event::{
    DeliveryInfo, EventBody, EventData, EventOp, EventPayload, TableInfo, TraceContext,
    TriggerInfo,
};
pub use scheduled::ScheduledTriggerPayload;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::HookError;
use crate::validate::is_absent;

/// Deserializes an already-validated body into a typed view without taking
/// ownership of it. A shape mismatch against the integrator's types is
/// reported as a validation error.
pub(crate) fn from_validated<T: DeserializeOwned>(body: &Value, kind: &str) -> Result<T, HookError> {
    serde::Deserialize::deserialize(body).map_err(|err| {
        tracing::debug!(kind, error = %err, "validated payload does not fit the handler's shape");
        HookError::validation(format!("invalid {kind} payload: {err}"))
    })
}

/// `deserialize_with` helpers for fields the validators never look at, or
/// only check for presence. They must not reject a body the validators
/// accepted.
pub(crate) mod lenient {
    use super::{is_absent, Deserialize, DeserializeOwned, Deserializer, Value};

    /// Pass-through field: any shape that does not fit `T` becomes `None`.
    pub(crate) fn option<'de, De, T>(deserializer: De) -> Result<Option<T>, De::Error>
    where
        De: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value)
            .map_err(|err| tracing::debug!(error = %err, "ignoring malformed pass-through field"))
            .ok())
    }

    /// Row snapshot: absent values (`null`, `false`, `0`, `""`) become `None`,
    /// anything else must fit `T`.
    pub(crate) fn snapshot<'de, De, T>(deserializer: De) -> Result<Option<T>, De::Error>
    where
        De: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if is_absent(Some(&value)) {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }

    /// Free-text field: `null` reads as empty, non-strings as their JSON text.
    pub(crate) fn string<'de, De>(deserializer: De) -> Result<String, De::Error>
    where
        De: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            Value::String(text) => text,
            other => other.to_string(),
        })
    }
}
