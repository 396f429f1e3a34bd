use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::from_validated;
use crate::date::DateValue;
use crate::error::HookError;
use crate::validate::validate_scheduled_trigger_payload;

/// Scheduled trigger payload.
///
/// Maps to <https://hasura.io/docs/latest/scheduled-triggers/index/>.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTriggerPayload<P = Value> {
    pub id: String,
    pub name: String,
    pub payload: P,
    pub scheduled_time: DateValue,
}

impl<P: DeserializeOwned> ScheduledTriggerPayload<P> {
    /// Validates `body` and converts it into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns a `validation_error` for the first structural violation, or
    /// when `payload` does not fit `P`.
    pub fn parse(body: &Value) -> Result<Self, HookError> {
        validate_scheduled_trigger_payload(body)?;
        from_validated(body, "scheduled trigger")
    }
}

impl<P> ScheduledTriggerPayload<P> {
    /// `scheduled_time` resolved to a UTC instant.
    #[must_use]
    pub fn scheduled_instant(&self) -> Option<DateTime<Utc>> {
        self.scheduled_time.to_datetime()
    }
}
