//! Structural validation of the three inbound payload shapes.
//!
//! Each validator checks fields in a fixed order and fails on the first
//! violation; the order is part of the observable contract. Validators never
//! mutate or copy the body: on success they hand back the same object,
//! narrowed to a JSON map.

use serde_json::{Map, Value};

use crate::constants::X_HASURA_ROLE;
use crate::date::is_valid_date;
use crate::error::HookError;
use crate::payload::EventOp;

type Object = Map<String, Value>;

const INVALID_BODY: &str =
    "empty or invalid body. Expected a JSON object; check the request content-type";

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

fn ensure(passed: bool, message: impl FnOnce() -> String) -> Result<(), HookError> {
    if passed {
        Ok(())
    } else {
        Err(HookError::validation(message()))
    }
}

fn pre_validate_body(body: &Value) -> Result<&Object, HookError> {
    body.as_object()
        .ok_or_else(|| HookError::validation(INVALID_BODY))
}

/// Non-null, non-array object.
fn is_object(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_object)
}

/// Missing, or one of the values Hasura clients treat as "no row":
/// `null`, `false`, `0`, `""`.
pub(crate) fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n.abs() < f64::MIN_POSITIVE),
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

fn non_empty_str(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .is_some_and(|text| !text.is_empty())
}

/// Looks up `path` through nested objects, yielding `None` as soon as a
/// segment is missing or not an object.
fn field<'a>(obj: &'a Object, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(obj.get(*first)?, |value, key| value.as_object()?.get(*key))
}

fn has_role(session_variables: Option<&Value>) -> bool {
    non_empty_str(
        session_variables
            .and_then(Value::as_object)
            .and_then(|vars| vars.get(X_HASURA_ROLE)),
    )
}

/// Renders a field value for inclusion in an error message.
fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Validates an action invocation body.
///
/// Order: body is an object, `action.name`, role in `session_variables`,
/// `input` is an object.
///
/// # Errors
///
/// Returns a `validation_error` naming the first violation.
pub fn validate_action_payload(body: &Value) -> Result<&Object, HookError> {
    let payload = pre_validate_body(body)?;
    ensure(non_empty_str(field(payload, &["action", "name"])), || {
        "empty hasura action name".to_string()
    })?;
    ensure(has_role(payload.get("session_variables")), || {
        "invalid session_variables; user role property exists by default".to_string()
    })?;
    ensure(is_object(payload.get("input")), || {
        "invalid action input".to_string()
    })?;
    Ok(payload)
}

/// Validates an event trigger body.
///
/// Order: body is an object, `id`, `trigger.name`, `table.name` and
/// `table.schema`, `created_at`, role in `event.session_variables`,
/// `event.data` is an object, then the per-operation shape of
/// `data.old`/`data.new`. `trace_context` and `delivery_info` are not
/// checked.
///
/// # Errors
///
/// Returns a `validation_error` naming the first violation.
pub fn validate_event_payload(body: &Value) -> Result<&Object, HookError> {
    let payload = pre_validate_body(body)?;
    ensure(non_empty_str(payload.get("id")), || {
        "empty hasura event trigger id".to_string()
    })?;
    ensure(non_empty_str(field(payload, &["trigger", "name"])), || {
        "empty hasura event trigger name".to_string()
    })?;
    ensure(
        non_empty_str(field(payload, &["table", "name"]))
            && non_empty_str(field(payload, &["table", "schema"])),
        || "empty hasura event trigger table".to_string(),
    )?;
    ensure(payload.get("created_at").is_some_and(is_valid_date), || {
        "created_at is invalid date".to_string()
    })?;
    ensure(has_role(field(payload, &["event", "session_variables"])), || {
        "invalid session_variables; user role exists by default".to_string()
    })?;

    let data = field(payload, &["event", "data"]);
    ensure(is_object(data), || "invalid event data".to_string())?;
    let old = field(payload, &["event", "data", "old"]);
    let new = field(payload, &["event", "data", "new"]);

    let op_value = field(payload, &["event", "op"]);
    match op_value.and_then(Value::as_str).and_then(EventOp::parse) {
        Some(EventOp::INSERT) => {
            ensure(is_absent(old), || "old data of INSERT event must be null".to_string())?;
            ensure(is_object(new), || {
                "new data of INSERT event must be an object".to_string()
            })?;
        }
        Some(EventOp::UPDATE) => {
            ensure(is_object(old), || {
                "old data of UPDATE event must be an object".to_string()
            })?;
            ensure(is_object(new), || {
                "new data of UPDATE event must be an object".to_string()
            })?;
        }
        Some(EventOp::DELETE) => {
            ensure(is_object(old), || {
                "old data of DELETE event must be an object".to_string()
            })?;
            ensure(is_absent(new), || "new data of DELETE event must be null".to_string())?;
        }
        Some(EventOp::MANUAL) => {
            ensure(is_absent(old), || "old data of MANUAL event must be null".to_string())?;
            ensure(is_object(new), || {
                "new data of MANUAL event must be an object".to_string()
            })?;
        }
        None => {
            return Err(HookError::validation(format!(
                "invalid Hasura event trigger operation: {}",
                describe(op_value)
            )));
        }
    }

    Ok(payload)
}

/// Validates a scheduled trigger body.
///
/// Order: body is an object, `id`, `name`, `scheduled_time`.
///
/// # Errors
///
/// Returns a `validation_error` naming the first violation.
pub fn validate_scheduled_trigger_payload(body: &Value) -> Result<&Object, HookError> {
    let payload = pre_validate_body(body)?;
    ensure(non_empty_str(payload.get("id")), || {
        "empty hasura scheduled trigger id".to_string()
    })?;
    ensure(non_empty_str(payload.get("name")), || {
        "empty hasura scheduled trigger name".to_string()
    })?;
    let scheduled_time = payload.get("scheduled_time");
    ensure(scheduled_time.is_some_and(is_valid_date), || {
        format!("scheduled_time is invalid: {}", describe(scheduled_time))
    })?;
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
