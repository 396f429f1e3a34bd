//! Per-kind log record serializers.
//!
//! Serializers read the raw request body rather than the validated payload,
//! so the same fields are produced on the success and failure paths; fields
//! that cannot be found are logged as `null`. Latency is computed at
//! serialization time and therefore covers everything up to the point the
//! record is built.

use std::time::Instant;

use http::HeaderMap;
use serde_json::{Map, Value};

/// Milliseconds elapsed since `start`.
#[must_use]
pub fn latency_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Renders request headers as a JSON object. Repeated headers become arrays;
/// non-UTF-8 values are rendered lossily.
#[must_use]
pub fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut out = Map::new();
    for name in headers.keys() {
        let mut values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .map(|value| Value::from(String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            Value::Array(values)
        };
        out.insert(name.as_str().to_string(), value);
    }
    Value::Object(out)
}

fn lookup<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(body, |value, key| value.get(*key))
}

fn lookup_or_null(body: &Value, path: &[&str]) -> Value {
    lookup(body, path).cloned().unwrap_or(Value::Null)
}

fn echo(body: &Value, path: &[&str], enabled: bool) -> Value {
    if enabled {
        lookup_or_null(body, path)
    } else {
        Value::Null
    }
}

/// `action_name`, `session_variables`, `request_headers`, `request_body`
/// (the action `input`, only when `echo_body`), `latency_ms`.
#[must_use]
pub fn serialize_action_request(
    body: &Value,
    headers: &HeaderMap,
    start: Instant,
    echo_body: bool,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("action_name".into(), lookup_or_null(body, &["action", "name"]));
    fields.insert("session_variables".into(), lookup_or_null(body, &["session_variables"]));
    fields.insert("request_headers".into(), headers_to_json(headers));
    fields.insert("request_body".into(), echo(body, &["input"], echo_body));
    fields.insert("latency_ms".into(), Value::from(latency_ms(start)));
    fields
}

/// `trigger_name`, `request_headers`, `request_body` (the whole event
/// payload, only when `echo_body`), `latency_ms`.
#[must_use]
pub fn serialize_trigger_request(
    body: &Value,
    headers: &HeaderMap,
    start: Instant,
    echo_body: bool,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("trigger_name".into(), lookup_or_null(body, &["trigger", "name"]));
    fields.insert("request_headers".into(), headers_to_json(headers));
    fields.insert("request_body".into(), echo(body, &[], echo_body));
    fields.insert("latency_ms".into(), Value::from(latency_ms(start)));
    fields
}

/// `event_name`, `request_headers`, `request_body` (the scheduled `payload`,
/// only when `echo_body`), `latency_ms`.
#[must_use]
pub fn serialize_scheduled_request(
    body: &Value,
    headers: &HeaderMap,
    start: Instant,
    echo_body: bool,
) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("event_name".into(), lookup_or_null(body, &["name"]));
    fields.insert("request_headers".into(), headers_to_json(headers));
    fields.insert("request_body".into(), echo(body, &["payload"], echo_body));
    fields.insert("latency_ms".into(), Value::from(latency_ms(start)));
    fields
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http::HeaderValue;
    use serde_json::json;

    use super::*;

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.append("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        headers.append("x-forwarded-for", HeaderValue::from_static("10.0.0.2"));
        headers
    }

    #[test]
    fn headers_render_single_and_repeated_values() {
        assert_eq!(
            headers_to_json(&headers()),
            json!({
                "content-type": "application/json",
                "x-forwarded-for": ["10.0.0.1", "10.0.0.2"]
            })
        );
    }

    #[test]
    fn action_fields_echo_input_only_when_enabled() {
        let body = json!({
            "action": { "name": "login" },
            "session_variables": { "x-hasura-role": "anonymous" },
            "input": { "email": "a@b.com" }
        });
        let quiet = serialize_action_request(&body, &HeaderMap::new(), Instant::now(), false);
        assert_eq!(quiet["action_name"], json!("login"));
        assert_eq!(quiet["session_variables"], json!({ "x-hasura-role": "anonymous" }));
        assert_eq!(quiet["request_body"], Value::Null);

        let loud = serialize_action_request(&body, &HeaderMap::new(), Instant::now(), true);
        assert_eq!(loud["request_body"], json!({ "email": "a@b.com" }));
    }

    #[test]
    fn trigger_fields_echo_whole_body() {
        let body = json!({ "id": "1", "trigger": { "name": "update_user" } });
        let fields = serialize_trigger_request(&body, &HeaderMap::new(), Instant::now(), true);
        assert_eq!(fields["trigger_name"], json!("update_user"));
        assert_eq!(fields["request_body"], body);
    }

    #[test]
    fn scheduled_fields_echo_payload() {
        let body = json!({ "id": "1", "name": "hello", "payload": { "n": 1 } });
        let fields = serialize_scheduled_request(&body, &HeaderMap::new(), Instant::now(), true);
        assert_eq!(fields["event_name"], json!("hello"));
        assert_eq!(fields["request_body"], json!({ "n": 1 }));
    }

    #[test]
    fn missing_identifying_fields_are_null() {
        let body = json!(null);
        let fields = serialize_action_request(&body, &HeaderMap::new(), Instant::now(), true);
        assert_eq!(fields["action_name"], Value::Null);
        assert_eq!(fields["request_body"], Value::Null);
        let fields = serialize_trigger_request(&json!([1]), &HeaderMap::new(), Instant::now(), false);
        assert_eq!(fields["trigger_name"], Value::Null);
    }

    #[test]
    fn latency_is_measured_from_start() {
        let start = Instant::now().checked_sub(Duration::from_millis(25)).unwrap();
        assert!(latency_ms(start) >= 25);
    }
}
