//! Session variables attached to actions and event triggers.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::{X_HASURA_ROLE, X_HASURA_USER_ID};
use crate::payload::{ActionPayload, EventPayload};

/// Caller identity attributes forwarded by Hasura (`x-hasura-*` keys).
///
/// Uses `BTreeMap` for deterministic serialization order in log records.
/// Non-string values are kept as their JSON text; `null` entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SessionVariables(BTreeMap<String, String>);

impl<'de> Deserialize<'de> for SessionVariables {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(text) => Some((key, text)),
                other => Some((key, other.to_string())),
            })
            .collect())
    }
}

impl SessionVariables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful in tests.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `x-hasura-role` value.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.get(X_HASURA_ROLE)
    }

    /// The `x-hasura-user-id` value.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.get(X_HASURA_USER_ID)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for SessionVariables {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Getters
// ---------------------------------------------------------------------------

#[must_use]
pub fn action_user_id<I>(payload: &ActionPayload<I>) -> Option<&str> {
    payload.session_variables.as_ref().and_then(SessionVariables::user_id)
}

#[must_use]
pub fn action_user_role<I>(payload: &ActionPayload<I>) -> Option<&str> {
    payload.session_variables.as_ref().and_then(SessionVariables::role)
}

#[must_use]
pub fn event_user_id<D>(payload: &EventPayload<D>) -> Option<&str> {
    payload
        .event
        .session_variables
        .as_ref()
        .and_then(SessionVariables::user_id)
}

#[must_use]
pub fn event_user_role<D>(payload: &EventPayload<D>) -> Option<&str> {
    payload
        .event
        .session_variables
        .as_ref()
        .and_then(SessionVariables::role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_and_user_id_lookup() {
        let vars = SessionVariables::new()
            .with("x-hasura-role", "user")
            .with("x-hasura-user-id", "42");
        assert_eq!(vars.role(), Some("user"));
        assert_eq!(vars.user_id(), Some("42"));
        assert_eq!(vars.get("x-hasura-org-id"), None);
    }

    #[test]
    fn deserializes_from_plain_object() {
        let vars: SessionVariables =
            serde_json::from_str(r#"{"x-hasura-role":"anonymous"}"#).unwrap();
        assert_eq!(vars.role(), Some("anonymous"));
        assert!(vars.user_id().is_none());
    }

    #[test]
    fn non_string_values_keep_their_json_text() {
        let vars: SessionVariables = serde_json::from_value(serde_json::json!({
            "x-hasura-role": "user",
            "x-hasura-user-id": 42,
            "x-hasura-is-owner": false,
            "x-hasura-org-id": null
        }))
        .unwrap();
        assert_eq!(vars.user_id(), Some("42"));
        assert_eq!(vars.get("x-hasura-is-owner"), Some("false"));
        assert_eq!(vars.get("x-hasura-org-id"), None);
    }
}
