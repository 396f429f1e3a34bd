use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{from_validated, lenient};
use crate::error::HookError;
use crate::session::SessionVariables;
use crate::validate::validate_action_payload;

/// Action descriptor: which action Hasura is invoking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub name: String,
}

/// Action invocation payload.
///
/// Maps to the action handler request body documented at
/// <https://hasura.io/docs/latest/actions/action-handlers/>.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload<I = Value> {
    pub action: ActionInfo,
    #[serde(default)]
    pub session_variables: Option<SessionVariables>,
    pub input: I,
    /// The GraphQL query that triggered the action; empty when absent or null.
    #[serde(default, deserialize_with = "lenient::string")]
    pub request_query: String,
}

impl<I: DeserializeOwned> ActionPayload<I> {
    /// Validates `body` and converts it into a typed payload.
    ///
    /// # Errors
    ///
    /// Returns a `validation_error` for the first structural violation, or
    /// when `input` does not fit `I`.
    pub fn parse(body: &Value) -> Result<Self, HookError> {
        validate_action_payload(body)?;
        from_validated(body, "action")
    }
}

impl<I> ActionPayload<I> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.action.name
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        crate::session::action_user_id(self)
    }

    #[must_use]
    pub fn user_role(&self) -> Option<&str> {
        crate::session::action_user_role(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct LoginInput {
        email: String,
        password: String,
    }

    fn login_body() -> Value {
        json!({
            "action": { "name": "login" },
            "session_variables": { "x-hasura-role": "anonymous", "x-hasura-user-id": "7" },
            "input": { "email": "a@b.com", "password": "x" },
            "request_query": "mutation { login }"
        })
    }

    #[test]
    fn typed_input_is_deserialized() {
        let payload = ActionPayload::<LoginInput>::parse(&login_body()).unwrap();
        assert_eq!(payload.name(), "login");
        assert_eq!(payload.input.email, "a@b.com");
        assert_eq!(payload.user_role(), Some("anonymous"));
        assert_eq!(payload.user_id(), Some("7"));
    }

    #[test]
    fn request_query_defaults_to_empty() {
        let mut body = login_body();
        body.as_object_mut().unwrap().remove("request_query");
        let payload = ActionPayload::<Value>::parse(&body).unwrap();
        assert_eq!(payload.request_query, "");
    }

    #[test]
    fn null_request_query_reads_as_empty() {
        let mut body = login_body();
        body["request_query"] = Value::Null;
        let payload = ActionPayload::<Value>::parse(&body).unwrap();
        assert_eq!(payload.request_query, "");
    }

    #[test]
    fn non_string_session_values_are_accepted() {
        let mut body = login_body();
        body["session_variables"]["x-hasura-user-id"] = json!(7);
        body["session_variables"]["x-hasura-allowed"] = json!(true);
        let payload = ActionPayload::<LoginInput>::parse(&body).unwrap();
        assert_eq!(payload.user_id(), Some("7"));
    }

    #[test]
    fn mismatched_input_shape_is_a_validation_error() {
        let mut body = login_body();
        body["input"] = json!({ "email": "a@b.com" });
        let err = ActionPayload::<LoginInput>::parse(&body).unwrap_err();
        assert!(err.is_validation());
        assert!(err.message().starts_with("invalid action payload"));
    }
}
