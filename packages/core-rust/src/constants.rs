//! Header names, roles, status codes, and other wire-level constants shared by
//! actions, event triggers, and scheduled triggers.

/// Standard `Authorization` header.
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Admin secret header forwarded by Hasura.
pub const X_HASURA_ADMIN_SECRET: &str = "x-hasura-admin-secret";
/// Session variable carrying the caller's role. Always present on valid payloads.
pub const X_HASURA_ROLE: &str = "x-hasura-role";
/// Session variable carrying the caller's user id, when authenticated.
pub const X_HASURA_USER_ID: &str = "x-hasura-user-id";
pub const CONTENT_TYPE_HEADER: &str = "content-type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Default admin role.
pub const HASURA_ROLE_ADMIN: &str = "admin";

pub const HASURA_ACTION_SUCCESS_STATUS: u16 = 200;
pub const HASURA_ACTION_ERROR_STATUS: u16 = 400;

pub const HASURA_EVENT_SUCCESS_STATUS: u16 = 200;
pub const HASURA_EVENT_ERROR_STATUS: u16 = 400;

pub const HASURA_SCHEDULED_TRIGGER_SUCCESS_STATUS: u16 = 200;
pub const HASURA_SCHEDULED_TRIGGER_ERROR_STATUS: u16 = 400;

/// Extension code attached to every payload validation failure.
pub const VALIDATION_ERROR: &str = "validation_error";

/// Reserved event handler keys tried, in order, when no handler matches the
/// trigger name.
pub const EVENT_FALLBACK_KEYS: [&str; 2] = ["default", "*"];
