//! Hook kinds: the per-kind validator, resolver key, and log serializer
//! triple plugged into the shared pipeline.

use std::marker::PhantomData;
use std::time::Instant;

use hasura_hooks_core::constants::{
    EVENT_FALLBACK_KEYS, HASURA_ACTION_ERROR_STATUS, HASURA_ACTION_SUCCESS_STATUS,
    HASURA_EVENT_ERROR_STATUS, HASURA_EVENT_SUCCESS_STATUS, HASURA_SCHEDULED_TRIGGER_ERROR_STATUS,
    HASURA_SCHEDULED_TRIGGER_SUCCESS_STATUS,
};
use hasura_hooks_core::{ActionPayload, EventPayload, HookError, ScheduledTriggerPayload};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::observe::{
    serialize_action_request, serialize_scheduled_request, serialize_trigger_request,
};

/// Success/error status code pair (raw `u16`, checked at pipeline
/// construction).
pub type StatusPair = (u16, u16);

/// Compile-time description of one inbound hook kind.
pub trait HookKind: Send + Sync + 'static {
    /// Typed payload handed to handlers.
    type Payload: Send + Sync + 'static;

    /// Short label used in tracing spans.
    const LABEL: &'static str;

    /// Default `(success, error)` status codes.
    const STATUS: StatusPair;

    /// Validates the raw body and narrows it to the typed payload.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    fn parse(body: &Value) -> Result<Self::Payload, HookError>;

    /// Name used to look up the handler.
    fn handler_key(payload: &Self::Payload) -> &str;

    /// Reserved keys tried, in order, when `handler_key` is not registered.
    fn fallback_keys() -> &'static [&'static str] {
        &[]
    }

    /// Error raised when neither the key nor a fallback is registered.
    fn missing_handler(name: &str) -> HookError;

    /// Success log message.
    fn success_message(payload: &Self::Payload) -> String;

    /// Builds the kind-specific log fields from the raw body.
    fn serialize_request(
        body: &Value,
        headers: &HeaderMap,
        start: Instant,
        echo_body: bool,
    ) -> Map<String, Value>;
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Action invocations, with action input shape `I`.
pub struct ActionKind<I = Value>(PhantomData<fn() -> I>);

impl<I> HookKind for ActionKind<I>
where
    I: DeserializeOwned + Send + Sync + 'static,
{
    type Payload = ActionPayload<I>;

    const LABEL: &'static str = "action";
    const STATUS: StatusPair = (HASURA_ACTION_SUCCESS_STATUS, HASURA_ACTION_ERROR_STATUS);

    fn parse(body: &Value) -> Result<Self::Payload, HookError> {
        ActionPayload::parse(body)
    }

    fn handler_key(payload: &Self::Payload) -> &str {
        payload.name()
    }

    fn missing_handler(name: &str) -> HookError {
        HookError::new(format!("action {name} doesn't exist"))
    }

    fn success_message(payload: &Self::Payload) -> String {
        format!("executed {} successfully", payload.name())
    }

    fn serialize_request(
        body: &Value,
        headers: &HeaderMap,
        start: Instant,
        echo_body: bool,
    ) -> Map<String, Value> {
        serialize_action_request(body, headers, start, echo_body)
    }
}

// ---------------------------------------------------------------------------
// Event triggers
// ---------------------------------------------------------------------------

/// Data-change event triggers, with row shape `D`.
pub struct EventKind<D = Value>(PhantomData<fn() -> D>);

impl<D> HookKind for EventKind<D>
where
    D: DeserializeOwned + Send + Sync + 'static,
{
    type Payload = EventPayload<D>;

    const LABEL: &'static str = "event";
    const STATUS: StatusPair = (HASURA_EVENT_SUCCESS_STATUS, HASURA_EVENT_ERROR_STATUS);

    fn parse(body: &Value) -> Result<Self::Payload, HookError> {
        EventPayload::parse(body)
    }

    fn handler_key(payload: &Self::Payload) -> &str {
        payload.trigger_name()
    }

    fn fallback_keys() -> &'static [&'static str] {
        &EVENT_FALLBACK_KEYS
    }

    fn missing_handler(name: &str) -> HookError {
        HookError::new(format!("trigger name {name} doesn't exist"))
    }

    fn success_message(payload: &Self::Payload) -> String {
        format!("executed trigger {} successfully", payload.trigger_name())
    }

    fn serialize_request(
        body: &Value,
        headers: &HeaderMap,
        start: Instant,
        echo_body: bool,
    ) -> Map<String, Value> {
        serialize_trigger_request(body, headers, start, echo_body)
    }
}

// ---------------------------------------------------------------------------
// Scheduled triggers
// ---------------------------------------------------------------------------

/// Scheduled (cron and one-off) triggers, with payload shape `P`.
pub struct ScheduledKind<P = Value>(PhantomData<fn() -> P>);

impl<P> HookKind for ScheduledKind<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    type Payload = ScheduledTriggerPayload<P>;

    const LABEL: &'static str = "scheduled";
    const STATUS: StatusPair = (
        HASURA_SCHEDULED_TRIGGER_SUCCESS_STATUS,
        HASURA_SCHEDULED_TRIGGER_ERROR_STATUS,
    );

    fn parse(body: &Value) -> Result<Self::Payload, HookError> {
        ScheduledTriggerPayload::parse(body)
    }

    fn handler_key(payload: &Self::Payload) -> &str {
        &payload.name
    }

    fn missing_handler(name: &str) -> HookError {
        HookError::new(format!("scheduled trigger {name} doesn't exist"))
    }

    fn success_message(payload: &Self::Payload) -> String {
        format!("executed scheduled trigger {} successfully", payload.name)
    }

    fn serialize_request(
        body: &Value,
        headers: &HeaderMap,
        start: Instant,
        echo_body: bool,
    ) -> Map<String, Value> {
        serialize_scheduled_request(body, headers, start, echo_body)
    }
}
