//! Registration surface: one single-handler and one named-map constructor per
//! hook kind.
//!
//! ```ignore
//! let actions = use_actions(
//!     HandlerMap::new().with("login", login),
//!     HookOptions::new().with_context(AppKind("Action")),
//! );
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::config::HookOptions;
use super::handler::Handler;
use super::kind::{ActionKind, EventKind, ScheduledKind};
use super::pipeline::HookPipeline;
use super::registry::{HandlerMap, Resolver};
use hasura_hooks_core::{ActionPayload, EventPayload, ScheduledTriggerPayload};

/// A pipeline serving every action with `handler`, whatever its name.
#[must_use]
pub fn use_action<I, H>(handler: H, options: HookOptions) -> HookPipeline<ActionKind<I>>
where
    I: DeserializeOwned + Send + Sync + 'static,
    H: Handler<ActionPayload<I>>,
{
    HookPipeline::new(Resolver::single(handler), options)
}

/// A pipeline dispatching actions by `action.name`.
#[must_use]
pub fn use_actions<I>(handlers: HandlerMap<ActionKind<I>>, options: HookOptions) -> HookPipeline<ActionKind<I>>
where
    I: DeserializeOwned + Send + Sync + 'static,
{
    HookPipeline::new(Resolver::named(handlers), options)
}

/// A pipeline serving every event trigger with `handler`.
#[must_use]
pub fn use_event<D, H>(handler: H, options: HookOptions) -> HookPipeline<EventKind<D>>
where
    D: DeserializeOwned + Send + Sync + 'static,
    H: Handler<EventPayload<D>>,
{
    HookPipeline::new(Resolver::single(handler), options)
}

/// A pipeline dispatching event triggers by `trigger.name`, falling back to
/// the `"default"` and then the `"*"` handler.
#[must_use]
pub fn use_events<D>(handlers: HandlerMap<EventKind<D>>, options: HookOptions) -> HookPipeline<EventKind<D>>
where
    D: DeserializeOwned + Send + Sync + 'static,
{
    HookPipeline::new(Resolver::named(handlers), options)
}

/// A pipeline serving every scheduled trigger with `handler`.
#[must_use]
pub fn use_scheduled_trigger<P, H>(handler: H, options: HookOptions) -> HookPipeline<ScheduledKind<P>>
where
    P: DeserializeOwned + Send + Sync + 'static,
    H: Handler<ScheduledTriggerPayload<P>>,
{
    HookPipeline::new(Resolver::single(handler), options)
}

/// A pipeline dispatching scheduled triggers by `name`.
#[must_use]
pub fn use_scheduled_triggers<P>(
    handlers: HandlerMap<ScheduledKind<P>>,
    options: HookOptions,
) -> HookPipeline<ScheduledKind<P>>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    HookPipeline::new(Resolver::named(handlers), options)
}

/// Untyped action pipeline, the common case for quick integrations.
pub type ActionPipeline = HookPipeline<ActionKind<Value>>;
/// Untyped event trigger pipeline.
pub type EventPipeline = HookPipeline<EventKind<Value>>;
/// Untyped scheduled trigger pipeline.
pub type ScheduledPipeline = HookPipeline<ScheduledKind<Value>>;

#[cfg(test)]
mod tests {
    use hasura_hooks_core::HookError;
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::service::context::{ExecutionContext, RequestInfo};
    use crate::service::pipeline::HookRequest;

    fn event_body(trigger: &str) -> Value {
        json!({
            "id": "1",
            "created_at": 1_653_818_160_000_u64,
            "trigger": { "name": trigger },
            "table": { "schema": "public", "name": "users" },
            "event": {
                "session_variables": { "x-hasura-role": "admin" },
                "op": "MANUAL",
                "data": { "old": null, "new": { "id": 1 } }
            }
        })
    }

    #[tokio::test]
    async fn single_event_handler_serves_any_trigger() {
        let pipeline: EventPipeline = use_event(
            |_ctx: ExecutionContext, payload: EventPayload| async move {
                Ok::<_, HookError>(json!({ "trigger": payload.trigger.name }))
            },
            HookOptions::default(),
        );
        let resp = pipeline
            .dispatch(HookRequest::new(RequestInfo::default(), event_body("anything")))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body, json!({ "trigger": "anything" }));
    }

    #[tokio::test]
    async fn default_event_handler_catches_unregistered_triggers() {
        let pipeline = use_events(
            HandlerMap::<EventKind>::new()
                .with("hello", |_ctx: ExecutionContext, _p: EventPayload| async {
                    Ok::<_, HookError>(json!("hello"))
                })
                .with("default", |_ctx: ExecutionContext, _p: EventPayload| async {
                    Ok::<_, HookError>(json!("default"))
                }),
            HookOptions::default(),
        );
        let resp = pipeline
            .dispatch(HookRequest::new(RequestInfo::default(), event_body("update_user")))
            .await;
        assert_eq!(resp.body, json!("default"));
    }

    #[tokio::test]
    async fn scheduled_map_rejects_unknown_names() {
        let pipeline: ScheduledPipeline =
            use_scheduled_triggers(HandlerMap::new(), HookOptions::default());
        let body = json!({
            "id": "x",
            "name": "nightly",
            "payload": null,
            "scheduled_time": "2022-05-29T09:56:00Z"
        });
        let resp = pipeline
            .dispatch(HookRequest::new(RequestInfo::default(), body))
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, json!({ "message": "scheduled trigger nightly doesn't exist" }));
    }
}
