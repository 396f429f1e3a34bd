//! Handler capability: the single-call interface user business logic
//! implements.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use hasura_hooks_core::HookError;
use serde::Serialize;
use serde_json::Value;

use super::context::ExecutionContext;

/// User-supplied logic invoked with `(context, payload)` once a hook name has
/// been resolved.
///
/// Implemented for any `Fn(ExecutionContext, P) -> impl Future<Output =
/// Result<R, E>>` where `R: Serialize` and `E: Into<HookError>`, so plain async
/// closures and functions work directly. Return `anyhow::Error` to have any
/// error normalized into a code-less `HookError`.
#[async_trait]
pub trait Handler<P>: Send + Sync + 'static {
    /// Runs the handler. The result becomes the success response body.
    async fn call(&self, ctx: ExecutionContext, payload: P) -> Result<Value, HookError>;
}

/// Shared, type-erased handler.
pub type BoxHandler<P> = Arc<dyn Handler<P>>;

#[async_trait]
impl<P, F, Fut, R, E> Handler<P> for F
where
    P: Send + 'static,
    F: Fn(ExecutionContext, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<HookError> + Send + 'static,
{
    async fn call(&self, ctx: ExecutionContext, payload: P) -> Result<Value, HookError> {
        let result = (self)(ctx, payload).await.map_err(Into::into)?;
        Ok(serde_json::to_value(result)?)
    }
}
