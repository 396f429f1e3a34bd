//! Handler registry and resolution.
//!
//! A `HandlerMap` is built once at startup and is read-only afterwards, so it
//! is shared by concurrent requests behind an `Arc` without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hasura_hooks_core::HookError;

use super::handler::{BoxHandler, Handler};
use super::kind::HookKind;

// ---------------------------------------------------------------------------
// HandlerMap
// ---------------------------------------------------------------------------

/// Name -> handler mapping for one hook kind.
///
/// Keys are unique; registering a name twice replaces the earlier handler.
/// For event triggers the reserved keys `"default"` and `"*"` act as
/// fallbacks.
pub struct HandlerMap<K: HookKind> {
    handlers: HashMap<String, BoxHandler<K::Payload>>,
}

impl<K: HookKind> HandlerMap<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Builder-style registration.
    #[must_use]
    pub fn with<H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<K::Payload>,
    {
        self.register(name, handler);
        self
    }

    /// Registers `handler` under `name`, returning the handler it replaced.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> Option<BoxHandler<K::Payload>>
    where
        H: Handler<K::Payload>,
    {
        self.handlers.insert(name.into(), Arc::new(handler))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<BoxHandler<K::Payload>> {
        self.handlers.get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up `name`, then each of the kind's fallback keys.
    fn lookup(&self, name: &str) -> Option<BoxHandler<K::Payload>> {
        self.get(name).or_else(|| {
            K::fallback_keys()
                .iter()
                .find_map(|fallback| self.get(fallback))
        })
    }
}

impl<K: HookKind> Default for HandlerMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: HookKind> fmt::Debug for HandlerMap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMap")
            .field("kind", &K::LABEL)
            .field("names", &self.names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves the handler for a validated payload.
///
/// `Single` always yields its handler without looking at the payload;
/// `Named` looks the payload's name up in a `HandlerMap`.
pub enum Resolver<K: HookKind> {
    Single(BoxHandler<K::Payload>),
    Named(Arc<HandlerMap<K>>),
}

impl<K: HookKind> Resolver<K> {
    #[must_use]
    pub fn single<H: Handler<K::Payload>>(handler: H) -> Self {
        Resolver::Single(Arc::new(handler))
    }

    #[must_use]
    pub fn named(handlers: HandlerMap<K>) -> Self {
        Resolver::Named(Arc::new(handlers))
    }

    /// Resolves or rejects. Lookup itself never suspends; the async contract
    /// lets single and named registration share one pipeline.
    ///
    /// # Errors
    ///
    /// Returns the kind's "doesn't exist" error when no handler matches.
    #[allow(clippy::unused_async)]
    pub async fn resolve(&self, payload: &K::Payload) -> Result<BoxHandler<K::Payload>, HookError> {
        match self {
            Resolver::Single(handler) => Ok(Arc::clone(handler)),
            Resolver::Named(handlers) => {
                let name = K::handler_key(payload);
                handlers.lookup(name).ok_or_else(|| K::missing_handler(name))
            }
        }
    }
}

impl<K: HookKind> Clone for Resolver<K> {
    fn clone(&self) -> Self {
        match self {
            Resolver::Single(handler) => Resolver::Single(Arc::clone(handler)),
            Resolver::Named(handlers) => Resolver::Named(Arc::clone(handlers)),
        }
    }
}

impl<K: HookKind> fmt::Debug for Resolver<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Single(_) => f.write_str("Resolver::Single"),
            Resolver::Named(handlers) => f.debug_tuple("Resolver::Named").field(handlers).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
