//! Action name to handler mapping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use super::handler::RequestHandler;

/// Handlers keyed by action name.
///
/// Built up front and handed to the client, which never mutates it
/// afterwards. Cloning is cheap; handlers are shared.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn RequestHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `action`.
    ///
    /// Registering an action twice keeps the later handler.
    pub fn register(self, action: impl Into<String>, handler: impl RequestHandler + 'static) -> Self {
        self.register_shared(action, Arc::new(handler))
    }

    /// Register a handler that is shared with other actions or owners.
    pub fn register_shared(
        mut self,
        action: impl Into<String>,
        handler: Arc<dyn RequestHandler>,
    ) -> Self {
        let action = action.into();
        if self.handlers.insert(action.clone(), handler).is_some() {
            warn!(action = %action, "replacing previously registered handler");
        }
        self
    }

    pub fn get(&self, action: &str) -> Option<&Arc<dyn RequestHandler>> {
        self.handlers.get(action)
    }

    pub fn contains(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered action names, in no particular order.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Arc<dyn RequestHandler>)> for HandlerRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Arc<dyn RequestHandler>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |registry, (action, handler)| {
                registry.register_shared(action, handler)
            })
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&str> = self.actions().collect();
        actions.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("actions", &actions)
            .finish()
    }
}
