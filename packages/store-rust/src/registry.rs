use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::handler::{Handler, OperationHandler, TypedHandler};
use graphops_core::OperationType;

// ---------------------------------------------------------------------------
// HandlerRegistry
// ---------------------------------------------------------------------------

/// Maps operation type tags to handlers.
///
/// Lookups and (re)registration may happen concurrently. At most one handler
/// is bound per tag. When no handler is bound, lookup walks the tag's explicit
/// fallback chain in order; with no chain configured only exact matches
/// resolve.
pub struct HandlerRegistry {
    handlers: DashMap<String, Arc<dyn Handler>>,
    fallbacks: RwLock<HashMap<String, Vec<String>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            fallbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Binds a typed handler to its operation's tag, returning any handler it replaced.
    pub fn register<H: OperationHandler>(&self, handler: H) -> Option<Arc<dyn Handler>> {
        self.register_dyn(
            H::Operation::TYPE_TAG,
            Arc::new(TypedHandler::new(handler)),
        )
    }

    /// Binds an erased handler to `tag`, returning any handler it replaced.
    pub fn register_dyn(
        &self,
        tag: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        let tag = tag.into();
        let previous = self.handlers.insert(tag.clone(), handler);
        if previous.is_some() {
            warn!(operation = %tag, "replaced registered handler");
        }
        previous
    }

    /// Removes the handler bound to `tag`.
    pub fn unregister(&self, tag: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.remove(tag).map(|(_, handler)| handler)
    }

    /// Sets the ordered tags consulted when `tag` has no handler.
    ///
    /// An empty chain removes any existing one.
    pub fn set_fallbacks(&self, tag: impl Into<String>, chain: Vec<String>) {
        let tag = tag.into();
        let mut fallbacks = self.fallbacks.write();
        if chain.is_empty() {
            fallbacks.remove(&tag);
        } else {
            fallbacks.insert(tag, chain);
        }
    }

    #[must_use]
    pub fn fallbacks(&self, tag: &str) -> Vec<String> {
        self.fallbacks.read().get(tag).cloned().unwrap_or_default()
    }

    /// Resolves the handler for `tag`, consulting its fallback chain when no
    /// handler is bound directly.
    #[must_use]
    pub fn lookup(&self, tag: &str) -> Option<Arc<dyn Handler>> {
        if let Some(handler) = self.handlers.get(tag) {
            return Some(Arc::clone(handler.value()));
        }
        let chain = self.fallbacks(tag);
        let resolved = chain.iter().find_map(|fallback| {
            self.handlers
                .get(fallback.as_str())
                .map(|handler| (fallback, Arc::clone(handler.value())))
        });
        match resolved {
            Some((fallback, handler)) => {
                warn!(operation = %tag, fallback = %fallback, "resolved handler via fallback");
                Some(handler)
            }
            None => {
                debug!(operation = %tag, "no handler registered");
                None
            }
        }
    }

    /// Whether a handler is bound directly to `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    /// Tags with a directly bound handler, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        tags.sort_unstable();
        tags
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.registered_types())
            .field("fallbacks", &*self.fallbacks.read())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use graphops_core::{Operation, Payload};

    use super::*;
    use crate::context::Context;
    use crate::store::Store;

    /// Handler counting how often it runs.
    struct CountingHandler {
        calls: Arc<AtomicU32>,
    }

    impl Handler for CountingHandler {
        fn handle(
            &self,
            _operation: &dyn Operation,
            _context: &Context,
            _store: &Store,
        ) -> anyhow::Result<Payload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Payload::Void)
        }
    }

    fn counting() -> (Arc<dyn Handler>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let handler = Arc::new(CountingHandler {
            calls: Arc::clone(&calls),
        });
        (handler, calls)
    }

    #[test]
    fn register_and_lookup_exact_tag() {
        let registry = HandlerRegistry::new();
        let (handler, _) = counting();
        assert!(registry.register_dyn("x.A", handler).is_none());

        assert!(registry.contains("x.A"));
        assert!(registry.lookup("x.A").is_some());
        assert!(registry.lookup("x.B").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reregistration_replaces_and_returns_previous() {
        let registry = HandlerRegistry::new();
        let (first, _) = counting();
        let (second, _) = counting();
        registry.register_dyn("x.A", Arc::clone(&first));
        let previous = registry.register_dyn("x.A", Arc::clone(&second)).unwrap();

        assert!(Arc::ptr_eq(&previous, &first));
        assert!(Arc::ptr_eq(&registry.lookup("x.A").unwrap(), &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes_binding() {
        let registry = HandlerRegistry::new();
        let (handler, _) = counting();
        registry.register_dyn("x.A", handler);
        assert!(registry.unregister("x.A").is_some());
        assert!(registry.is_empty());
        assert!(registry.lookup("x.A").is_none());
    }

    #[test]
    fn no_fallback_without_configured_chain() {
        let registry = HandlerRegistry::new();
        let (handler, _) = counting();
        registry.register_dyn("x.Base", handler);
        assert!(registry.lookup("x.Derived").is_none());
    }

    #[test]
    fn fallback_chain_is_walked_in_order() {
        let registry = HandlerRegistry::new();
        let (base, _) = counting();
        let (root, _) = counting();
        registry.register_dyn("x.Base", Arc::clone(&base));
        registry.register_dyn("x.Root", Arc::clone(&root));
        registry.set_fallbacks(
            "x.Derived",
            vec!["x.Missing".into(), "x.Base".into(), "x.Root".into()],
        );

        assert!(Arc::ptr_eq(&registry.lookup("x.Derived").unwrap(), &base));

        registry.unregister("x.Base");
        assert!(Arc::ptr_eq(&registry.lookup("x.Derived").unwrap(), &root));
    }

    #[test]
    fn exact_match_wins_over_fallback() {
        let registry = HandlerRegistry::new();
        let (exact, _) = counting();
        let (base, _) = counting();
        registry.register_dyn("x.Derived", Arc::clone(&exact));
        registry.register_dyn("x.Base", base);
        registry.set_fallbacks("x.Derived", vec!["x.Base".into()]);
        assert!(Arc::ptr_eq(&registry.lookup("x.Derived").unwrap(), &exact));
    }

    #[test]
    fn empty_chain_clears_fallbacks() {
        let registry = HandlerRegistry::new();
        registry.set_fallbacks("x.Derived", vec!["x.Base".into()]);
        registry.set_fallbacks("x.Derived", Vec::new());
        assert!(registry.fallbacks("x.Derived").is_empty());
    }

    #[test]
    fn registered_types_are_sorted() {
        let registry = HandlerRegistry::new();
        for tag in ["x.C", "x.A", "x.B"] {
            let (handler, _) = counting();
            registry.register_dyn(tag, handler);
        }
        assert_eq!(registry.registered_types(), ["x.A", "x.B", "x.C"]);
    }

    #[test]
    fn concurrent_lookups_and_registrations() {
        let registry = Arc::new(HandlerRegistry::new());
        let (handler, calls) = counting();
        registry.register_dyn("x.A", Arc::clone(&handler));
        let store = Arc::new(Store::builder().build());

        let threads: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let handler = Arc::clone(&handler);
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    registry.register_dyn(format!("x.T{i}"), Arc::clone(&handler));
                    let ctx = Context::default();
                    let op = graphops_core::ToEntitySeeds::new();
                    for _ in 0..100 {
                        let found = registry.lookup("x.A").unwrap();
                        found.handle(&op, &ctx, &store).unwrap();
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 800);
        assert_eq!(registry.len(), 9);
    }
}
