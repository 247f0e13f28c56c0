//! The store: owner of the handler registry and backends, and the dispatcher.

use std::sync::Arc;
use std::time::Instant;

use graphops_core::{Operation, OperationError, Payload, StoreProperties};
use tracing::{debug_span, field};

use crate::backend::{ElementBackend, InMemoryGraph};
use crate::compute::{GraphComputeEngine, InMemoryComputeEngine};
use crate::config::{ConfigError, StoreConfig};
use crate::context::Context;
use crate::handlers::register_default_handlers;
use crate::library::GraphLibrary;
use crate::registry::HandlerRegistry;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Executes operations against a backend through registered handlers.
///
/// Dispatch is synchronous and re-entrant: handlers may execute nested
/// operations through the same store while other calls are in flight.
pub struct Store {
    config: Arc<StoreConfig>,
    properties: StoreProperties,
    registry: HandlerRegistry,
    graph_library: Option<Arc<dyn GraphLibrary>>,
    backend: Arc<dyn ElementBackend>,
    compute: Arc<dyn GraphComputeEngine>,
}

impl Store {
    #[must_use]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &Arc<StoreConfig> {
        &self.config
    }

    #[must_use]
    pub fn properties(&self) -> &StoreProperties {
        &self.properties
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn graph_library(&self) -> Option<&Arc<dyn GraphLibrary>> {
        self.graph_library.as_ref()
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn ElementBackend> {
        &self.backend
    }

    #[must_use]
    pub fn compute_engine(&self) -> &Arc<dyn GraphComputeEngine> {
        &self.compute
    }

    /// Validates `operation`, resolves its handler and runs it.
    ///
    /// # Errors
    ///
    /// - [`OperationError::Validation`] with every violation; no handler runs.
    /// - [`OperationError::NoHandlerRegistered`] when nothing is bound to the tag.
    /// - [`OperationError::Execution`] wrapping a handler failure once. A handler
    ///   failure that already is an `OperationError` is returned unchanged.
    pub fn execute(
        &self,
        operation: &dyn Operation,
        context: &Context,
    ) -> Result<Payload, OperationError> {
        let span = debug_span!(
            "dispatch",
            operation = operation.type_tag(),
            job_id = %context.job_id(),
            user = %context.user().user_id,
            duration_ms = field::Empty,
            outcome = field::Empty,
        );
        let _guard = span.enter();
        let start = Instant::now();

        let result = self.dispatch(operation, context);

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;
        span.record("duration_ms", duration_ms);
        span.record("outcome", if result.is_ok() { "ok" } else { "error" });
        if let Err(err) = &result {
            tracing::debug!(error = %err, "dispatch failed");
        }
        result
    }

    fn dispatch(
        &self,
        operation: &dyn Operation,
        context: &Context,
    ) -> Result<Payload, OperationError> {
        let tag = operation.type_tag();

        let validation = operation.validate();
        if !validation.is_valid() {
            return Err(OperationError::Validation {
                operation: tag,
                errors: validation.into_errors(),
            });
        }

        let handler = self
            .registry
            .lookup(tag)
            .ok_or(OperationError::NoHandlerRegistered { operation: tag })?;

        handler
            .handle(operation, context, self)
            .map_err(|err| OperationError::wrap(tag, err))
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("graph_library", &self.graph_library.is_some())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// StoreBuilder
// ---------------------------------------------------------------------------

/// Assembles a [`Store`]. Unset backends default to the in-memory ones.
pub struct StoreBuilder {
    config: StoreConfig,
    properties: StoreProperties,
    graph_library: Option<Arc<dyn GraphLibrary>>,
    backend: Option<Arc<dyn ElementBackend>>,
    compute: Option<Arc<dyn GraphComputeEngine>>,
    default_handlers: bool,
}

impl StoreBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            properties: StoreProperties::default(),
            graph_library: None,
            backend: None,
            compute: None,
            default_handlers: true,
        }
    }

    /// Uses `properties` and the configuration read from them.
    pub fn from_properties(properties: StoreProperties) -> Result<Self, ConfigError> {
        let config = StoreConfig::from_properties(&properties)?;
        Ok(Self {
            config,
            properties,
            ..Self::new()
        })
    }

    #[must_use]
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn graph_library(mut self, library: Arc<dyn GraphLibrary>) -> Self {
        self.graph_library = Some(library);
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn ElementBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn compute_engine(mut self, compute: Arc<dyn GraphComputeEngine>) -> Self {
        self.compute = Some(compute);
        self
    }

    /// Skips registration of the built-in handlers.
    #[must_use]
    pub fn without_default_handlers(mut self) -> Self {
        self.default_handlers = false;
        self
    }

    #[must_use]
    pub fn build(self) -> Store {
        let registry = HandlerRegistry::new();
        if self.default_handlers {
            register_default_handlers(&registry);
        }
        for (tag, chain) in &self.config.handler_fallbacks {
            registry.set_fallbacks(tag.clone(), chain.clone());
        }
        Store {
            config: Arc::new(self.config),
            properties: self.properties,
            registry,
            graph_library: self.graph_library,
            backend: self
                .backend
                .unwrap_or_else(|| Arc::new(InMemoryGraph::new())),
            compute: self
                .compute
                .unwrap_or_else(|| Arc::new(InMemoryComputeEngine::default())),
        }
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
