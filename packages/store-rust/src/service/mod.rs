//! Async front door to a [`Store`]: a `tower::Service` over operation
//! requests, plus the middleware that wraps it.
//!
//! - [`DispatchService`]: runs the synchronous dispatcher on the blocking pool
//! - [`middleware`]: load shedding, timeouts and metrics around it

pub mod middleware;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use graphops_core::{Operation, OperationError, Payload};
use tower::Service;

use crate::context::Context;
use crate::store::Store;

pub use middleware::build_operation_pipeline;

// ---------------------------------------------------------------------------
// OperationRequest
// ---------------------------------------------------------------------------

/// An operation to execute together with its per-call context.
#[derive(Debug)]
pub struct OperationRequest {
    pub operation: Box<dyn Operation>,
    pub context: Context,
    /// Overrides the store's default timeout for this request.
    pub timeout_ms: Option<u64>,
}

impl OperationRequest {
    #[must_use]
    pub fn new(operation: impl Operation) -> Self {
        Self::from_boxed(Box::new(operation))
    }

    #[must_use]
    pub fn from_boxed(operation: Box<dyn Operation>) -> Self {
        Self {
            operation,
            context: Context::default(),
            timeout_ms: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn type_tag(&self) -> &'static str {
        self.operation.type_tag()
    }
}

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Failure of a request at the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("store overloaded, request rejected")]
    Overloaded,

    #[error("dispatch task failed: {0}")]
    Join(String),
}

/// Boxed future returned by every service in the pipeline.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Payload, ServiceError>> + Send>>;

// ---------------------------------------------------------------------------
// DispatchService
// ---------------------------------------------------------------------------

/// Innermost service: hands each request to [`Store::execute`].
///
/// Dispatch blocks, so it runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct DispatchService {
    store: Arc<Store>,
}

impl DispatchService {
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

impl Service<OperationRequest> for DispatchService {
    type Response = Payload;
    type Error = ServiceError;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: OperationRequest) -> Self::Future {
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            let joined = tokio::task::spawn_blocking(move || {
                store.execute(request.operation.as_ref(), &request.context)
            })
            .await;
            match joined {
                Ok(result) => result.map_err(ServiceError::from),
                Err(error) => Err(ServiceError::Join(error.to_string())),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use graphops_core::{EntitySeed, GetElements, MultiInput, OperationChain, ToEntitySeeds};
    use tower::ServiceExt;

    use super::*;
    use crate::handlers::fixtures;

    fn service() -> DispatchService {
        DispatchService::new(Arc::new(fixtures::store()))
    }

    #[tokio::test]
    async fn executes_on_the_store() {
        let request =
            OperationRequest::new(GetElements::new().with_input([EntitySeed::new("c")]));
        let elements = service()
            .oneshot(request)
            .await
            .unwrap()
            .into_elements("test")
            .unwrap();
        // entity c and edge b -> c
        assert_eq!(elements.len(), 2);
    }

    #[tokio::test]
    async fn operation_errors_pass_through() {
        let request = OperationRequest::new(OperationChain::new());
        let err = service().oneshot(request).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Operation(OperationError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn boxed_requests_keep_their_tag() {
        let request = OperationRequest::from_boxed(Box::new(ToEntitySeeds::new()))
            .with_timeout_ms(10);
        assert_eq!(request.type_tag(), "graphops.operation.ToEntitySeeds");
        assert_eq!(request.timeout_ms, Some(10));
    }
}
