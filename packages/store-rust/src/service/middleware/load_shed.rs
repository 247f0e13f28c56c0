//! Rejects requests with [`ServiceError::Overloaded`] once
//! `max_concurrent_operations` are in flight.

use std::sync::Arc;
use std::task::{Context, Poll};

use graphops_core::Payload;
use tokio::sync::Semaphore;
use tower::{Layer, Service};

use crate::service::{OperationRequest, ServiceError, ServiceFuture};

/// Limits in-flight requests with a semaphore; excess requests fail fast
/// instead of queueing.
#[derive(Debug, Clone)]
pub struct LoadShedLayer {
    permits: Arc<Semaphore>,
}

impl LoadShedLayer {
    #[must_use]
    pub fn new(max_concurrent: u32) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent as usize)),
        }
    }
}

impl<S> Layer<S> for LoadShedLayer {
    type Service = LoadShedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoadShedService {
            inner,
            permits: Arc::clone(&self.permits),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadShedService<S> {
    inner: S,
    permits: Arc<Semaphore>,
}

impl<S> Service<OperationRequest> for LoadShedService<S>
where
    S: Service<OperationRequest, Response = Payload, Error = ServiceError> + Send,
    S::Future: Send + 'static,
{
    type Response = Payload;
    type Error = ServiceError;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: OperationRequest) -> Self::Future {
        let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            tracing::warn!(operation = request.type_tag(), "rejecting request, store overloaded");
            return Box::pin(async { Err(ServiceError::Overloaded) });
        };

        let fut = self.inner.call(request);
        Box::pin(async move {
            let result = fut.await;
            drop(permit);
            result
        })
    }
}
