//! Fails requests that outlive their deadline with [`ServiceError::Timeout`].

use std::task::{Context, Poll};
use std::time::Duration;

use graphops_core::Payload;
use tower::{Layer, Service};

use crate::service::{OperationRequest, ServiceError, ServiceFuture};

/// Applies `request.timeout_ms`, or the layer's default when the request
/// carries none.
///
/// A timed-out request stops being awaited; a dispatch already running on
/// the blocking pool finishes in the background.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    default_timeout_ms: u64,
}

impl TimeoutLayer {
    #[must_use]
    pub fn new(default_timeout_ms: u64) -> Self {
        Self { default_timeout_ms }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            default_timeout_ms: self.default_timeout_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
    default_timeout_ms: u64,
}

impl<S> Service<OperationRequest> for TimeoutService<S>
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
        let timeout_ms = request.timeout_ms.unwrap_or(self.default_timeout_ms);
        let fut = self.inner.call(request);
        Box::pin(async move {
            match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ServiceError::Timeout { timeout_ms }),
            }
        })
    }
}
