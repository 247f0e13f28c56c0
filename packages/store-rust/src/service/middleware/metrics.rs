//! Per-request span plus `metrics` counters and latency histograms.
//!
//! Without an installed recorder the `metrics` macros are no-ops.

use std::task::{Context, Poll};
use std::time::Instant;

use graphops_core::Payload;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::{OperationRequest, ServiceError, ServiceFuture};

/// Counter of finished requests, labelled by `operation` and `outcome`.
pub const OPERATIONS_TOTAL: &str = "graphops_operations_total";
/// Histogram of request latency in seconds, labelled by `operation`.
pub const OPERATION_DURATION_SECONDS: &str = "graphops_operation_duration_seconds";

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

fn outcome(result: &Result<Payload, ServiceError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(ServiceError::Operation(_)) => "error",
        Err(ServiceError::Timeout { .. }) => "timeout",
        Err(ServiceError::Overloaded) => "overloaded",
        Err(ServiceError::Join(_)) => "panic",
    }
}

impl<S> Service<OperationRequest> for MetricsService<S>
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
        let operation = request.type_tag();
        let span = info_span!(
            "operation",
            operation,
            job_id = %request.context.job_id(),
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(request);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();
                let outcome = outcome(&result);

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                let span = tracing::Span::current();
                span.record("duration_ms", duration_ms);
                span.record("outcome", outcome);
                tracing::info!(operation, duration_ms, outcome, "operation complete");

                metrics::counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
                    .increment(1);
                metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
                    .record(elapsed.as_secs_f64());

                result
            }
            .instrument(span),
        )
    }
}
