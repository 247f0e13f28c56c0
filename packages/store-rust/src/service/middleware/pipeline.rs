use std::sync::Arc;

use graphops_core::Payload;
use tower::{Service, ServiceBuilder};

use super::load_shed::LoadShedLayer;
use super::metrics::MetricsLayer;
use super::timeout::TimeoutLayer;
use crate::service::{DispatchService, OperationRequest, ServiceError};
use crate::store::Store;

/// Wraps a [`DispatchService`] for `store` in the middleware stack, sized
/// from the store's configuration.
///
/// Outermost first: load shedding, timeout, metrics, dispatch.
#[must_use]
pub fn build_operation_pipeline(
    store: Arc<Store>,
) -> impl Service<OperationRequest, Response = Payload, Error = ServiceError> + Clone {
    let config = Arc::clone(store.config());
    ServiceBuilder::new()
        .layer(LoadShedLayer::new(config.max_concurrent_operations))
        .layer(TimeoutLayer::new(config.default_operation_timeout_ms))
        .layer(MetricsLayer)
        .service(DispatchService::new(store))
}
