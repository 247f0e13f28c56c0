//! Tower middleware layers around [`DispatchService`](super::DispatchService).
//!
//! - [`load_shed`]: rejects requests past the concurrency limit
//! - [`timeout`]: per-request deadline, defaulting to the store's
//! - [`metrics`]: spans plus `metrics` counters and histograms
//! - [`pipeline`]: composes the layers over a store

pub mod load_shed;
pub mod metrics;
pub mod pipeline;
pub mod timeout;

pub use load_shed::LoadShedLayer;
pub use metrics::MetricsLayer;
pub use pipeline::build_operation_pipeline;
pub use timeout::TimeoutLayer;
