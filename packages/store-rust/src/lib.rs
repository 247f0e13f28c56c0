//! `graphops` store: handler registry, dispatch, built-in handlers, and the
//! tower service pipeline in front of them.

pub mod backend;
pub mod compute;
pub mod config;
pub mod context;
pub mod handler;
pub mod handlers;
pub mod library;
pub mod observability;
pub mod registry;
pub mod service;
pub mod store;

pub use backend::{ElementBackend, InMemoryGraph};
pub use compute::{GraphComputeEngine, InMemoryComputeEngine, PageRankLimit, PageRankParams};
pub use config::{ConfigError, StoreConfig};
pub use context::Context;
pub use handler::{Handler, OperationHandler, TypedHandler};
pub use library::{GraphLibrary, InMemoryGraphLibrary, LibraryError};
pub use observability::{init_tracing, LogFormat};
pub use registry::HandlerRegistry;
pub use service::{build_operation_pipeline, DispatchService, OperationRequest, ServiceError};
pub use store::{Store, StoreBuilder};
