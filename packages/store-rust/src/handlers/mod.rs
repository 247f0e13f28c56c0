//! Built-in handlers for the core operation types.

pub mod add_store_properties;
pub mod chain;
pub mod get_elements;
pub mod page_rank;
pub mod path;
pub mod to_entity_seeds;
pub mod transform;

pub use add_store_properties::AddStorePropertiesHandler;
pub use chain::OperationChainHandler;
pub use get_elements::GetElementsHandler;
pub use page_rank::PageRankHandler;
pub use path::PathHandler;
pub use to_entity_seeds::ToEntitySeedsHandler;
pub use transform::TransformHandler;

use crate::registry::HandlerRegistry;

/// Binds every built-in handler to its operation's tag.
pub fn register_default_handlers(registry: &HandlerRegistry) {
    registry.register(GetElementsHandler);
    registry.register(PathHandler);
    registry.register(TransformHandler);
    registry.register(ToEntitySeedsHandler);
    registry.register(PageRankHandler);
    registry.register(AddStorePropertiesHandler);
    registry.register(OperationChainHandler);
}

/// Error raised when a streamed input was already consumed by an earlier run.
pub(crate) fn consumed(operation: &str) -> anyhow::Error {
    anyhow::anyhow!("the streamed input of {operation} has already been consumed")
}
