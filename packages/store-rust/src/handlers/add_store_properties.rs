use anyhow::Context as _;
use graphops_core::{AddStoreProperties, Payload};

use crate::context::Context;
use crate::handler::OperationHandler;
use crate::library::resolve_store_properties;
use crate::store::Store;

const ERROR_PREFIX: &str = "Error adding storeProperties to Store.";

/// Adds the operation's properties, merged over any parent, to the store's
/// graph library.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddStorePropertiesHandler;

impl OperationHandler for AddStorePropertiesHandler {
    type Operation = AddStoreProperties;

    fn do_operation(
        &self,
        operation: &AddStoreProperties,
        _context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload> {
        let library = store
            .graph_library()
            .ok_or_else(|| anyhow::anyhow!("{ERROR_PREFIX} the store doesn't have a graphLibrary"))?;
        let child = operation
            .store_properties()
            .ok_or_else(|| anyhow::anyhow!("{ERROR_PREFIX} storeProperties are required"))?;

        let properties =
            resolve_store_properties(child, operation.parent_properties_id(), library.as_ref())
                .with_context(|| format!("{ERROR_PREFIX} storeProperties couldn't be resolved."))?;
        library
            .add_properties(properties)
            .context(ERROR_PREFIX)?;
        Ok(Payload::Void)
    }
}
