use anyhow::Context as _;
use graphops_core::{GetElements, MultiInput, OperationType, Payload};

use super::consumed;
use crate::context::Context;
use crate::handler::OperationHandler;
use crate::store::Store;

/// Option capping the number of returned elements.
pub const LIMIT_OPTION: &str = "graphops.getElements.limit";

/// Looks up the elements attached to each seed in the store's backend.
///
/// An operation without input returns no elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetElementsHandler;

impl OperationHandler for GetElementsHandler {
    type Operation = GetElements;

    fn do_operation(
        &self,
        operation: &GetElements,
        context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload> {
        let Some(input) = operation.input() else {
            return Ok(Payload::Elements(Vec::new()));
        };
        let seeds = input
            .drain()
            .ok_or_else(|| consumed(GetElements::TYPE_TAG))?;

        let mut elements =
            store
                .backend()
                .get_elements(&seeds, operation.view(), operation.direction())?;

        if let Some(limit) = context.resolve_option(operation, LIMIT_OPTION) {
            let limit: usize = limit
                .parse()
                .with_context(|| format!("invalid {LIMIT_OPTION} option: {limit:?}"))?;
            elements.truncate(limit);
        }
        Ok(Payload::Elements(elements))
    }
}
