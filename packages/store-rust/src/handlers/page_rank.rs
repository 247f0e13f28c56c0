use std::sync::Arc;

use graphops_core::{PageRank, Payload};

use crate::compute::PageRankParams;
use crate::context::Context;
use crate::handler::OperationHandler;
use crate::store::Store;

/// Delegates page-rank computation to the store's compute engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRankHandler;

impl OperationHandler for PageRankHandler {
    type Operation = PageRank;

    fn do_operation(
        &self,
        operation: &PageRank,
        _context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload> {
        let frame = operation
            .input()
            .ok_or_else(|| anyhow::anyhow!("Input must not be null."))?;
        let params = PageRankParams::from_operation(operation)
            .ok_or_else(|| anyhow::anyhow!("exactly one of maxIterations or tolerance must be set"))?;
        let ranked = store.compute_engine().page_rank(frame, &params)?;
        Ok(Payload::GraphFrame(Arc::new(ranked)))
    }
}
