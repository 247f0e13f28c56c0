use graphops_core::{Operation, OperationChain, OperationError, Payload};
use tracing::debug;

use crate::context::Context;
use crate::handler::OperationHandler;
use crate::store::Store;

/// Executes chain stages in order, feeding each result to the next stage.
///
/// The first stage runs as given. Every later stage runs on a shallow copy
/// whose input is replaced by the previous result, so the chain itself is
/// never mutated. The first failing stage stops the chain; its failure is
/// wrapped in a stage layer naming the index, whatever its kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationChainHandler;

fn run_stage(
    index: usize,
    stage: &dyn Operation,
    previous: Option<Payload>,
    context: &Context,
    store: &Store,
) -> Result<Payload, OperationError> {
    debug!(stage = index, operation = stage.type_tag(), "executing chain stage");
    let Some(input) = previous else {
        return store.execute(stage, context);
    };
    let mut next = stage.shallow_clone_boxed()?;
    next.set_input(input).map_err(|mismatch| OperationError::Execution {
        operation: stage.type_tag(),
        message: mismatch.to_string(),
        source: Some(Box::new(mismatch)),
    })?;
    store.execute(next.as_ref(), context)
}

impl OperationHandler for OperationChainHandler {
    type Operation = OperationChain;

    fn do_operation(
        &self,
        operation: &OperationChain,
        context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload> {
        let mut previous = None;
        for (index, stage) in operation.operations().iter().enumerate() {
            let result = run_stage(index, stage.as_ref(), previous.take(), context, store)
                .map_err(|err| err.in_stage(index, stage.type_name()))?;
            previous = Some(result);
        }
        Ok(previous.unwrap_or(Payload::Void))
    }
}
