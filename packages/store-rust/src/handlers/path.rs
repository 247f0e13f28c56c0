use std::collections::HashSet;

use graphops_core::{
    Edge, Element, EntitySeed, GetElements, MultiInput, Operation, OperationType, Path, Payload,
    Value,
};
use tracing::trace;

use super::consumed;
use crate::context::Context;
use crate::handler::OperationHandler;
use crate::store::Store;

/// Walks every hop of a [`Path`] once per seed.
///
/// Each hop is dispatched as its own `GetElements`, seeded with the vertices
/// reached by the previous hop and carrying the path's options underneath
/// its own. Edges are collected per seed in the order they were walked.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathHandler;

/// The end of `edge` not in `frontier`; the destination when both ends are.
fn far_end<'a>(edge: &'a Edge, frontier: &HashSet<String>) -> &'a Value {
    if frontier.contains(&edge.source.canonical_key()) {
        &edge.destination
    } else {
        &edge.source
    }
}

impl PathHandler {
    fn walk(
        seed: EntitySeed,
        hops: &[GetElements],
        path: &Path,
        context: &Context,
        store: &Store,
    ) -> anyhow::Result<Vec<Edge>> {
        let mut frontier = vec![seed];
        let mut walked = Vec::new();
        for (index, hop) in hops.iter().enumerate() {
            if frontier.is_empty() {
                break;
            }
            let keys: HashSet<String> = frontier.iter().map(|s| s.vertex.canonical_key()).collect();

            let mut step = hop.shallow_clone()?.with_input(std::mem::take(&mut frontier));
            for (key, value) in path.options() {
                step.options_mut()
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
            let elements = store
                .execute(&step, context)?
                .into_elements(GetElements::TYPE_TAG)?;

            let mut reached = HashSet::new();
            for element in elements {
                let Element::Edge(edge) = element else {
                    continue;
                };
                let next = far_end(&edge, &keys);
                if reached.insert(next.canonical_key()) {
                    frontier.push(EntitySeed::new(next.clone()));
                }
                walked.push(edge);
            }
            trace!(hop = index, frontier = frontier.len(), "path hop complete");
        }
        Ok(walked)
    }
}

impl OperationHandler for PathHandler {
    type Operation = Path;

    fn do_operation(
        &self,
        operation: &Path,
        context: &Context,
        store: &Store,
    ) -> anyhow::Result<Payload> {
        let Some(input) = operation.input() else {
            return Ok(Payload::NestedEdges(Vec::new()));
        };
        let seeds = input.drain().ok_or_else(|| consumed(Path::TYPE_TAG))?;
        let hops = operation.operations().unwrap_or_default();

        let paths = seeds
            .into_iter()
            .map(|seed| Self::walk(seed, hops, operation, context, store))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Payload::NestedEdges(paths))
    }
}
