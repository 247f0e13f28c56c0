use std::collections::HashSet;

use graphops_core::{Element, EntitySeed, MultiInput, OperationType, Payload, ToEntitySeeds, Value};

use super::consumed;
use crate::context::Context;
use crate::handler::OperationHandler;
use crate::store::Store;

/// Emits one seed per distinct vertex, in first-seen order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToEntitySeedsHandler;

impl OperationHandler for ToEntitySeedsHandler {
    type Operation = ToEntitySeeds;

    fn do_operation(
        &self,
        operation: &ToEntitySeeds,
        _context: &Context,
        _store: &Store,
    ) -> anyhow::Result<Payload> {
        let Some(input) = operation.input() else {
            return Ok(Payload::EntitySeeds(Vec::new()));
        };
        let elements = input
            .drain()
            .ok_or_else(|| consumed(ToEntitySeeds::TYPE_TAG))?;

        let mut seen = HashSet::new();
        let mut seeds = Vec::new();
        let mut push = |vertex: Value| {
            if seen.insert(vertex.canonical_key()) {
                seeds.push(EntitySeed::new(vertex));
            }
        };
        for element in elements {
            match element {
                Element::Entity(entity) => push(entity.vertex),
                Element::Edge(edge) => {
                    push(edge.source);
                    push(edge.destination);
                }
            }
        }
        Ok(Payload::EntitySeeds(seeds))
    }
}

#[cfg(test)]
mod tests {
    use graphops_core::{Edge, Entity};

    use super::*;
    use crate::handlers::fixtures;

    #[test]
    fn collects_distinct_vertices_in_order() {
        let op = ToEntitySeeds::new().with_input([
            Entity::new("person", "a").into(),
            Edge::new("knows", "a", "b").into(),
            Edge::new("knows", "c", "b").into(),
        ]);
        let seeds = fixtures::store()
            .execute(&op, &Context::default())
            .unwrap()
            .into_entity_seeds("test")
            .unwrap();
        assert_eq!(
            seeds,
            [EntitySeed::new("a"), EntitySeed::new("b"), EntitySeed::new("c")]
        );
    }
}
