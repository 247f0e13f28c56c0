//! Element storage queried by seeded lookups.

use dashmap::DashMap;
use graphops_core::{Edge, Element, EntitySeed, IncludeIncomingOutgoing, Value, View};
use parking_lot::RwLock;

/// Seeded element lookup used by the built-in handlers.
pub trait ElementBackend: Send + Sync + 'static {
    /// Returns the elements attached to each seed, in seed order.
    ///
    /// Entities match on their vertex. Edges match on the end selected by
    /// `direction`; undirected edges match on either end. Elements rejected by
    /// `view` are skipped and the rest are projected through it.
    fn get_elements(
        &self,
        seeds: &[EntitySeed],
        view: Option<&View>,
        direction: IncludeIncomingOutgoing,
    ) -> anyhow::Result<Vec<Element>>;

    /// Stores elements.
    fn add_elements(&self, elements: Vec<Element>) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// InMemoryGraph
// ---------------------------------------------------------------------------

/// In-memory element store indexed by vertex.
///
/// Entities are indexed by their vertex and edges by both endpoints. Element
/// ids are positions in an append-only table.
#[derive(Default)]
pub struct InMemoryGraph {
    elements: RwLock<Vec<Element>>,
    by_vertex: DashMap<String, Vec<usize>>,
}

impl InMemoryGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph holding `elements`.
    #[must_use]
    pub fn with_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let graph = Self::new();
        graph.insert_all(elements);
        graph
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    fn index(&self, vertex: &Value, id: usize) {
        self.by_vertex
            .entry(vertex.canonical_key())
            .or_default()
            .push(id);
    }

    fn insert_all(&self, elements: impl IntoIterator<Item = Element>) {
        let mut table = self.elements.write();
        for element in elements {
            let id = table.len();
            match &element {
                Element::Entity(entity) => self.index(&entity.vertex, id),
                Element::Edge(edge) => {
                    self.index(&edge.source, id);
                    if edge.destination != edge.source {
                        self.index(&edge.destination, id);
                    }
                }
            }
            table.push(element);
        }
    }
}

fn edge_matches(edge: &Edge, seed_key: &str, direction: IncludeIncomingOutgoing) -> bool {
    let from_source = edge.source.canonical_key() == seed_key;
    let from_destination = edge.destination.canonical_key() == seed_key;
    if !edge.directed {
        return from_source || from_destination;
    }
    match direction {
        IncludeIncomingOutgoing::Either => from_source || from_destination,
        IncludeIncomingOutgoing::Outgoing => from_source,
        IncludeIncomingOutgoing::Incoming => from_destination,
    }
}

impl ElementBackend for InMemoryGraph {
    fn get_elements(
        &self,
        seeds: &[EntitySeed],
        view: Option<&View>,
        direction: IncludeIncomingOutgoing,
    ) -> anyhow::Result<Vec<Element>> {
        let table = self.elements.read();
        let mut results = Vec::new();
        for seed in seeds {
            let key = seed.vertex.canonical_key();
            let Some(ids) = self.by_vertex.get(&key) else {
                continue;
            };
            for &id in ids.value() {
                let Some(element) = table.get(id) else {
                    continue;
                };
                if let Element::Edge(edge) = element {
                    if !edge_matches(edge, &key, direction) {
                        continue;
                    }
                }
                if view.is_some_and(|v| !v.accepts(element)) {
                    continue;
                }
                let mut element = element.clone();
                if let Some(view) = view {
                    view.project(&mut element);
                }
                results.push(element);
            }
        }
        Ok(results)
    }

    fn add_elements(&self, elements: Vec<Element>) -> anyhow::Result<()> {
        self.insert_all(elements);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use graphops_core::{Entity, ViewElementDefinition};

    use super::*;

    fn graph() -> InMemoryGraph {
        InMemoryGraph::with_elements([
            Entity::new("person", "a").with_property("age", 30).into(),
            Edge::new("knows", "a", "b").into(),
            Edge::new("knows", "c", "a").into(),
            Edge::new("likes", "a", "d").undirected().into(),
        ])
    }

    fn groups(elements: &[Element]) -> Vec<String> {
        elements.iter().map(|e| e.group().to_string()).collect()
    }

    #[test]
    fn either_direction_returns_everything_at_the_seed() {
        let elements = graph()
            .get_elements(&[EntitySeed::new("a")], None, IncludeIncomingOutgoing::Either)
            .unwrap();
        assert_eq!(groups(&elements), ["person", "knows", "knows", "likes"]);
    }

    #[test]
    fn outgoing_skips_incoming_directed_edges() {
        let elements = graph()
            .get_elements(&[EntitySeed::new("a")], None, IncludeIncomingOutgoing::Outgoing)
            .unwrap();
        assert_eq!(elements.len(), 3);
        assert!(elements.iter().all(|e| match e {
            Element::Edge(edge) => edge.source == Value::from("a") || !edge.directed,
            Element::Entity(_) => true,
        }));
    }

    #[test]
    fn undirected_edges_match_from_either_end() {
        let elements = graph()
            .get_elements(&[EntitySeed::new("d")], None, IncludeIncomingOutgoing::Outgoing)
            .unwrap();
        assert_eq!(groups(&elements), ["likes"]);
    }

    #[test]
    fn view_filters_and_projects() {
        let view = View::new()
            .entity_with("person", ViewElementDefinition::with_properties(Vec::<String>::new()))
            .edge("likes");
        let elements = graph()
            .get_elements(&[EntitySeed::new("a")], Some(&view), IncludeIncomingOutgoing::Either)
            .unwrap();
        assert_eq!(groups(&elements), ["person", "likes"]);
        assert!(elements[0].properties().is_empty());
    }

    #[test]
    fn results_follow_seed_order() {
        let elements = graph()
            .get_elements(
                &[EntitySeed::new("c"), EntitySeed::new("b"), EntitySeed::new("zzz")],
                Some(&View::new().edge("knows")),
                IncludeIncomingOutgoing::Either,
            )
            .unwrap();
        let sources: Vec<_> = elements
            .iter()
            .filter_map(|e| match e {
                Element::Edge(edge) => edge.source.as_str(),
                Element::Entity(_) => None,
            })
            .collect();
        assert_eq!(sources, ["c", "a"]);
    }

    #[test]
    fn self_loops_are_indexed_once() {
        let graph = InMemoryGraph::with_elements([Edge::new("knows", "a", "a").into()]);
        let elements = graph
            .get_elements(&[EntitySeed::new("a")], None, IncludeIncomingOutgoing::Either)
            .unwrap();
        assert_eq!(elements.len(), 1);
    }
}
