//! Tabular graph representation handed to external compute engines.

use serde::{Deserialize, Serialize};

use crate::types::{Element, Value};

/// A vertex row. One row is produced per entity, so several rows may share an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameVertex {
    pub id: Value,
    pub group: String,
    /// Filled in by a page-rank computation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_rank: Option<f64>,
}

/// An edge row from `src` to `dst`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEdge {
    pub src: Value,
    pub dst: Value,
    pub group: String,
}

/// Vertices and edges as two tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFrame {
    pub vertices: Vec<FrameVertex>,
    pub edges: Vec<FrameEdge>,
}

impl GraphFrame {
    /// Builds a frame with one vertex row per entity and one edge row per edge.
    ///
    /// Undirected edges produce a row in each direction.
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Self {
        let mut frame = Self::default();
        for element in elements {
            match element {
                Element::Entity(entity) => frame.vertices.push(FrameVertex {
                    id: entity.vertex.clone(),
                    group: entity.group.clone(),
                    page_rank: None,
                }),
                Element::Edge(edge) => {
                    frame.edges.push(FrameEdge {
                        src: edge.source.clone(),
                        dst: edge.destination.clone(),
                        group: edge.group.clone(),
                    });
                    if !edge.directed {
                        frame.edges.push(FrameEdge {
                            src: edge.destination.clone(),
                            dst: edge.source.clone(),
                            group: edge.group.clone(),
                        });
                    }
                }
            }
        }
        frame
    }
}
