//! Runtime values flowing out of handlers and between chain stages.

use std::sync::Arc;

use crate::frame::GraphFrame;
use crate::type_ref::TypeRef;
use crate::types::{Edge, Element, EntitySeed};

/// Result of executing an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Void,
    Elements(Vec<Element>),
    EntitySeeds(Vec<EntitySeed>),
    /// One edge sequence per seed, in seed order.
    NestedEdges(Vec<Vec<Edge>>),
    GraphFrame(Arc<GraphFrame>),
}

/// A payload was offered to an operation that expects a different shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} expects input {expected} but was given {found}")]
pub struct InputMismatch {
    pub operation: &'static str,
    pub expected: TypeRef,
    pub found: TypeRef,
}

impl Payload {
    /// Descriptor of the value actually held.
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        match self {
            Self::Void => TypeRef::Void,
            Self::Elements(_) => TypeRef::Elements,
            Self::EntitySeeds(_) => TypeRef::EntitySeeds,
            Self::NestedEdges(_) => TypeRef::NestedEdges,
            Self::GraphFrame(_) => TypeRef::GraphFrame,
        }
    }

    fn mismatch(&self, operation: &'static str, expected: TypeRef) -> InputMismatch {
        InputMismatch {
            operation,
            expected,
            found: self.type_ref(),
        }
    }

    pub fn into_elements(self, operation: &'static str) -> Result<Vec<Element>, InputMismatch> {
        match self {
            Self::Elements(elements) => Ok(elements),
            other => Err(other.mismatch(operation, TypeRef::Elements)),
        }
    }

    pub fn into_entity_seeds(
        self,
        operation: &'static str,
    ) -> Result<Vec<EntitySeed>, InputMismatch> {
        match self {
            Self::EntitySeeds(seeds) => Ok(seeds),
            other => Err(other.mismatch(operation, TypeRef::EntitySeeds)),
        }
    }

    pub fn into_nested_edges(
        self,
        operation: &'static str,
    ) -> Result<Vec<Vec<Edge>>, InputMismatch> {
        match self {
            Self::NestedEdges(paths) => Ok(paths),
            other => Err(other.mismatch(operation, TypeRef::NestedEdges)),
        }
    }

    pub fn into_graph_frame(
        self,
        operation: &'static str,
    ) -> Result<Arc<GraphFrame>, InputMismatch> {
        match self {
            Self::GraphFrame(frame) => Ok(frame),
            other => Err(other.mismatch(operation, TypeRef::GraphFrame)),
        }
    }

    /// Accepts only `Void`.
    pub fn into_void(self, operation: &'static str) -> Result<(), InputMismatch> {
        match self {
            Self::Void => Ok(()),
            other => Err(other.mismatch(operation, TypeRef::Void)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entity;

    #[test]
    fn type_ref_matches_variant() {
        assert_eq!(Payload::Void.type_ref(), TypeRef::Void);
        assert_eq!(Payload::NestedEdges(vec![]).type_ref(), TypeRef::NestedEdges);
    }

    #[test]
    fn conversion_reports_mismatch() {
        let err = Payload::Elements(vec![]).into_entity_seeds("x.Path").unwrap_err();
        assert_eq!(err.expected, TypeRef::EntitySeeds);
        assert_eq!(err.found, TypeRef::Elements);
        assert_eq!(
            err.to_string(),
            "x.Path expects input Iterable<EntitySeed> but was given Iterable<Element>"
        );
    }

    #[test]
    fn graph_frame_accepts_only_frames() {
        let err = Payload::Elements(vec![Entity::new("person", "a").into()])
            .into_graph_frame("x.PageRank")
            .unwrap_err();
        assert_eq!(err.expected, TypeRef::GraphFrame);
        assert!(!TypeRef::Elements.is_assignable_to(TypeRef::GraphFrame));

        let frame = Arc::new(GraphFrame::default());
        let converted = Payload::GraphFrame(Arc::clone(&frame))
            .into_graph_frame("x.PageRank")
            .unwrap();
        assert!(Arc::ptr_eq(&converted, &frame));
    }
}
