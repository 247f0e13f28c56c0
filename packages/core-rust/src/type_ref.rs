//! Type descriptors for operation inputs and outputs.
//!
//! Descriptors are compared before a chain runs to catch stages whose output
//! cannot feed the next stage's input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Describes the shape of an operation's input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// No value.
    Void,
    /// Statically unknown; compatible with anything.
    Any,
    /// `Iterable<Element>`.
    Elements,
    /// `Iterable<EntitySeed>`.
    EntitySeeds,
    /// `Iterable<Iterable<Edge>>`: one edge sequence per seed.
    NestedEdges,
    /// A tabular graph of vertices and edges.
    GraphFrame,
}

impl TypeRef {
    /// Whether a value described by `self` may be supplied where `target` is expected.
    ///
    /// Identical descriptors are compatible; `Any` on either side defers the
    /// check to runtime.
    #[must_use]
    pub fn is_assignable_to(self, target: TypeRef) -> bool {
        self == target || self == Self::Any || target == Self::Any
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Void => "Void",
            Self::Any => "Object",
            Self::Elements => "Iterable<Element>",
            Self::EntitySeeds => "Iterable<EntitySeed>",
            Self::NestedEdges => "Iterable<Iterable<Edge>>",
            Self::GraphFrame => "GraphFrame",
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_descriptors_are_assignable() {
        assert!(TypeRef::Elements.is_assignable_to(TypeRef::Elements));
        assert!(TypeRef::Void.is_assignable_to(TypeRef::Void));
    }

    #[test]
    fn distinct_descriptors_are_not_assignable() {
        assert!(!TypeRef::Elements.is_assignable_to(TypeRef::EntitySeeds));
        assert!(!TypeRef::NestedEdges.is_assignable_to(TypeRef::Elements));
        assert!(!TypeRef::Void.is_assignable_to(TypeRef::GraphFrame));
    }

    #[test]
    fn any_is_a_wildcard_in_both_directions() {
        assert!(TypeRef::Any.is_assignable_to(TypeRef::GraphFrame));
        assert!(TypeRef::Elements.is_assignable_to(TypeRef::Any));
    }

    #[test]
    fn display_uses_iterable_notation() {
        assert_eq!(TypeRef::NestedEdges.to_string(), "Iterable<Iterable<Edge>>");
    }
}
