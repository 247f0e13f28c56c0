//! Group filters and property projections applied to lookup results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Element;

/// Per-group result configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewElementDefinition {
    /// Properties to keep. `None` keeps every property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
}

impl ViewElementDefinition {
    #[must_use]
    pub fn with_properties<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: Some(properties.into_iter().map(Into::into).collect()),
        }
    }
}

/// Selects which entity and edge groups a lookup returns.
///
/// An empty view accepts every element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entities: BTreeMap<String, ViewElementDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub edges: BTreeMap<String, ViewElementDefinition>,
}

impl View {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entity(self, group: impl Into<String>) -> Self {
        self.entity_with(group, ViewElementDefinition::default())
    }

    #[must_use]
    pub fn entity_with(mut self, group: impl Into<String>, def: ViewElementDefinition) -> Self {
        self.entities.insert(group.into(), def);
        self
    }

    #[must_use]
    pub fn edge(self, group: impl Into<String>) -> Self {
        self.edge_with(group, ViewElementDefinition::default())
    }

    #[must_use]
    pub fn edge_with(mut self, group: impl Into<String>, def: ViewElementDefinition) -> Self {
        self.edges.insert(group.into(), def);
        self
    }

    #[must_use]
    pub fn has_entities(&self) -> bool {
        !self.entities.is_empty()
    }

    #[must_use]
    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.edges.is_empty()
    }

    fn definition(&self, element: &Element) -> Option<&ViewElementDefinition> {
        match element {
            Element::Entity(_) => self.entities.get(element.group()),
            Element::Edge(_) => self.edges.get(element.group()),
        }
    }

    /// Whether `element` belongs to a group selected by this view.
    #[must_use]
    pub fn accepts(&self, element: &Element) -> bool {
        self.is_empty() || self.definition(element).is_some()
    }

    /// Drops properties not listed for the element's group.
    pub fn project(&self, element: &mut Element) {
        let Some(keep) = self.definition(element).and_then(|d| d.properties.clone()) else {
            return;
        };
        element
            .properties_mut()
            .retain(|name, _| keep.iter().any(|k| k == name));
    }
}
