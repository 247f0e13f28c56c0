use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Generic runtime value used for vertices and element properties.
///
/// Supports all JSON-compatible types plus binary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// JSON null.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer (signed 64-bit).
    Int(i64),
    /// JSON floating-point (64-bit IEEE 754).
    Float(f64),
    /// JSON string (UTF-8).
    String(String),
    /// Binary data (not directly representable in JSON).
    Bytes(Vec<u8>),
    /// JSON array (ordered sequence of values).
    Array(Vec<Value>),
    /// JSON object. Uses `BTreeMap` for deterministic serialization order.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Stable string key for this value, used to index vertices.
    ///
    /// Two values produce the same key exactly when they serialize identically,
    /// so `Int(1)` and `Float(1.0)` are distinct vertices.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Returns the value as an `f64` when it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a string slice when it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Named properties attached to an element.
pub type Properties = BTreeMap<String, Value>;

/// A vertex-centric graph element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Group (label) of the entity.
    pub group: String,
    /// The vertex this entity describes.
    pub vertex: Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Entity {
    /// Creates an entity with no properties.
    #[must_use]
    pub fn new(group: impl Into<String>, vertex: impl Into<Value>) -> Self {
        Self {
            group: group.into(),
            vertex: vertex.into(),
            properties: Properties::new(),
        }
    }

    /// Adds a property, returning the entity.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// A connection between two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Group (label) of the edge.
    pub group: String,
    pub source: Value,
    pub destination: Value,
    /// Undirected edges are traversable from either end.
    pub directed: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Edge {
    /// Creates a directed edge with no properties.
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        source: impl Into<Value>,
        destination: impl Into<Value>,
    ) -> Self {
        Self {
            group: group.into(),
            source: source.into(),
            destination: destination.into(),
            directed: true,
            properties: Properties::new(),
        }
    }

    /// Marks the edge as undirected.
    #[must_use]
    pub fn undirected(mut self) -> Self {
        self.directed = false;
        self
    }

    /// Adds a property, returning the edge.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

/// Either kind of graph element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Element {
    Entity(Entity),
    Edge(Edge),
}

impl Element {
    /// Group of the underlying entity or edge.
    #[must_use]
    pub fn group(&self) -> &str {
        match self {
            Self::Entity(entity) => &entity.group,
            Self::Edge(edge) => &edge.group,
        }
    }

    #[must_use]
    pub fn properties(&self) -> &Properties {
        match self {
            Self::Entity(entity) => &entity.properties,
            Self::Edge(edge) => &edge.properties,
        }
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        match self {
            Self::Entity(entity) => &mut entity.properties,
            Self::Edge(edge) => &mut edge.properties,
        }
    }

    /// Returns `true` for entities.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }
}

impl From<Entity> for Element {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<Edge> for Element {
    fn from(edge: Edge) -> Self {
        Self::Edge(edge)
    }
}

/// Seed identifying a single vertex to start a lookup from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySeed {
    pub vertex: Value,
}

impl EntitySeed {
    #[must_use]
    pub fn new(vertex: impl Into<Value>) -> Self {
        Self {
            vertex: vertex.into(),
        }
    }
}

/// Which edges to return relative to a seed vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncludeIncomingOutgoing {
    /// Edges in both directions.
    #[default]
    Either,
    /// Only edges whose destination is the seed.
    Incoming,
    /// Only edges whose source is the seed.
    Outgoing,
}

/// Identity of the caller executing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the caller.
    pub user_id: String,
    /// Authorisations held by the caller.
    #[serde(default)]
    pub auths: BTreeSet<String>,
}

impl User {
    /// Identifier used when no caller identity is supplied.
    pub const UNKNOWN_USER_ID: &'static str = "UNKNOWN";

    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            auths: BTreeSet::new(),
        }
    }

    /// Grants an authorisation, returning the user.
    #[must_use]
    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auths.insert(auth.into());
        self
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new(Self::UNKNOWN_USER_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_distinguishes_numeric_kinds() {
        assert_ne!(Value::Int(1).canonical_key(), Value::Float(1.0).canonical_key());
        assert_eq!(Value::from("a").canonical_key(), Value::from("a").canonical_key());
    }

    #[test]
    fn element_accessors_cover_both_kinds() {
        let mut entity: Element = Entity::new("person", "alice").with_property("age", 31).into();
        let edge: Element = Edge::new("knows", "alice", "bob").into();

        assert_eq!(entity.group(), "person");
        assert_eq!(edge.group(), "knows");
        assert!(entity.is_entity());
        assert!(!edge.is_entity());

        entity.properties_mut().insert("age".to_string(), Value::Int(32));
        assert_eq!(entity.properties().get("age"), Some(&Value::Int(32)));
    }

    #[test]
    fn element_serializes_with_class_tag() {
        let element: Element = Edge::new("knows", "a", "b").undirected().into();
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["class"], "Edge");
        assert_eq!(json["directed"], false);

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn default_user_is_unknown() {
        let user = User::default();
        assert_eq!(user.user_id, User::UNKNOWN_USER_ID);
        assert!(user.auths.is_empty());
    }
}
