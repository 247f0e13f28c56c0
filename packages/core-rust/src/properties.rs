//! Named store property sets.
//!
//! Properties are flat `key=value` pairs with an optional id. A child set can be
//! layered over a parent set so that child keys override parent keys.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors from loading a properties file.
#[derive(Debug, thiserror::Error)]
pub enum PropertiesError {
    #[error("failed to read properties file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed property on line {line}: expected key=value")]
    Malformed { line: usize },
}

/// A flat, optionally identified property set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl StoreProperties {
    /// Key that sets the id when parsing properties text.
    pub const ID_KEY: &'static str = "graphops.store.properties.id";

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns `parent`'s properties overridden by this set's properties.
    ///
    /// The id of `self` wins; the parent's id is used only when `self` has none.
    #[must_use]
    pub fn merged_over(&self, parent: &StoreProperties) -> StoreProperties {
        let mut properties = parent.properties.clone();
        properties.extend(self.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        StoreProperties {
            id: self.id.clone().or_else(|| parent.id.clone()),
            properties,
        }
    }

    /// Parses `key=value` lines. Blank lines and lines starting with `#` or `!`
    /// are skipped; [`Self::ID_KEY`] sets the id.
    pub fn parse(text: &str) -> Result<Self, PropertiesError> {
        let mut result = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(PropertiesError::Malformed { line: index + 1 })?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                return Err(PropertiesError::Malformed { line: index + 1 });
            }
            if key == Self::ID_KEY {
                result.id = Some(value.to_string());
            } else {
                result.set(key, value);
            }
        }
        Ok(result)
    }

    /// Reads and parses a properties file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PropertiesError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}
