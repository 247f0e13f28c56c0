use std::collections::BTreeMap;

use graphops_core::StoreProperties;
use serde::{Deserialize, Serialize};

/// Property key holding the store id.
pub const STORE_ID_KEY: &str = "graphops.store.id";
/// Property key holding the default operation timeout in milliseconds.
pub const TIMEOUT_KEY: &str = "graphops.store.operation.timeout.ms";
/// Property key holding the concurrency limit of the service pipeline.
pub const MAX_CONCURRENT_KEY: &str = "graphops.store.operation.max.concurrent";
/// Prefix of keys declaring a fallback chain: `<prefix><type tag>=<tag>,<tag>`.
pub const FALLBACK_PREFIX: &str = "graphops.store.handler.fallback.";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Store-level configuration for dispatch and the service pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Identifier of this store.
    pub store_id: String,
    /// Timeout applied to requests that do not carry their own.
    pub default_operation_timeout_ms: u64,
    /// Maximum number of in-flight requests before load shedding.
    pub max_concurrent_operations: u32,
    /// Ordered type tags consulted when no handler is bound to a tag.
    pub handler_fallbacks: BTreeMap<String, Vec<String>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_id: "graphops".to_string(),
            default_operation_timeout_ms: 30_000,
            max_concurrent_operations: 1000,
            handler_fallbacks: BTreeMap::new(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

impl StoreConfig {
    /// Reads configuration from store properties, defaulting absent keys.
    ///
    /// The store id comes from [`STORE_ID_KEY`], then the property set's own id.
    pub fn from_properties(properties: &StoreProperties) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(id) = properties.get(STORE_ID_KEY).or_else(|| properties.id()) {
            config.store_id = id.to_string();
        }
        if let Some(value) = properties.get(TIMEOUT_KEY) {
            config.default_operation_timeout_ms = parse_number(TIMEOUT_KEY, value)?;
        }
        if let Some(value) = properties.get(MAX_CONCURRENT_KEY) {
            config.max_concurrent_operations = parse_number(MAX_CONCURRENT_KEY, value)?;
        }
        for (key, value) in &properties.properties {
            let Some(tag) = key.strip_prefix(FALLBACK_PREFIX) else {
                continue;
            };
            let chain = value
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            config.handler_fallbacks.insert(tag.to_string(), chain);
        }
        Ok(config)
    }

    /// Adds a fallback chain for `tag`, returning the config.
    #[must_use]
    pub fn with_fallbacks<I, S>(mut self, tag: impl Into<String>, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.handler_fallbacks
            .insert(tag.into(), chain.into_iter().map(Into::into).collect());
        self
    }
}
