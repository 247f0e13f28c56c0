//! Named store property sets shared between stores.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use graphops_core::StoreProperties;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LibraryError {
    #[error("store properties must have an id to be added to a graph library")]
    MissingId,
    #[error("store properties {id} already exist with different content")]
    Conflict { id: String },
    #[error("parent store properties {id} were not found in the graph library")]
    ParentNotFound { id: String },
}

/// Registry of named [`StoreProperties`].
pub trait GraphLibrary: Send + Sync + 'static {
    /// Adds a property set under its id.
    ///
    /// Re-adding identical content is a no-op; different content under an
    /// existing id is a conflict.
    fn add_properties(&self, properties: StoreProperties) -> Result<(), LibraryError>;

    fn get_properties(&self, id: &str) -> Option<StoreProperties>;

    fn exists(&self, id: &str) -> bool {
        self.get_properties(id).is_some()
    }
}

/// [`GraphLibrary`] held in memory.
#[derive(Debug, Default)]
pub struct InMemoryGraphLibrary {
    entries: DashMap<String, StoreProperties>,
}

impl InMemoryGraphLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphLibrary for InMemoryGraphLibrary {
    fn add_properties(&self, properties: StoreProperties) -> Result<(), LibraryError> {
        let id = properties.id().ok_or(LibraryError::MissingId)?.to_string();
        match self.entries.entry(id) {
            Entry::Occupied(existing) => {
                if existing.get() == &properties {
                    Ok(())
                } else {
                    Err(LibraryError::Conflict {
                        id: existing.key().clone(),
                    })
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(properties);
                Ok(())
            }
        }
    }

    fn get_properties(&self, id: &str) -> Option<StoreProperties> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    fn exists(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

/// Merges the library entry `parent_id` underneath `child`.
///
/// Without a parent id the child is returned unchanged.
pub fn resolve_store_properties(
    child: &StoreProperties,
    parent_id: Option<&str>,
    library: &dyn GraphLibrary,
) -> Result<StoreProperties, LibraryError> {
    let Some(parent_id) = parent_id else {
        return Ok(child.clone());
    };
    let parent = library
        .get_properties(parent_id)
        .ok_or_else(|| LibraryError::ParentNotFound {
            id: parent_id.to_string(),
        })?;
    Ok(child.merged_over(&parent))
}
