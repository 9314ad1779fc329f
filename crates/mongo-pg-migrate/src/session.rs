//! Per-collection identifier maps owned by a migration session.
//!
//! Each migrated record contributes one old -> new identifier mapping. The
//! maps are the shared state of a migration run: the pipeline committing a
//! collection is their single writer, and foreign-key resolution for
//! dependent collections reads them. A collection's map must be fully
//! populated before any dependent collection is migrated; the orchestrator
//! enforces that ordering.

use crate::error::{MigrateError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// One old -> new identifier mapping, in commit order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdEntry {
    /// String form of the original document identifier.
    pub old_id: String,

    /// Identifier assigned by the destination on insert.
    pub new_id: i64,
}

/// Ordered identifier map for one collection, with an index for lookups.
#[derive(Debug, Default)]
pub struct IdMap {
    entries: Vec<IdEntry>,
    index: HashMap<String, i64>,
}

impl IdMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. Duplicate `old_id`s violate the map invariant.
    pub fn insert(&mut self, collection: &str, old_id: String, new_id: i64) -> Result<()> {
        if self.index.contains_key(&old_id) {
            return Err(MigrateError::DuplicateId {
                collection: collection.to_string(),
                old_id,
            });
        }
        self.index.insert(old_id.clone(), new_id);
        self.entries.push(IdEntry { old_id, new_id });
        Ok(())
    }

    /// Look up the destination identifier for an original identifier.
    pub fn resolve(&self, old_id: &str) -> Option<i64> {
        self.index.get(old_id).copied()
    }

    /// Entries in commit order.
    pub fn entries(&self) -> &[IdEntry] {
        &self.entries
    }

    /// Number of mapped identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identifier maps for a whole migration run, keyed by collection name.
#[derive(Debug, Default)]
pub struct MigrationSession {
    maps: HashMap<String, IdMap>,
}

impl MigrationSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier map for a collection, if any records were committed.
    pub fn map(&self, collection: &str) -> Option<&IdMap> {
        self.maps.get(collection)
    }

    /// The identifier map for a collection, created on first use.
    pub fn map_mut(&mut self, collection: &str) -> &mut IdMap {
        self.maps.entry(collection.to_string()).or_default()
    }

    /// Resolve an original identifier against a collection's map.
    pub fn resolve(&self, collection: &str, old_id: &str) -> Option<i64> {
        self.maps.get(collection).and_then(|m| m.resolve(old_id))
    }
}
