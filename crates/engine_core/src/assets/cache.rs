//! Path, id and resource bookkeeping
//!
//! The cache is a plain single-threaded map; the loading service wraps it in
//! a mutex and drives the per-id state machine:
//!
//! ```text
//! Unresolved -> Resolving -> Loaded
//!      ^            |
//!      +--(failed)--+
//! ```
//!
//! An id assigned only to carry a load is forgotten again when that load
//! fails, so a failed path leaves no entry. Ids handed to callers through
//! [`ResourceCache::resolve_or_assign_id`] are pinned and survive failures.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Resource, ResourceError, ResourceId, ResourcePath};
use crate::foundation::logging::debug;

/// Load state of one resource id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Known path, nothing loaded; a load may start
    Unresolved,
    /// A load is in flight
    Resolving,
    /// Loaded and immutable
    Loaded,
}

#[derive(Debug)]
enum Slot {
    Unresolved,
    Resolving,
    Loaded(Arc<Resource>),
}

#[derive(Debug)]
struct Entry {
    path: ResourcePath,
    slot: Slot,
    pinned: bool,
}

/// Authoritative path to id to resource map
#[derive(Debug)]
pub struct ResourceCache {
    ids: HashMap<ResourcePath, ResourceId>,
    entries: HashMap<ResourceId, Entry>,
    next_id: u32,
    closed: bool,
}

impl ResourceCache {
    /// Create an empty cache; the first id handed out is 1
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            entries: HashMap::new(),
            next_id: 1,
            closed: false,
        }
    }

    /// Id for `path`, assigning the next free one on first sight
    ///
    /// The id is pinned: it stays assigned even if loading it fails.
    pub fn resolve_or_assign_id(&mut self, path: &ResourcePath) -> Result<ResourceId, ResourceError> {
        let id = self.assign(path)?;
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.pinned = true;
        }
        Ok(id)
    }

    /// Id for `path` to load under
    ///
    /// A newly assigned id is not pinned and [`abandon_load`](Self::abandon_load)
    /// forgets it together with its path.
    pub fn id_for_load(&mut self, path: &ResourcePath) -> Result<ResourceId, ResourceError> {
        self.assign(path)
    }

    fn assign(&mut self, path: &ResourcePath) -> Result<ResourceId, ResourceError> {
        if let Some(&id) = self.ids.get(path) {
            return Ok(id);
        }

        if self.next_id == u32::MAX {
            return Err(ResourceError::IdSpaceExhausted);
        }
        let id = ResourceId::new(self.next_id);
        self.next_id += 1;

        self.ids.insert(path.clone(), id);
        self.entries.insert(
            id,
            Entry {
                path: path.clone(),
                slot: Slot::Unresolved,
                pinned: false,
            },
        );
        debug!("Assigned resource id {} to '{}'", id, path);
        Ok(id)
    }

    /// Id for `path` if it was ever resolved
    pub fn id_of(&self, path: &ResourcePath) -> Option<ResourceId> {
        self.ids.get(path).copied()
    }

    /// Path recorded for `id`
    pub fn path_of(&self, id: ResourceId) -> Option<&ResourcePath> {
        self.entries.get(&id).map(|entry| &entry.path)
    }

    /// Loaded resource for `id`
    pub fn get_loaded(&self, id: ResourceId) -> Option<&Arc<Resource>> {
        match self.entries.get(&id).map(|entry| &entry.slot) {
            Some(Slot::Loaded(resource)) => Some(resource),
            _ => None,
        }
    }

    /// Current state of `id`, or `None` for ids this cache never assigned
    pub fn state(&self, id: ResourceId) -> Option<ResourceState> {
        self.entries.get(&id).map(|entry| match entry.slot {
            Slot::Unresolved => ResourceState::Unresolved,
            Slot::Resolving => ResourceState::Resolving,
            Slot::Loaded(_) => ResourceState::Loaded,
        })
    }

    /// Claim `id` for loading; true only on the `Unresolved -> Resolving` edge
    pub fn begin_load(&mut self, id: ResourceId) -> bool {
        if self.closed {
            return false;
        }
        match self.entries.get_mut(&id) {
            Some(entry) if matches!(entry.slot, Slot::Unresolved) => {
                entry.slot = Slot::Resolving;
                true
            }
            _ => false,
        }
    }

    /// Undo a failed load so it can be retried
    ///
    /// A pinned id returns to `Unresolved`. An unpinned one is removed along
    /// with its path, and `true` is returned.
    pub fn abandon_load(&mut self, id: ResourceId) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        if !matches!(entry.slot, Slot::Resolving) {
            return false;
        }
        if entry.pinned {
            entry.slot = Slot::Unresolved;
            return false;
        }

        let path = entry.path.clone();
        self.entries.remove(&id);
        self.ids.remove(&path);
        debug!("Forgot resource id {} for '{}' after a failed load", id, path);
        true
    }

    /// Record the loaded resource for `id`
    ///
    /// Inserting over an already loaded id means two loads ran for one id,
    /// which the loading service's per-id serialization rules out. Debug
    /// builds assert; release builds return [`ResourceError::DuplicateInsert`].
    pub fn insert(&mut self, id: ResourceId, resource: Arc<Resource>) -> Result<(), ResourceError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(ResourceError::UnknownResourceId(id))?;

        if matches!(entry.slot, Slot::Loaded(_)) {
            debug_assert!(false, "resource {} already loaded", id);
            return Err(ResourceError::DuplicateInsert(id));
        }
        entry.slot = Slot::Loaded(resource);
        Ok(())
    }

    /// Whether `path` has a loaded resource
    pub fn is_loaded_path(&self, path: &ResourcePath) -> bool {
        self.id_of(path)
            .is_some_and(|id| self.get_loaded(id).is_some())
    }

    /// Number of ids handed out
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no path was ever resolved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of loaded resources
    pub fn loaded_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry.slot, Slot::Loaded(_)))
            .count()
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the cache and move every loaded resource out, in ascending id order
    ///
    /// Ids and paths stay assigned. A closed cache never loads again, so no
    /// id can come back with a second resource.
    pub fn close(&mut self) -> Vec<(ResourceId, ResourcePath, Arc<Resource>)> {
        self.closed = true;
        let mut loaded = Vec::new();
        for (id, entry) in &mut self.entries {
            if matches!(entry.slot, Slot::Loaded(_)) {
                if let Slot::Loaded(resource) = std::mem::replace(&mut entry.slot, Slot::Unresolved) {
                    loaded.push((*id, entry.path.clone(), resource));
                }
            }
        }
        loaded.sort_by_key(|(id, _, _)| *id);
        loaded
    }

    #[cfg(test)]
    pub(crate) fn set_next_id(&mut self, next_id: u32) {
        self.next_id = next_id;
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}
