//! Per-type component storage
//!
//! Components of one type sit contiguously in a sparse set keyed by entity
//! index. Each dense slot also records the owning entity so a handle from an
//! older generation never reads a newer entity's data.

use std::any::Any;

use super::{Component, Entity};
use crate::foundation::collections::SparseSet;

/// Dense storage for every component of type `T`
#[derive(Debug)]
pub struct ComponentStore<T> {
    entries: SparseSet<(Entity, T)>,
}

impl<T: Component> ComponentStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self { entries: SparseSet::new() }
    }

    /// Create an empty store with room for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: SparseSet::with_capacity(capacity) }
    }

    /// Attach or replace the component for `entity`
    ///
    /// Returns the replaced component, if the entity already had one.
    pub fn insert(&mut self, entity: Entity, component: T) -> Option<T> {
        match self.entries.get_mut(entity.index()) {
            Some((owner, slot)) if *owner == entity => Some(std::mem::replace(slot, component)),
            Some(stale) => {
                *stale = (entity, component);
                None
            }
            None => {
                self.entries.insert(entity.index(), (entity, component));
                None
            }
        }
    }

    /// Component of `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self.entries.get(entity.index()) {
            Some((owner, component)) if *owner == entity => Some(component),
            _ => None,
        }
    }

    /// Mutable component of `entity`
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.entries.get_mut(entity.index()) {
            Some((owner, component)) if *owner == entity => Some(component),
            _ => None,
        }
    }

    /// Whether `entity` has a component in this store
    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Detach and return the component of `entity`
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }
        self.entries.remove(entity.index()).map(|(_, component)| component)
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(entity, component)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entries.values().iter().map(|(entity, component)| (*entity, component))
    }

    /// Iterate `(entity, component)` pairs mutably in storage order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.entries
            .values_mut()
            .iter_mut()
            .map(|(entity, component)| (*entity, component))
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a store so the world can clean up destroyed entities
pub(crate) trait ErasedStore: Send + Sync {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn component_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
