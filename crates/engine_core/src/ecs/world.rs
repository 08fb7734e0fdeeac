//! ECS World implementation

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

use slotmap::SlotMap;

use super::components::Name;
use super::entity::EntityAllocator;
use super::storage::ErasedStore;
use super::system::SystemSlot;
use super::{
    ActiveEntities, Component, ComponentStore, EcsError, Entity, EntityCursor, SingletonComponent,
    System, SystemKey,
};
use crate::core::config::ANTICIPATED_ENTITY_COUNT;
use crate::foundation::collections::SparseSet;
use crate::foundation::logging::{debug, trace};

/// ECS World containing all entities and components
///
/// Owns one [`ComponentStore`] per component type, the singleton
/// components, the active entity set and the registered systems.
pub struct World {
    entities: EntityAllocator,
    active: SparseSet<Entity>,
    stores: HashMap<TypeId, Box<dyn ErasedStore>>,
    singletons: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    systems: SlotMap<SystemKey, SystemSlot>,
    system_order: Vec<SystemKey>,
    capacity_hint: usize,
    epoch: u64,
}

impl World {
    /// Create a new world sized for the usual entity count
    pub fn new() -> Self {
        Self::with_capacity(ANTICIPATED_ENTITY_COUNT)
    }

    /// Create a world that pre-allocates for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity, EntityAllocator::MAX_ENTITIES)
    }

    /// Create a world that refuses to hold more than `limit` entity slots
    pub fn with_entity_limit(limit: u32) -> Self {
        Self::build((limit as usize).min(ANTICIPATED_ENTITY_COUNT), limit)
    }

    fn build(capacity: usize, limit: u32) -> Self {
        Self {
            entities: EntityAllocator::with_capacity(capacity, limit),
            active: SparseSet::with_capacity(capacity),
            stores: HashMap::new(),
            singletons: HashMap::new(),
            systems: SlotMap::with_key(),
            system_order: Vec::new(),
            capacity_hint: capacity,
            epoch: 0,
        }
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create a new active entity
    pub fn create_entity(&mut self) -> Result<Entity, EcsError> {
        let entity = self.entities.allocate()?;
        self.active.insert(entity.index(), entity);
        self.epoch += 1;
        trace!("Created entity {}", entity);
        Ok(entity)
    }

    /// Create a new active entity carrying a [`Name`]
    pub fn create_named_entity(&mut self, name: impl Into<String>) -> Result<Entity, EcsError> {
        let entity = self.create_entity()?;
        self.add_component(entity, Name::new(name))?;
        Ok(entity)
    }

    /// First live entity whose [`Name`] matches
    pub fn find_entity(&self, name: &str) -> Option<Entity> {
        self.store::<Name>()?
            .iter()
            .find(|(_, candidate)| candidate.as_str() == name)
            .map(|(entity, _)| entity)
    }

    /// Destroy an entity and every component attached to it
    ///
    /// Fails with [`EcsError::InvalidEntity`] when the entity is already
    /// destroyed or was never created by this world.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }

        let mut removed = 0;
        for store in self.stores.values_mut() {
            if store.remove_entity(entity) {
                removed += 1;
            }
        }
        self.active.remove(entity.index());
        self.entities.free(entity);
        self.epoch += 1;

        trace!("Destroyed entity {} ({} components)", entity, removed);
        Ok(())
    }

    /// Take a live entity out of iteration without dropping its components
    pub fn deactivate_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        if self.active.remove(entity.index()).is_some() {
            self.epoch += 1;
        }
        Ok(())
    }

    /// Put a deactivated entity back into iteration
    pub fn activate_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        if self.active.insert(entity.index(), entity).is_none() {
            self.epoch += 1;
        }
        Ok(())
    }

    /// Whether the entity exists, active or not
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Whether the entity takes part in iteration and queries
    pub fn is_active(&self, entity: Entity) -> bool {
        self.active.get(entity.index()) == Some(&entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.live_count()
    }

    /// Number of active entities
    pub fn active_entity_count(&self) -> usize {
        self.active.len()
    }

    /// Lazy, restartable sequence of the active entities
    pub fn active_entities(&self) -> ActiveEntities<'_> {
        ActiveEntities::new(self.active.values())
    }

    /// Cursor over the active entities that survives world mutation
    ///
    /// The cursor fails with [`EcsError::IterationInvalidated`] once the
    /// active set changes.
    pub fn entity_cursor(&self) -> EntityCursor {
        EntityCursor::new(self.epoch)
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn active_slice(&self) -> &[Entity] {
        self.active.values()
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Attach a component, replacing any previous value of the same type
    ///
    /// Returns the replaced value. The entity must be active.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<Option<T>, EcsError> {
        if !self.is_active(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        Ok(self.store_mut_or_insert::<T>()?.insert(entity, component))
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.store::<T>()?.get(entity)
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(entity)
    }

    /// Whether the entity has a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.get_component::<T>(entity).is_some()
    }

    /// Detach a component; the entity must be alive
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<Option<T>, EcsError> {
        if !self.entities.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        Ok(self.store_mut::<T>().and_then(|store| store.remove(entity)))
    }

    /// Storage for component type `T`, if anything was ever attached
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref::<ComponentStore<T>>())
    }

    fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<T>>())
    }

    /// Stores are only ever inserted under their own `TypeId`; a mismatch
    /// asserts in debug builds and is reported as
    /// [`EcsError::StoreTypeMismatch`] in release builds.
    fn store_mut_or_insert<T: Component>(&mut self) -> Result<&mut ComponentStore<T>, EcsError> {
        let capacity = self.capacity_hint;
        let store = self.stores.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!("Created component store for {}", type_name::<T>());
            Box::new(ComponentStore::<T>::with_capacity(capacity))
        });
        let found = store.component_name();
        let store = store.as_any_mut().downcast_mut::<ComponentStore<T>>();
        debug_assert!(store.is_some(), "store for {} holds {}", type_name::<T>(), found);
        store.ok_or(EcsError::StoreTypeMismatch(type_name::<T>()))
    }

    /// Number of components of each stored type, by type name
    pub fn component_counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<_> = self
            .stores
            .values()
            .map(|store| (store.component_name(), store.len()))
            .collect();
        counts.sort_unstable();
        counts
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Active entities owning a `T`, with the component
    pub fn query<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.store::<T>()
            .into_iter()
            .flat_map(|store| store.iter())
            .filter(move |(entity, _)| self.is_active(*entity))
    }

    /// Active entities owning a `T`, with mutable access to the component
    pub fn query_mut<T: Component>(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        let active = &self.active;
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<T>>())
            .into_iter()
            .flat_map(|store| store.iter_mut())
            .filter(move |(entity, _)| active.get(entity.index()) == Some(entity))
    }

    /// Active entities owning both an `A` and a `B`
    pub fn query2<A: Component, B: Component>(&self) -> impl Iterator<Item = (Entity, &A, &B)> + '_ {
        let second = self.store::<B>();
        self.query::<A>().filter_map(move |(entity, a)| {
            let b = second?.get(entity)?;
            Some((entity, a, b))
        })
    }

    // ---------------------------------------------------------------------
    // Singleton components
    // ---------------------------------------------------------------------

    /// Install or replace the singleton of type `T`
    ///
    /// Returns the previous instance, so at most one is ever live.
    pub fn set_singleton_component<T: SingletonComponent>(&mut self, value: T) -> Option<T> {
        self.singletons
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// The singleton of type `T`, created on first access when the type
    /// provides a lazy value
    ///
    /// Fails with [`EcsError::MissingSingleton`] for explicitly initialized
    /// types that were never set.
    pub fn get_singleton_component<T: SingletonComponent>(&mut self) -> Result<&mut T, EcsError> {
        let key = TypeId::of::<T>();
        if !self.singletons.contains_key(&key) {
            let value = T::lazy_init().ok_or(EcsError::MissingSingleton(type_name::<T>()))?;
            debug!("Lazily initialized singleton {}", type_name::<T>());
            self.singletons.insert(key, Box::new(value));
        }
        self.singletons
            .get_mut(&key)
            .and_then(|value| value.downcast_mut::<T>())
            .ok_or(EcsError::MissingSingleton(type_name::<T>()))
    }

    /// The singleton of type `T` if it already exists
    pub fn try_singleton_component<T: SingletonComponent>(&self) -> Option<&T> {
        self.singletons
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Whether a singleton of type `T` is live
    pub fn has_singleton_component<T: SingletonComponent>(&self) -> bool {
        self.singletons.contains_key(&TypeId::of::<T>())
    }

    /// Remove and return the singleton of type `T`
    pub fn remove_singleton_component<T: SingletonComponent>(&mut self) -> Option<T> {
        self.singletons
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    // ---------------------------------------------------------------------
    // Systems
    // ---------------------------------------------------------------------

    /// Register a system; systems run in registration order
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> SystemKey {
        let slot = SystemSlot::new(Box::new(system));
        debug!("Registered system {}", slot.name);
        let key = self.systems.insert(slot);
        self.system_order.push(key);
        key
    }

    /// Unregister a system and hand it back
    ///
    /// A system removing itself from inside its own update gets `None`; it
    /// is dropped once the update returns.
    pub fn remove_system(&mut self, key: SystemKey) -> Option<Box<dyn System>> {
        let slot = self.systems.remove(key)?;
        self.system_order.retain(|candidate| *candidate != key);
        slot.system
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Update the world (run systems)
    pub fn update(&mut self, delta_time: f32) {
        let order = self.system_order.clone();
        for key in order {
            let Some(mut system) = self.systems.get_mut(key).and_then(|slot| slot.system.take()) else {
                continue;
            };

            let start = Instant::now();
            system.update(self, delta_time);
            let elapsed = start.elapsed();

            if let Some(slot) = self.systems.get_mut(key) {
                trace!("System {} took {:?}", slot.name, elapsed);
                slot.system = Some(system);
                slot.last_update = elapsed;
            }
        }
    }

    /// Last update duration of every system, in run order
    pub fn system_update_times(&self) -> Vec<(&str, Duration)> {
        self.system_order
            .iter()
            .filter_map(|key| self.systems.get(*key))
            .map(|slot| (slot.name.as_str(), slot.last_update))
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entity_count())
            .field("active", &self.active_entity_count())
            .field("component_types", &self.stores.len())
            .field("singletons", &self.singletons.len())
            .field("systems", &self.systems.len())
            .finish()
    }
}
