//! Entity identifiers and their allocator

use serde::{Serialize, Deserialize};
use std::fmt;

use super::EcsError;

/// Entity identifier
///
/// The index addresses component storage; the generation distinguishes
/// successive entities that reuse the same index, so a handle kept past
/// `destroy_entity` never aliases a newer entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Storage slot of this entity
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// How many times the slot was recycled before this entity got it
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity identifiers and recycles freed slots
#[derive(Debug)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free: Vec<u32>,
    live: usize,
    limit: u32,
}

impl EntityAllocator {
    /// Largest slot count; `u32::MAX` is reserved as the vacant marker
    pub(crate) const MAX_ENTITIES: u32 = u32::MAX - 1;

    pub(crate) fn with_capacity(capacity: usize, limit: u32) -> Self {
        Self {
            generations: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
            limit: limit.min(Self::MAX_ENTITIES),
        }
    }

    pub(crate) fn allocate(&mut self) -> Result<Entity, EcsError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let next = self.generations.len() as u32;
                if next >= self.limit {
                    return Err(EcsError::ResourceExhausted);
                }
                self.generations.push(0);
                self.alive.push(false);
                next
            }
        };

        let slot = index as usize;
        self.alive[slot] = true;
        self.live += 1;
        Ok(Entity::new(index, self.generations[slot]))
    }

    /// Release a live entity; returns false for stale or unknown handles
    pub(crate) fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = entity.index as usize;
        self.alive[slot] = false;
        self.live -= 1;

        // A slot that cannot take another generation is retired for good
        if let Some(next) = self.generations[slot].checked_add(1) {
            self.generations[slot] = next;
            self.free.push(entity.index);
        }
        true
    }

    pub(crate) fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        self.alive.get(slot).copied().unwrap_or(false)
            && self.generations[slot] == entity.generation
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live
    }

    #[cfg(test)]
    pub(crate) fn force_generation(&mut self, index: u32, generation: u32) {
        self.generations[index as usize] = generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slots_come_back_with_new_generation() {
        let mut allocator = EntityAllocator::with_capacity(4, EntityAllocator::MAX_ENTITIES);
        let first = allocator.allocate().unwrap();
        assert!(allocator.free(first));

        let second = allocator.allocate().unwrap();
        assert_eq!(second.index(), first.index());
        assert_eq!(second.generation(), first.generation() + 1);
        assert!(!allocator.is_alive(first));
        assert!(allocator.is_alive(second));
    }

    #[test]
    fn double_free_is_rejected() {
        let mut allocator = EntityAllocator::with_capacity(0, 8);
        let entity = allocator.allocate().unwrap();
        assert!(allocator.free(entity));
        assert!(!allocator.free(entity));
        assert_eq!(allocator.live_count(), 0);
    }

    #[test]
    fn limit_reports_exhaustion() {
        let mut allocator = EntityAllocator::with_capacity(0, 2);
        allocator.allocate().unwrap();
        allocator.allocate().unwrap();
        assert_eq!(allocator.allocate(), Err(EcsError::ResourceExhausted));
    }

    #[test]
    fn saturated_generation_retires_slot() {
        let mut allocator = EntityAllocator::with_capacity(0, 1);
        let entity = allocator.allocate().unwrap();
        allocator.force_generation(entity.index(), u32::MAX);
        let saturated = Entity::new(entity.index(), u32::MAX);

        assert!(allocator.free(saturated));
        assert_eq!(allocator.allocate(), Err(EcsError::ResourceExhausted));
    }

    #[test]
    fn display_shows_index_and_generation() {
        assert_eq!(Entity::new(3, 1).to_string(), "3v1");
    }
}
