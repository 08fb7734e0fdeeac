//! Iteration over the active entity set

use super::{EcsError, Entity, World};

/// Lazy view of the active entities at the time it was taken
///
/// The view borrows the world, so the entity set cannot change while it is
/// alive. Call [`restart`](Self::restart) to walk it again from the start.
#[derive(Debug, Clone)]
pub struct ActiveEntities<'w> {
    entities: &'w [Entity],
    position: usize,
}

impl<'w> ActiveEntities<'w> {
    pub(crate) fn new(entities: &'w [Entity]) -> Self {
        Self { entities, position: 0 }
    }

    /// Rewind to the first active entity
    pub fn restart(&mut self) {
        self.position = 0;
    }

    /// Total number of entities in the view
    pub fn total(&self) -> usize {
        self.entities.len()
    }
}

impl Iterator for ActiveEntities<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let entity = self.entities.get(self.position).copied()?;
        self.position += 1;
        Some(entity)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entities.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ActiveEntities<'_> {}

/// Detached cursor over the active entity set
///
/// Unlike [`ActiveEntities`] the cursor holds no borrow, so the world can be
/// mutated between steps. Any change to the active set after the cursor was
/// created (or last restarted) makes the next step fail with
/// [`EcsError::IterationInvalidated`] instead of skipping or repeating
/// entities.
#[derive(Debug, Clone)]
pub struct EntityCursor {
    epoch: u64,
    position: usize,
}

impl EntityCursor {
    pub(crate) fn new(epoch: u64) -> Self {
        Self { epoch, position: 0 }
    }

    /// Next active entity, or `None` once the set is exhausted
    pub fn next(&mut self, world: &World) -> Result<Option<Entity>, EcsError> {
        if world.epoch() != self.epoch {
            return Err(EcsError::IterationInvalidated);
        }

        let entity = world.active_slice().get(self.position).copied();
        if entity.is_some() {
            self.position += 1;
        }
        Ok(entity)
    }

    /// Start over against the world's current entity set
    pub fn restart(&mut self, world: &World) {
        self.epoch = world.epoch();
        self.position = 0;
    }
}
