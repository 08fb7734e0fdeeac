//! System trait and bookkeeping

use std::time::Duration;

slotmap::new_key_type! {
    /// Handle to a system registered with a world
    pub struct SystemKey;
}

/// System trait for processing entities and components
pub trait System: Send {
    /// Name used in timing reports and logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Run one frame of the system
    fn update(&mut self, world: &mut crate::ecs::World, delta_time: f32);
}

/// Registered system plus its last measured update time
///
/// `system` is `None` while the system is running, since it is moved out of
/// the world for the duration of its own update.
pub(crate) struct SystemSlot {
    pub(crate) system: Option<Box<dyn System>>,
    pub(crate) name: String,
    pub(crate) last_update: Duration,
}

impl SystemSlot {
    pub(crate) fn new(system: Box<dyn System>) -> Self {
        let name = system.name().to_string();
        Self {
            system: Some(system),
            name,
            last_update: Duration::ZERO,
        }
    }
}
