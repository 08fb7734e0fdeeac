//! Entity-Component-System implementation
//!
//! Entities are generational identifiers, components live in per-type
//! sparse-set stores, and singleton components hold process-wide state that
//! belongs to no entity.
//!
//! The world performs no internal locking. One thread owns it per frame.

pub mod world;
pub mod entity;
pub mod component;
pub mod storage;
pub mod system;
pub mod query;
pub mod error;
pub mod components;


pub use world::World;
pub use entity::Entity;
pub use component::{Component, SingletonComponent};
pub use storage::ComponentStore;
pub use system::{System, SystemKey};
pub use query::{ActiveEntities, EntityCursor};
pub use error::EcsError;
