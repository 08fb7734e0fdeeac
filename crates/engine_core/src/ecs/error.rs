//! ECS error types

use super::Entity;

/// Errors reported by world operations
///
/// All of these are local and recoverable; the calling system decides what
/// to do with them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity is not alive, or not active where activity is required
    #[error("invalid entity: {0}")]
    InvalidEntity(Entity),

    /// A singleton that requires explicit initialization was never set
    #[error("singleton component {0} has not been initialized")]
    MissingSingleton(&'static str),

    /// The active entity set changed while a cursor was walking it
    #[error("active entity set changed during iteration")]
    IterationInvalidated,

    /// No entity identifiers are left to hand out
    #[error("entity identifier space exhausted")]
    ResourceExhausted,

    /// A component store was registered under another type's id
    #[error("component store for {0} holds a different type")]
    StoreTypeMismatch(&'static str),
}
