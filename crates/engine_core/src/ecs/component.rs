//! Component traits

/// Marker trait for components
pub trait Component: 'static + Send + Sync {}

/// A component type with at most one instance per world
///
/// The initialization policy is part of the type's contract:
/// - return `Some(value)` from [`lazy_init`](Self::lazy_init) and the world
///   creates the instance on first access;
/// - keep the default `None` and the instance must be installed with
///   `World::set_singleton_component` before it is read, otherwise access
///   fails with `EcsError::MissingSingleton`.
pub trait SingletonComponent: Component + Sized {
    /// Value used to create the singleton on first access
    fn lazy_init() -> Option<Self> {
        None
    }
}

// Plain value types that are handy as ad-hoc components
impl Component for crate::foundation::math::Vec3 {}
impl Component for crate::foundation::math::Vec2 {}
