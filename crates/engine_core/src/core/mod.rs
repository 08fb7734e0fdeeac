//! # Core Engine Module
//!
//! Shared configuration types used by every subsystem.
//!
//! ## Organization
//!
//! - **Config**: Engine and resource configuration
//! - **Foundation**: Low-level utilities (math, collections, logging)
//! - **Assets**: Resource loading and caching
//! - **ECS**: Entity-Component-System implementation

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;
pub use crate::assets;
pub use crate::ecs;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    EngineConfig,
    ResourceConfig,
    Config,
    ConfigError,
};
