//! # Engine Core
//!
//! ECS world and resource loading core for a small real-time engine.
//!
//! ## Features
//!
//! - **ECS Architecture**: generational entities, sparse-set component
//!   stores, singleton components and ordered systems
//! - **Resource Loading**: path to id resolution, at-most-once loading and
//!   typed access to data, mesh, texture, shader, music and sound resources
//! - **Pluggable Backends**: graphics and audio collaborators behind traits,
//!   with headless implementations for tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine_core::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let shader = engine.resources().load_resource("shaders/basic.vs")?;
//!         let mut shaders = ShaderStoreSingleton::new();
//!         shaders.register("basic", shader);
//!         engine.world.set_singleton_component(shaders);
//!         engine.world.create_named_entity("player")?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
//!         let _ = (engine, delta_time);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::new("My App");
//!     Engine::run(config, &mut MyApp)?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod foundation;
pub mod config;
pub mod ecs;
pub mod assets;
pub mod backend;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, Application, Engine, EngineError,
        assets::{
            DataFileResource, MeshResource, MusicResource, Resource, ResourceError, ResourceId,
            ResourceKind, ResourceLoadingService, ResourceRef, SfxResource, ShaderResource,
            TextureResource,
        },
        core::config::{ApplicationConfig, Config, EngineConfig, ResourceConfig},
        ecs::{
            components::{
                CameraSingleton, Name, RenderableComponent, RenderableFactory,
                ShaderStoreSingleton, TransformComponent, TransformFactory,
            },
            Component, EcsError, Entity, SingletonComponent, System, World,
        },
        foundation::math::{Mat4, Point3, Vec2, Vec3},
    };
}
