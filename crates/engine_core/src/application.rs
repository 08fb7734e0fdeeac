//! Application trait and lifecycle management

use thiserror::Error;

use crate::assets::ResourceError;
use crate::config::ConfigError;
use crate::ecs::EcsError;
use crate::engine::Engine;

/// Application lifecycle trait
///
/// Implement this trait to drive the engine's frame loop.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Use this to preload resources,
    /// spawn the initial entities and register systems.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the world's systems run.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Whether the frame loop should stop after the current frame
    fn should_quit(&self, _engine: &Engine) -> bool {
        false
    }

    /// Cleanup the application
    ///
    /// Called once after the last frame, before resources are torn down.
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource loading failed
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Entity or component operation failed
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
