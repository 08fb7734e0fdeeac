//! Core engine implementation

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::application::{AppError, Application};
use crate::assets::ResourceLoadingService;
use crate::core::config::{ApplicationConfig, EngineConfig};
use crate::ecs::World;
use crate::foundation::logging::{self, info, warn};

/// Main engine struct
///
/// Owns the ECS world and shares the resource service. The frame loop runs on
/// the calling thread; the world is never touched from anywhere else.
pub struct Engine {
    /// ECS world containing all entities, components and systems
    pub world: World,

    resources: Arc<ResourceLoadingService>,
    config: EngineConfig,
    running: bool,
    frame_count: u64,
}

impl Engine {
    /// Create an engine around an existing resource service
    pub fn new(config: EngineConfig, resources: Arc<ResourceLoadingService>) -> Self {
        info!(
            "Initializing engine (anticipated entities: {})",
            config.anticipated_entity_count
        );
        Self {
            world: World::with_capacity(config.anticipated_entity_count),
            resources,
            config,
            running: true,
            frame_count: 0,
        }
    }

    /// Run the frame loop with `app` until it quits or the frame cap is hit
    ///
    /// Installs a resource service built from `config.engine.resources` as
    /// the process-wide instance and tears it down before returning. Fails
    /// with [`EngineError::ResourceServiceInstalled`] if an instance already
    /// exists, since its configuration may differ and a torn-down service
    /// loads nothing. Use [`Engine::new`] to run against a service of your own.
    pub fn run<A: Application>(config: ApplicationConfig, app: &mut A) -> Result<(), EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        logging::init_with_level(&config.engine.log_level);
        info!("Starting '{}'", config.name);

        let service = Arc::new(ResourceLoadingService::new(config.engine.resources.clone()));
        if ResourceLoadingService::install_instance(Arc::clone(&service)).is_err() {
            warn!("A resource service is already installed, refusing to start");
            return Err(EngineError::ResourceServiceInstalled);
        }
        let mut engine = Self::new(config.engine, service);

        let result = engine.run_loop(app);

        app.cleanup(&mut engine);
        engine.resources.teardown();
        info!("Engine shutdown complete after {} frames", engine.frame_count);
        result
    }

    fn run_loop<A: Application>(&mut self, app: &mut A) -> Result<(), EngineError> {
        app.initialize(self)?;

        info!("Starting main loop...");
        let mut last_frame = Instant::now();
        while self.running {
            let now = Instant::now();
            let delta_time = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;

            app.update(self, delta_time)?;
            self.world.update(delta_time);
            self.frame_count += 1;

            if app.should_quit(self) {
                self.quit();
            }
            if self.config.target_frames.is_some_and(|cap| self.frame_count >= cap) {
                info!("Reached frame cap of {}", self.frame_count);
                self.running = false;
            }
        }
        Ok(())
    }

    /// Request engine shutdown after the current frame
    pub fn quit(&mut self) {
        info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the frame loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames completed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the ECS world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Shared resource service
    pub fn resources(&self) -> &Arc<ResourceLoadingService> {
        &self.resources
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The application returned an error
    #[error("Application error: {0}")]
    Application(#[from] AppError),

    /// A process-wide resource service was installed before `run`
    #[error("A resource service is already installed")]
    ResourceServiceInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DataFileResource;
    use crate::core::config::ResourceConfig;
    use crate::ecs::components::Name;

    struct CountingApp {
        initialized: bool,
        updates: u32,
        cleaned_up: bool,
        quit_after: Option<u32>,
    }

    impl CountingApp {
        fn new(quit_after: Option<u32>) -> Self {
            Self {
                initialized: false,
                updates: 0,
                cleaned_up: false,
                quit_after,
            }
        }
    }

    impl Application for CountingApp {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            engine.world.create_named_entity("player")?;
            self.initialized = true;
            Ok(())
        }

        fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            assert!(engine.world.find_entity("player").is_some());
            self.updates += 1;
            Ok(())
        }

        fn should_quit(&self, _engine: &Engine) -> bool {
            self.quit_after.is_some_and(|n| self.updates >= n)
        }

        fn cleanup(&mut self, _engine: &mut Engine) {
            self.cleaned_up = true;
        }
    }

    fn engine() -> Engine {
        let service = ResourceLoadingService::new(ResourceConfig::default());
        Engine::new(EngineConfig::new().with_target_frames(3), Arc::new(service))
    }

    #[test]
    fn frame_cap_stops_the_loop() {
        let mut engine = engine();
        let mut app = CountingApp::new(None);

        engine.run_loop(&mut app).unwrap();
        assert!(app.initialized);
        assert_eq!(app.updates, 3);
        assert_eq!(engine.frame_count(), 3);
        assert!(!engine.is_running());
    }

    #[test]
    fn application_can_quit_early() {
        let mut engine = engine();
        let mut app = CountingApp::new(Some(1));

        engine.run_loop(&mut app).unwrap();
        assert_eq!(app.updates, 1);
        assert_eq!(engine.world.query::<Name>().count(), 1);
    }

    #[test]
    fn application_errors_stop_the_loop() {
        struct Failing;

        impl Application for Failing {
            fn initialize(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
                Ok(())
            }

            fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
                engine.resources().get_typed_by_path::<DataFileResource>("data/absent.txt")?;
                Ok(())
            }
        }

        let mut engine = engine();
        let err = engine.run_loop(&mut Failing).unwrap_err();
        assert!(matches!(err, EngineError::Application(AppError::Resource(_))));
        assert_eq!(engine.frame_count(), 0);
    }

    #[test]
    fn invalid_config_is_rejected_before_start() {
        let mut config = ApplicationConfig::new("");
        config.engine.target_frames = Some(1);
        let err = Engine::run(config, &mut CountingApp::new(None)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn run_tears_down_and_cleans_up() {
        let mut config = ApplicationConfig::new("engine-test");
        config.engine.target_frames = Some(2);
        let mut app = CountingApp::new(None);

        Engine::run(config.clone(), &mut app).unwrap();
        assert!(app.cleaned_up);
        assert_eq!(app.updates, 2);
        assert!(ResourceLoadingService::instance().is_shut_down());

        // The installed service is spent; a second run must not reuse it
        let mut again = CountingApp::new(None);
        let err = Engine::run(config, &mut again).unwrap_err();
        assert!(matches!(err, EngineError::ResourceServiceInstalled));
        assert!(!again.initialized);
    }
}
