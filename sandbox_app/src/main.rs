//! Headless sandbox
//!
//! Loads the sample resources, builds a small crate level from
//! `data/level.txt` and runs a fixed number of frames with a moving player.
//! Settings are read from `sandbox.toml` when present.

use engine_core::prelude::*;

const CONFIG_PATH: &str = "sandbox.toml";
const DEFAULT_FRAMES: u64 = 120;
const TILE_SIZE: f32 = 2.0;

/// Units per second
#[derive(Debug, Clone, Copy)]
struct Velocity(Vec3);

impl Component for Velocity {}

/// Moves every entity with a velocity
struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &str {
        "MovementSystem"
    }

    fn update(&mut self, world: &mut World, delta_time: f32) {
        let moves: Vec<(Entity, Vec3)> = world
            .query2::<TransformComponent, Velocity>()
            .map(|(entity, _, velocity)| (entity, velocity.0 * delta_time))
            .collect();

        for (entity, offset) in moves {
            if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
                transform.translate(offset);
            }
        }
    }
}

/// Counts what a renderer would draw this frame
#[derive(Default)]
struct VisibilitySystem {
    last_visible: usize,
}

impl System for VisibilitySystem {
    fn name(&self) -> &str {
        "VisibilitySystem"
    }

    fn update(&mut self, world: &mut World, _delta_time: f32) {
        let visible = world
            .query::<RenderableComponent>()
            .filter(|(_, renderable)| renderable.should_render())
            .count();
        if visible != self.last_visible {
            log::debug!("{} renderables visible", visible);
            self.last_visible = visible;
        }
    }
}

/// Tile grid parsed from a level data file
struct Level {
    columns: usize,
    rows: Vec<Vec<bool>>,
}

impl Level {
    fn parse(text: &str) -> Result<Self, AppError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"));

        let header = lines
            .next()
            .ok_or_else(|| AppError::Custom("level file is empty".to_string()))?;
        let mut dims = header.split_whitespace().map(str::parse::<usize>);
        let (Some(Ok(columns)), Some(Ok(row_count))) = (dims.next(), dims.next()) else {
            return Err(AppError::Custom(format!("bad level header '{}'", header)));
        };

        let rows: Vec<Vec<bool>> = lines
            .take(row_count)
            .map(|line| line.chars().take(columns).map(|c| c == '#').collect())
            .collect();
        if rows.len() != row_count {
            return Err(AppError::Custom(format!(
                "level declares {} rows but has {}",
                row_count,
                rows.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    fn crates(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(z, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, solid)| **solid)
                .map(move |(x, _)| (x, z))
        })
    }

    fn tile_center(&self, x: usize, z: usize) -> Vec3 {
        let half_width = self.columns as f32 * TILE_SIZE / 2.0;
        let half_depth = self.rows.len() as f32 * TILE_SIZE / 2.0;
        Vec3::new(
            (x as f32 + 0.5) * TILE_SIZE - half_width,
            0.0,
            (z as f32 + 0.5) * TILE_SIZE - half_depth,
        )
    }
}

struct SandboxApp {
    player: Option<Entity>,
}

impl SandboxApp {
    fn new() -> Self {
        Self { player: None }
    }
}

impl Application for SandboxApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let resources = engine.resources().clone();
        resources.load_resources(&[
            "textures/brick.png",
            "models/quad.obj",
            "models/cube.obj",
            "shaders/basic.vs",
            "shaders/gui.glsl",
            "data/level.txt",
        ])?;

        let mut shaders = ShaderStoreSingleton::new();
        shaders.register("basic", resources.get_resource_id_from_path("shaders/basic.vs")?);
        shaders.register("gui", resources.get_resource_id_from_path("shaders/gui.glsl")?);
        engine.world.set_singleton_component(shaders);

        let basic = resources.get_typed_by_path::<ShaderResource>("shaders/basic.vs")?;
        for name in ["model", "view", "projection", "tint", "diffuse"] {
            log::info!("basic shader uniform '{}' at location {}", name, basic.uniform_location(name));
        }

        let level_data = resources.get_typed_by_path::<DataFileResource>("data/level.txt")?;
        let level = Level::parse(
            level_data
                .contents_str()
                .ok_or_else(|| AppError::Custom("level file is not UTF-8".to_string()))?,
        )?;

        let quad = resources.get_resource_id_from_path("models/quad.obj")?;
        let cube_id = resources.get_resource_id_from_path("models/cube.obj")?;
        let cube = resources.get_typed::<MeshResource>(cube_id)?;
        let brick = resources.get_resource_id_from_path("textures/brick.png")?;
        let shader = engine
            .world
            .get_singleton_component::<ShaderStoreSingleton>()?
            .get("basic")
            .unwrap_or(ResourceId::NONE);

        let ground = engine.world.create_named_entity("ground")?;
        let extent = level.columns.max(level.rows.len()) as f32 * TILE_SIZE;
        engine
            .world
            .add_component(ground, TransformFactory::ground_tile(Vec3::zeros(), extent))?;
        engine
            .world
            .add_component(ground, RenderableComponent::new(quad, brick, shader))?;

        for (x, z) in level.crates() {
            let entity = engine.world.create_entity()?;
            let transform = TransformFactory::fitted(level.tile_center(x, z), cube.dimensions(), TILE_SIZE);
            engine.world.add_component(entity, transform)?;
            engine
                .world
                .add_component(entity, RenderableComponent::new(cube_id, brick, shader))?;
        }

        let player = engine.world.create_named_entity("player")?;
        engine
            .world
            .add_component(player, TransformComponent::from_position(Vec3::new(0.0, 1.0, 0.0)))?;
        engine
            .world
            .add_component(player, Velocity(Vec3::new(1.5, 0.0, -0.5)))?;
        engine
            .world
            .add_component(player, RenderableFactory::create_untextured(cube_id, shader))?;
        self.player = Some(player);

        let camera = engine.world.get_singleton_component::<CameraSingleton>()?;
        log::info!("Camera at {:?} looking along {:?}", camera.position, camera.forward());

        engine.world.add_system(MovementSystem);
        engine.world.add_system(VisibilitySystem::default());

        log::info!(
            "Sandbox ready: {} entities, {} resources loaded",
            engine.world.entity_count(),
            resources.loaded_count()
        );
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        let frame = engine.frame_count();
        if frame % 30 == 0 {
            if let Some(transform) = self
                .player
                .and_then(|player| engine.world.get_component::<TransformComponent>(player))
            {
                log::info!("Frame {}: player at {:?}", frame, transform.position);
            }
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        for (name, duration) in engine.world.system_update_times() {
            log::info!("{} last update took {:?}", name, duration);
        }
        for (component, count) in engine.world.component_counts() {
            log::info!("{} x {}", component, count);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ApplicationConfig::load_or_default(CONFIG_PATH)?;
    if config.name == ApplicationConfig::default().name {
        config.name = "Sandbox".to_string();
    }
    config.engine.target_frames.get_or_insert(DEFAULT_FRAMES);

    let mut app = SandboxApp::new();
    Engine::run(config, &mut app)?;
    Ok(())
}
