//! Resource loading scenarios against on-disk fixtures

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::backend::{HeadlessAudio, HeadlessGraphics};
use crate::core::config::ResourceConfig;

const VERTEX_SHADER: &str = "\
#version 330 core
uniform mat4 mvp;
uniform vec3 lights[2];
in vec3 position;
void main() { gl_Position = mvp * vec4(position + lights[0] + lights[1], 1.0); }
";

const FRAGMENT_SHADER: &str = "\
#version 330 core
uniform vec4 tint;
uniform float fade;
out vec4 color;
void main() { color = tint; }
";

const QUAD_OBJ: &str = "\
v -1 0 -2
v 1 0 -2
v 1 0 2
v -1 0 2
f 1 2 3 4
";

struct Fixture {
    dir: TempDir,
    graphics: Arc<HeadlessGraphics>,
    audio: Arc<HeadlessAudio>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            graphics: Arc::new(HeadlessGraphics::new()),
            audio: Arc::new(HeadlessAudio::new()),
        }
    }

    fn config(&self) -> ResourceConfig {
        ResourceConfig::new().with_root_dir(self.dir.path())
    }

    fn builder(&self) -> ResourceServiceBuilder {
        ResourceLoadingService::builder()
            .with_config(self.config())
            .with_graphics(self.graphics.clone())
            .with_audio(self.audio.clone())
    }

    fn service(&self) -> ResourceLoadingService {
        self.builder().build()
    }

    fn write(&self, path: &str, contents: impl AsRef<[u8]>) {
        let full = self.dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, contents).unwrap();
    }

    fn write_png(&self, path: &str, width: u32, height: u32) {
        let full = self.dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(width, height, image::Rgba([180, 60, 40, 255]))
            .save(&full)
            .unwrap();
    }

    fn path(&self, path: &str) -> std::path::PathBuf {
        self.dir.path().join(Path::new(path))
    }
}

#[test]
fn texture_loads_once_and_keeps_identity() {
    let fixture = Fixture::new();
    fixture.write_png("textures/brick.png", 8, 4);
    let service = fixture.service();

    let first = service.get_resource("textures/brick.png").unwrap();
    let second = service.get_resource("textures/brick.png").unwrap();

    let texture = first.as_variant::<TextureResource>().unwrap();
    assert_eq!(texture.width(), 8);
    assert_eq!(texture.height(), 4);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(service.loaded_count(), 1);
    assert_eq!(fixture.graphics.live_handle_count(), 1);
}

#[test]
fn same_path_same_id() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let a = service.get_resource_id_from_path("data/level.txt").unwrap();
    let b = service.get_resource_id_from_path("data/level.txt").unwrap();
    let c = service.get_resource_id_from_path("data/./other/../level.txt").unwrap();

    assert_eq!(a, b);
    assert_eq!(a, c);
    assert!(!service.has_loaded_resource("data/level.txt"));
    assert_eq!(service.resource_state("data/level.txt"), Some(ResourceState::Unresolved));
}

#[test]
fn missing_shader_is_a_load_failure_without_entry() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let err = service.get_resource("shaders/missing.glsl").unwrap_err();
    match &err {
        ResourceError::LoadFailure { path, cause } => {
            assert_eq!(path, "shaders/missing.glsl");
            assert!(cause.is_not_found());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(!service.has_loaded_resource("shaders/missing.glsl"));
    assert_eq!(service.loaded_count(), 0);
    assert_eq!(service.resource_state("shaders/missing.glsl"), None);
}

#[test]
fn failed_load_keeps_an_id_already_handed_out() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let id = service.get_resource_id_from_path("data/late.txt").unwrap();
    assert!(service.get_resource("data/late.txt").is_err());
    assert_eq!(service.resource_state("data/late.txt"), Some(ResourceState::Unresolved));
    assert_eq!(service.get_resource_id_from_path("data/late.txt").unwrap(), id);

    fixture.write("data/late.txt", "arrived");
    assert_eq!(service.load_resource("data/late.txt").unwrap(), id);
}

#[test]
fn failed_load_is_retried_once_fixed() {
    let fixture = Fixture::new();
    let service = fixture.service();

    assert!(service.get_resource("data/late.txt").is_err());
    fixture.write("data/late.txt", "arrived");

    let resource = service.get_resource("data/late.txt").unwrap();
    let data = resource.as_variant::<DataFileResource>().unwrap();
    assert_eq!(data.contents_str(), Some("arrived"));
}

#[test]
fn malformed_mesh_fails_then_loads_after_fix() {
    let fixture = Fixture::new();
    fixture.write("models/quad.obj", "v 0 0 0\nf 1 2 3\n");
    let service = fixture.service();

    let err = service.get_resource("models/quad.obj").unwrap_err();
    assert!(matches!(err.load_cause(), Some(LoadError::Parse(_))));
    assert_eq!(fixture.graphics.live_handle_count(), 0);

    fixture.write("models/quad.obj", QUAD_OBJ);
    let mesh = service.get_typed_by_path::<MeshResource>("models/quad.obj").unwrap();
    assert_eq!(mesh.element_count(), 6);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.dimensions().x, 2.0);
    assert_eq!(mesh.dimensions().z, 4.0);
}

/// Data loader that counts its invocations and takes a while
struct CountingLoader {
    calls: Arc<AtomicUsize>,
}

impl ResourceLoader for CountingLoader {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Data
    }

    fn load(&self, _request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        Ok(DataFileResource::new(b"shared".to_vec()).into())
    }
}

#[test]
fn concurrent_requests_load_once() {
    let fixture = Fixture::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let service = fixture
        .builder()
        .with_loader(Box::new(CountingLoader { calls: Arc::clone(&calls) }))
        .build();

    let resources: Vec<Arc<Resource>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| service.get_resource("data/shared.bin").unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(resources.iter().all(|r| Arc::ptr_eq(r, &resources[0])));
}

/// Data loader that fails on its first call only
struct FlakyLoader {
    calls: Arc<AtomicUsize>,
}

impl ResourceLoader for FlakyLoader {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Data
    }

    fn load(&self, request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        if call == 0 {
            return Err(LoadError::NotFound(request.file_path.clone()));
        }
        Ok(DataFileResource::new(Vec::new()).into())
    }
}

/// Data loader that panics on its first call only
struct PanickingLoader {
    calls: AtomicUsize,
}

impl ResourceLoader for PanickingLoader {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Data
    }

    fn load(&self, _request: &LoadRequest<'_>) -> Result<Resource, LoadError> {
        assert!(self.calls.fetch_add(1, Ordering::SeqCst) > 0, "decoder crashed");
        Ok(DataFileResource::new(b"ok".to_vec()).into())
    }
}

#[test]
fn transient_failure_does_not_poison_the_id() {
    let fixture = Fixture::new();
    let service = fixture
        .builder()
        .with_loader(Box::new(FlakyLoader { calls: Arc::new(AtomicUsize::new(0)) }))
        .build();

    let id = service.get_resource_id_from_path("data/flaky.txt").unwrap();
    assert!(service.get_resource_by_id(id).is_err());
    assert!(service.get_resource_by_id(id).is_ok());
    assert_eq!(service.get_resource_id_from_path("data/flaky.txt").unwrap(), id);
}

#[test]
fn waiters_retry_after_a_failed_load() {
    let fixture = Fixture::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let service = fixture
        .builder()
        .with_loader(Box::new(FlakyLoader { calls: Arc::clone(&calls) }))
        .build();

    let results: Vec<Result<Arc<Resource>, ResourceError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|_| scope.spawn(|| service.get_resource("data/flaky.bin")))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    let loaded: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(results.len() - loaded.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(loaded.iter().all(|r| Arc::ptr_eq(r, loaded[0])));
    assert_eq!(service.resource_state("data/flaky.bin"), Some(ResourceState::Loaded));
}

#[test]
fn panicking_loader_leaves_the_path_loadable() {
    let fixture = Fixture::new();
    let service = fixture
        .builder()
        .with_loader(Box::new(PanickingLoader { calls: AtomicUsize::new(0) }))
        .build();

    let id = service.get_resource_id_from_path("data/pinned.bin").unwrap();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        service.get_resource("data/pinned.bin")
    }));
    assert!(outcome.is_err());
    assert_eq!(service.resource_state("data/pinned.bin"), Some(ResourceState::Unresolved));

    let resource = service.get_resource_by_id(id).unwrap();
    assert_eq!(resource.as_variant::<DataFileResource>().unwrap().contents(), b"ok");
}

#[test]
fn panicking_loader_leaves_no_entry_for_a_fresh_path() {
    let fixture = Fixture::new();
    let service = fixture
        .builder()
        .with_loader(Box::new(PanickingLoader { calls: AtomicUsize::new(0) }))
        .build();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        service.get_resource("data/fresh.bin")
    }));
    assert!(outcome.is_err());
    assert_eq!(service.resource_state("data/fresh.bin"), None);
    assert!(service.get_resource("data/fresh.bin").is_ok());
}

#[test]
fn unknown_ids_are_rejected() {
    let fixture = Fixture::new();
    let service = fixture.service();

    let err = service.get_resource_by_id(ResourceId::new(42)).unwrap_err();
    assert!(matches!(err, ResourceError::UnknownResourceId(id) if id == ResourceId::new(42)));
    assert!(service.get_resource_by_id(ResourceId::NONE).is_err());
}

#[test]
fn resolved_id_loads_from_its_path() {
    let fixture = Fixture::new();
    fixture.write("data/level.txt", "width=10");
    let service = fixture.service();

    let id = service.get_resource_id_from_path("data/level.txt").unwrap();
    let data = service.get_typed::<DataFileResource>(id).unwrap();
    assert_eq!(data.contents_str(), Some("width=10"));
    assert!(service.has_loaded_resource("data/level.txt"));
}

#[test]
fn typed_access_reports_wrong_kind() {
    let fixture = Fixture::new();
    fixture.write("data/level.txt", "width=10");
    let service = fixture.service();

    let id = service.load_resource("data/level.txt").unwrap();
    let err = service.get_typed::<TextureResource>(id).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::WrongKind {
            expected: ResourceKind::Texture,
            found: ResourceKind::Data,
            ..
        }
    ));
}

#[test]
fn shader_pair_records_uniform_locations() {
    let fixture = Fixture::new();
    fixture.write("shaders/basic.vs", VERTEX_SHADER);
    fixture.write("shaders/basic.fs", FRAGMENT_SHADER);
    let service = fixture.service();

    let shader = service.get_typed_by_path::<ShaderResource>("shaders/basic.vs").unwrap();
    assert_eq!(shader.uniform_location("mvp"), 0);
    assert_eq!(shader.uniform_location("lights[1]"), 2);
    assert_eq!(shader.uniform_location("tint"), 3);
    assert!(shader.has_uniform("fade"));
    assert_eq!(shader.uniform_location("fade"), -1);
    assert_eq!(shader.uniforms().len(), 5);

    // The fragment path is its own id but loads the same pair
    let from_fragment = service.get_typed_by_path::<ShaderResource>("shaders/basic.fs").unwrap();
    assert_eq!(from_fragment.uniforms(), shader.uniforms());
    assert!(!ResourceRef::ptr_eq(&shader, &from_fragment));
}

#[test]
fn shader_missing_second_stage_is_not_found() {
    let fixture = Fixture::new();
    fixture.write("shaders/lonely.vs", VERTEX_SHADER);
    let service = fixture.service();

    let err = service.get_resource("shaders/lonely.vs").unwrap_err();
    assert!(err.load_cause().is_some_and(LoadError::is_not_found));
}

#[test]
fn combined_shader_file_compiles() {
    let fixture = Fixture::new();
    let source = format!(
        "#type vertex\n{}\n#type fragment\n{}",
        VERTEX_SHADER.replace("#version 330 core\n", ""),
        FRAGMENT_SHADER.replace("#version 330 core\n", "")
    );
    fixture.write("shaders/combined.glsl", format!("#version 330 core\n{source}"));
    let service = fixture.service();

    let shader = service.get_typed_by_path::<ShaderResource>("shaders/combined.glsl").unwrap();
    assert_eq!(shader.uniform_location("mvp"), 0);
    assert!(fixture.graphics.is_live(shader.program().0));
}

#[test]
fn shader_without_main_is_a_compile_failure() {
    let fixture = Fixture::new();
    fixture.write("shaders/broken.vs", VERTEX_SHADER);
    fixture.write("shaders/broken.fs", "uniform vec4 tint;\n");
    let service = fixture.service();

    let err = service.get_resource("shaders/broken.vs").unwrap_err();
    assert!(matches!(err.load_cause(), Some(LoadError::Compile(_))));
    assert_eq!(fixture.graphics.live_handle_count(), 0);
}

#[test]
fn audio_kinds_follow_directory_convention() {
    let fixture = Fixture::new();
    fixture.write("sfx/laser.wav", b"RIFF\x24\0\0\0WAVEfmt ");
    fixture.write("music/theme.ogg", b"OggS\0\x02");
    fixture.write("music/noise.ogg", b"not audio");
    let service = fixture.service();

    let sfx = service.get_typed_by_path::<SfxResource>("sfx/laser.wav").unwrap();
    assert_eq!(sfx.format(), AudioFormat::Wav);
    let music = service.get_typed_by_path::<MusicResource>("music/theme.ogg").unwrap();
    assert_eq!(music.format(), AudioFormat::Ogg);
    assert_eq!(fixture.audio.live_handle_count(), 2);

    let err = service.get_resource("music/noise.ogg").unwrap_err();
    assert!(matches!(err.load_cause(), Some(LoadError::Decode(_))));
}

#[test]
fn custom_resolver_overrides_kinds() {
    let fixture = Fixture::new();
    fixture.write_png("textures/raw.png", 2, 2);
    let service = fixture
        .builder()
        .with_resolver(Arc::new(|_: &ResourcePath| ResourceKind::Data))
        .build();

    let resource = service.get_resource("textures/raw.png").unwrap();
    assert_eq!(resource.kind(), ResourceKind::Data);
    let data = resource.as_variant::<DataFileResource>().unwrap();
    assert_eq!(data.contents(), std::fs::read(fixture.path("textures/raw.png")).unwrap());
}

#[test]
fn batch_preload_in_parallel_keeps_order() {
    let fixture = Fixture::new();
    for name in ["a", "b", "c", "d"] {
        fixture.write(&format!("data/{name}.txt"), name);
    }
    let service = fixture
        .builder()
        .with_config(fixture.config().with_parallel_preload(true))
        .build();

    let paths = ["data/a.txt", "data/b.txt", "data/c.txt", "data/d.txt"];
    let ids = service.load_resources(&paths).unwrap();
    let expected: Vec<_> = paths
        .iter()
        .map(|p| service.get_resource_id_from_path(p).unwrap())
        .collect();
    assert_eq!(ids, expected);
    assert_eq!(service.loaded_count(), 4);
}

#[test]
fn batch_preload_attempts_every_path() {
    let fixture = Fixture::new();
    fixture.write("data/a.txt", "a");
    fixture.write("data/c.txt", "c");
    let service = fixture.service();

    let err = service
        .load_resources(&["data/a.txt", "data/missing.txt", "data/c.txt"])
        .unwrap_err();
    assert!(matches!(err, ResourceError::LoadFailure { ref path, .. } if path == "data/missing.txt"));
    assert!(service.has_loaded_resource("data/a.txt"));
    assert!(service.has_loaded_resource("data/c.txt"));
}

#[test]
fn teardown_releases_every_native_handle() {
    let fixture = Fixture::new();
    fixture.write_png("textures/brick.png", 2, 2);
    fixture.write("models/quad.obj", QUAD_OBJ);
    fixture.write("shaders/basic.vs", VERTEX_SHADER);
    fixture.write("shaders/basic.fs", FRAGMENT_SHADER);
    fixture.write("sfx/laser.wav", b"RIFF\x24\0\0\0WAVE");
    let service = fixture.service();

    service
        .load_resources(&["textures/brick.png", "models/quad.obj", "shaders/basic.vs", "sfx/laser.wav"])
        .unwrap();
    assert_eq!(fixture.graphics.live_handle_count(), 5);
    assert_eq!(fixture.audio.live_handle_count(), 1);

    service.teardown();
    assert_eq!(fixture.graphics.live_handle_count(), 0);
    assert_eq!(fixture.audio.live_handle_count(), 0);
    assert_eq!(service.loaded_count(), 0);

    // A second pass has nothing left to release
    service.teardown();
    assert!(service.is_shut_down());
}

#[test]
fn torn_down_service_never_loads_again() {
    let fixture = Fixture::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let service = fixture
        .builder()
        .with_loader(Box::new(CountingLoader { calls: Arc::clone(&calls) }))
        .build();

    let id = service.load_resource("data/x.bin").unwrap();
    service.teardown();

    assert!(matches!(service.get_resource("data/x.bin"), Err(ResourceError::ShutDown)));
    assert!(matches!(service.get_resource_by_id(id), Err(ResourceError::ShutDown)));
    assert!(matches!(service.load_resource("data/new.bin"), Err(ResourceError::ShutDown)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!service.has_loaded_resource("data/x.bin"));
    assert_eq!(service.get_resource_id_from_path("data/x.bin").unwrap(), id);
}

#[test]
fn dropping_the_service_releases_handles() {
    let fixture = Fixture::new();
    fixture.write("models/quad.obj", QUAD_OBJ);
    {
        let service = fixture.service();
        service.get_resource("models/quad.obj").unwrap();
        assert_eq!(fixture.graphics.live_handle_count(), 3);
    }
    assert_eq!(fixture.graphics.live_handle_count(), 0);
}
