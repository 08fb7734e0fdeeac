//! Headless backends
//!
//! Deterministic stand-ins for the graphics and audio bindings. Handles are
//! allocated from a counter starting at 1 and tracked until released, so
//! tests can assert on leaks and double frees.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    AudioBackend, AudioHandle, BackendError, GraphicsBackend, MeshBuffers, ProgramHandle,
    ShaderSource, TextureHandle,
};
use crate::assets::loaders::shader::{declared_uniforms, references_identifier};
use crate::assets::{AudioFormat, ImageData, MeshData};

/// Live handle bookkeeping shared by both headless backends
#[derive(Debug)]
struct HandleTable {
    next: AtomicU32,
    live: Mutex<HashSet<u32>>,
}

impl HandleTable {
    fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
            live: Mutex::new(HashSet::new()),
        }
    }

    fn live(&self) -> MutexGuard<'_, HashSet<u32>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocate(&self) -> u32 {
        let handle = self.next.fetch_add(1, Ordering::Relaxed);
        self.live().insert(handle);
        handle
    }

    fn free(&self, handle: u32) -> Result<(), BackendError> {
        if self.live().remove(&handle) {
            Ok(())
        } else {
            Err(BackendError::InvalidHandle(handle))
        }
    }
}

/// Graphics backend that validates uploads without a GPU
///
/// Programs must define `main` in both stages. A uniform gets a location only
/// if the program references it outside its declaration, mirroring how
/// drivers strip unused uniforms.
#[derive(Debug)]
pub struct HeadlessGraphics {
    handles: HandleTable,
    uniforms: Mutex<HashMap<u32, HashMap<String, i32>>>,
}

impl HeadlessGraphics {
    /// Create a backend with no live objects
    pub fn new() -> Self {
        Self {
            handles: HandleTable::new(),
            uniforms: Mutex::new(HashMap::new()),
        }
    }

    /// Number of GPU objects not yet released
    pub fn live_handle_count(&self) -> usize {
        self.handles.live().len()
    }

    /// Whether `handle` is currently live
    pub fn is_live(&self, handle: u32) -> bool {
        self.handles.live().contains(&handle)
    }

    fn uniform_table(&self) -> MutexGuard<'_, HashMap<u32, HashMap<String, i32>>> {
        self.uniforms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HeadlessGraphics {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for HeadlessGraphics {
    fn upload_mesh(&self, mesh: &MeshData) -> Result<MeshBuffers, BackendError> {
        if mesh.vertices.is_empty() || mesh.indices.is_empty() {
            return Err(BackendError::Rejected("mesh has no geometry".to_string()));
        }
        if let Some(index) = mesh.indices.iter().find(|&&i| i as usize >= mesh.vertices.len()) {
            return Err(BackendError::Rejected(format!(
                "index {} out of range for {} vertices",
                index,
                mesh.vertices.len()
            )));
        }

        Ok(MeshBuffers {
            vertex_array: self.handles.allocate(),
            vertex_buffer: self.handles.allocate(),
            element_buffer: self.handles.allocate(),
        })
    }

    fn upload_texture(&self, image: &ImageData) -> Result<TextureHandle, BackendError> {
        let expected = image.width as usize * image.height as usize * image.channels as usize;
        if expected == 0 || image.data.len() != expected {
            return Err(BackendError::Rejected(format!(
                "texture {}x{} carries {} bytes",
                image.width,
                image.height,
                image.data.len()
            )));
        }
        Ok(TextureHandle(self.handles.allocate()))
    }

    fn compile_program(&self, source: &ShaderSource) -> Result<ProgramHandle, BackendError> {
        let stages = [("vertex", &source.vertex), ("fragment", &source.fragment)];
        for (stage, code) in &stages {
            if !references_identifier(code, "main") {
                return Err(BackendError::Compile(format!("{} stage has no main function", stage)));
            }
        }

        let mut locations = HashMap::new();
        let mut next_location = 0;
        for (_, code) in &stages {
            for uniform in declared_uniforms(code) {
                let used = stages.iter().any(|(_, code)| {
                    code.lines()
                        .filter(|line| !line.contains("uniform"))
                        .any(|line| references_identifier(line, &uniform.name))
                });
                if !used {
                    continue;
                }
                for name in uniform.expanded_names() {
                    locations.entry(name).or_insert_with(|| {
                        next_location += 1;
                        next_location - 1
                    });
                }
            }
        }

        let program = self.handles.allocate();
        self.uniform_table().insert(program, locations);
        Ok(ProgramHandle(program))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> i32 {
        self.uniform_table()
            .get(&program.0)
            .and_then(|locations| locations.get(name).copied())
            .unwrap_or(-1)
    }

    fn release_mesh(&self, buffers: MeshBuffers) -> Result<(), BackendError> {
        self.handles.free(buffers.element_buffer)?;
        self.handles.free(buffers.vertex_buffer)?;
        self.handles.free(buffers.vertex_array)
    }

    fn release_texture(&self, texture: TextureHandle) -> Result<(), BackendError> {
        self.handles.free(texture.0)
    }

    fn release_program(&self, program: ProgramHandle) -> Result<(), BackendError> {
        self.uniform_table().remove(&program.0);
        self.handles.free(program.0)
    }
}

/// Audio backend that checks stream headers without opening a device
#[derive(Debug)]
pub struct HeadlessAudio {
    handles: HandleTable,
}

impl HeadlessAudio {
    /// Create a backend with no live handles
    pub fn new() -> Self {
        Self { handles: HandleTable::new() }
    }

    /// Number of audio handles not yet released
    pub fn live_handle_count(&self) -> usize {
        self.handles.live().len()
    }

    fn accept(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError> {
        if bytes.is_empty() || format == AudioFormat::Unknown {
            return Err(BackendError::AudioDecode("unrecognized audio stream".to_string()));
        }
        Ok(AudioHandle(self.handles.allocate()))
    }
}

impl Default for HeadlessAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for HeadlessAudio {
    fn load_music(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError> {
        self.accept(bytes, format)
    }

    fn load_sfx(&self, bytes: &[u8], format: AudioFormat) -> Result<AudioHandle, BackendError> {
        self.accept(bytes, format)
    }

    fn release(&self, handle: AudioHandle) -> Result<(), BackendError> {
        self.handles.free(handle.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Vertex;

    fn triangle() -> MeshData {
        let vertex = |x: f32| Vertex {
            position: [x, 0.0, 0.0],
            normal: [0.0, 1.0, 0.0],
            tex_coord: [0.0, 0.0],
        };
        MeshData {
            vertices: vec![vertex(0.0), vertex(1.0), vertex(2.0)],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn mesh_upload_and_release_balance() {
        let graphics = HeadlessGraphics::new();
        let buffers = graphics.upload_mesh(&triangle()).unwrap();
        assert_eq!(graphics.live_handle_count(), 3);

        graphics.release_mesh(buffers).unwrap();
        assert_eq!(graphics.live_handle_count(), 0);
        assert_eq!(graphics.release_mesh(buffers), Err(BackendError::InvalidHandle(buffers.element_buffer)));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut mesh = triangle();
        mesh.indices[2] = 7;
        let result = HeadlessGraphics::new().upload_mesh(&mesh);
        assert!(matches!(result, Err(BackendError::Rejected(_))));
    }

    #[test]
    fn texture_size_must_match_pixels() {
        let graphics = HeadlessGraphics::new();
        let mut image = ImageData::solid_color(2, 2, [0, 0, 0, 255]);
        assert!(graphics.upload_texture(&image).is_ok());

        image.data.pop();
        assert!(matches!(graphics.upload_texture(&image), Err(BackendError::Rejected(_))));
    }

    #[test]
    fn unused_uniforms_have_no_location() {
        let graphics = HeadlessGraphics::new();
        let source = ShaderSource {
            vertex: "uniform mat4 mvp;\nuniform float unused;\nvoid main() { gl_Position = mvp * vec4(1.0); }".to_string(),
            fragment: "uniform vec3 tint[2];\nvoid main() { color = tint[0] + tint[1]; }".to_string(),
        };
        let program = graphics.compile_program(&source).unwrap();

        assert_eq!(graphics.uniform_location(program, "mvp"), 0);
        assert_eq!(graphics.uniform_location(program, "unused"), -1);
        assert_eq!(graphics.uniform_location(program, "tint[1]"), 2);
    }

    #[test]
    fn program_without_main_fails_to_compile() {
        let source = ShaderSource {
            vertex: "void main() {}".to_string(),
            fragment: "void helper() {}".to_string(),
        };
        let result = HeadlessGraphics::new().compile_program(&source);
        assert!(matches!(result, Err(BackendError::Compile(message)) if message.contains("fragment")));
    }

    #[test]
    fn audio_requires_known_format() {
        let audio = HeadlessAudio::new();
        assert!(audio.load_sfx(b"RIFF....", AudioFormat::Wav).is_ok());
        assert!(audio.load_music(b"????", AudioFormat::Unknown).is_err());
        assert_eq!(audio.live_handle_count(), 1);
    }
}
