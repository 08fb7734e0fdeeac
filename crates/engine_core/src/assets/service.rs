//! Resource loading service
//!
//! Turns a path or an id into a shared, loaded [`Resource`]. Loads are
//! blocking and run on the calling thread. The cache sits behind one mutex;
//! a claimed id moves to `Resolving` while its loader runs without the lock,
//! and other callers asking for the same id wait on a condition variable
//! for the outcome. Every id is therefore loaded at most once. A failed load
//! leaves nothing behind for its path, apart from an id a caller already
//! holds, which goes back to `Unresolved`; the next request retries it.
//! After [`ResourceLoadingService::teardown`] every load fails with
//! [`ResourceError::ShutDown`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;
use std::time::Instant;

use super::loaders::{default_loaders, LoadRequest, ResourceLoader};
use super::{
    config_resolver, KindResolver, LoadError, Resource, ResourceCache, ResourceError, ResourceId,
    ResourceKind, ResourcePath, ResourceRef, ResourceState, ResourceVariant,
};
use crate::backend::{AudioBackend, GraphicsBackend, HeadlessGraphics};
use crate::core::config::ResourceConfig;
use crate::foundation::logging::{debug, info, trace, warn};

static INSTANCE: OnceLock<Arc<ResourceLoadingService>> = OnceLock::new();

/// Loads resources on demand and owns them until teardown
pub struct ResourceLoadingService {
    config: ResourceConfig,
    resolver: KindResolver,
    loaders: HashMap<ResourceKind, Box<dyn ResourceLoader>>,
    graphics: Arc<dyn GraphicsBackend>,
    audio: Arc<dyn AudioBackend>,
    cache: Mutex<ResourceCache>,
    load_finished: Condvar,
}

impl ResourceLoadingService {
    /// Service with default loaders and backends reading from `config.root_dir`
    pub fn new(config: ResourceConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    /// Start configuring a service
    pub fn builder() -> ResourceServiceBuilder {
        ResourceServiceBuilder::new()
    }

    /// The process-wide service, built with defaults on first use
    ///
    /// The instance lives until the process exits and is never dropped, so
    /// owners of native contexts should call [`teardown`](Self::teardown)
    /// before destroying them.
    pub fn instance() -> Arc<Self> {
        Arc::clone(INSTANCE.get_or_init(|| {
            debug!("Creating default resource loading service");
            Arc::new(Self::builder().build())
        }))
    }

    /// Install `service` as the process-wide instance
    ///
    /// Fails, handing the service back, if an instance already exists.
    pub fn install_instance(service: Arc<Self>) -> Result<(), Arc<Self>> {
        INSTANCE.set(service)
    }

    /// Load `path` if needed and return the shared resource
    ///
    /// Repeated calls return the same instance. On failure the cache keeps
    /// no entry for `path` and a later call retries the load.
    pub fn get_resource(&self, path: &str) -> Result<Arc<Resource>, ResourceError> {
        self.load_path(&ResourcePath::new(path)).map(|(_, resource)| resource)
    }

    /// Resource for an id this service produced
    ///
    /// An id that was resolved but never loaded is loaded from its path.
    pub fn get_resource_by_id(&self, id: ResourceId) -> Result<Arc<Resource>, ResourceError> {
        let path = {
            let cache = self.lock_cache();
            if let Some(resource) = cache.get_loaded(id) {
                trace!("Resource cache hit for {}", id);
                return Ok(Arc::clone(resource));
            }
            cache
                .path_of(id)
                .cloned()
                .ok_or(ResourceError::UnknownResourceId(id))?
        };
        self.load_path(&path).map(|(_, resource)| resource)
    }

    /// Id for `path` without loading it
    pub fn get_resource_id_from_path(&self, path: &str) -> Result<ResourceId, ResourceError> {
        self.lock_cache().resolve_or_assign_id(&ResourcePath::new(path))
    }

    /// Load `path` and return its id
    pub fn load_resource(&self, path: &str) -> Result<ResourceId, ResourceError> {
        self.load_path(&ResourcePath::new(path)).map(|(id, _)| id)
    }

    /// Load every path, returning ids in input order
    ///
    /// All paths are attempted even if one fails; the first failure is
    /// returned. With `parallel_preload` the loads are spread over scoped
    /// threads.
    pub fn load_resources(&self, paths: &[&str]) -> Result<Vec<ResourceId>, ResourceError> {
        let start = Instant::now();
        let results: Vec<Result<ResourceId, ResourceError>> = if self.config.parallel_preload && paths.len() > 1 {
            let workers = thread::available_parallelism().map_or(4, |n| n.get());
            let chunk_size = paths.len().div_ceil(workers);
            thread::scope(|scope| {
                let handles: Vec<_> = paths
                    .chunks(chunk_size)
                    .map(|chunk| {
                        scope.spawn(move || {
                            chunk.iter().map(|path| self.load_resource(path)).collect::<Vec<_>>()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .flat_map(|handle| match handle.join() {
                        Ok(results) => results,
                        Err(panic) => std::panic::resume_unwind(panic),
                    })
                    .collect()
            })
        } else {
            paths.iter().map(|path| self.load_resource(path)).collect()
        };

        info!("Preloaded {} resources in {:.2?}", paths.len(), start.elapsed());
        results.into_iter().collect()
    }

    /// Whether `path` has a loaded resource
    pub fn has_loaded_resource(&self, path: &str) -> bool {
        self.lock_cache().is_loaded_path(&ResourcePath::new(path))
    }

    /// Typed reference to the resource for `id`
    pub fn get_typed<T: ResourceVariant>(&self, id: ResourceId) -> Result<ResourceRef<T>, ResourceError> {
        let resource = self.get_resource_by_id(id)?;
        ResourceRef::new(resource).map_err(|resource| ResourceError::WrongKind {
            id,
            expected: T::KIND,
            found: resource.kind(),
        })
    }

    /// Typed reference to the resource at `path`, loading it if needed
    pub fn get_typed_by_path<T: ResourceVariant>(&self, path: &str) -> Result<ResourceRef<T>, ResourceError> {
        let id = self.load_resource(path)?;
        self.get_typed(id)
    }

    /// Load state of `path`, or `None` if it was never resolved
    pub fn resource_state(&self, path: &str) -> Option<ResourceState> {
        let cache = self.lock_cache();
        cache.id_of(&ResourcePath::new(path)).and_then(|id| cache.state(id))
    }

    /// Number of loaded resources
    pub fn loaded_count(&self) -> usize {
        self.lock_cache().loaded_count()
    }

    /// Whether teardown has run
    pub fn is_shut_down(&self) -> bool {
        self.lock_cache().is_closed()
    }

    /// Configuration the service was built with
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Graphics collaborator
    pub fn graphics(&self) -> &Arc<dyn GraphicsBackend> {
        &self.graphics
    }

    /// Audio collaborator
    pub fn audio(&self) -> &Arc<dyn AudioBackend> {
        &self.audio
    }

    /// Release every native handle, in ascending id order, and shut down
    ///
    /// Later loads fail with [`ResourceError::ShutDown`]. References still
    /// held by callers keep their memory but their handles are dead.
    pub fn teardown(&self) {
        let loaded = self.lock_cache().close();
        if loaded.is_empty() {
            return;
        }

        info!("Releasing {} resources", loaded.len());
        for (id, path, resource) in loaded {
            match resource.release(&*self.graphics, &*self.audio) {
                Ok(()) => debug!("Released {} resource '{}' ({})", resource.kind(), path, id),
                Err(e) => warn!("Failed to release {} resource '{}' ({}): {}", resource.kind(), path, id, e),
            }
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResourceCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_path(&self, path: &ResourcePath) -> Result<(ResourceId, Arc<Resource>), ResourceError> {
        let mut cache = self.lock_cache();
        let id = loop {
            if cache.is_closed() {
                return Err(ResourceError::ShutDown);
            }
            // Re-read every round: a failed load may have forgotten the id
            let id = cache.id_for_load(path)?;
            if let Some(resource) = cache.get_loaded(id) {
                trace!("Resource cache hit for '{}' ({})", path, id);
                return Ok((id, Arc::clone(resource)));
            }
            if cache.begin_load(id) {
                break id;
            }
            // Another thread is loading this id
            cache = self
                .load_finished
                .wait(cache)
                .unwrap_or_else(PoisonError::into_inner);
        };
        drop(cache);

        let claim = LoadClaim { service: self, id, completed: false };
        let start = Instant::now();
        let resource = match self.run_loader(id, path) {
            Ok(resource) => Arc::new(resource),
            Err(cause) => {
                warn!("Failed to load resource '{}': {}", path, cause);
                return Err(ResourceError::LoadFailure {
                    path: path.to_string(),
                    cause,
                });
            }
        };
        claim.complete(Arc::clone(&resource))?;

        info!(
            "Loaded {} resource '{}' as {} in {:.2?}",
            resource.kind(),
            path,
            id,
            start.elapsed()
        );
        Ok((id, resource))
    }

    fn run_loader(&self, id: ResourceId, path: &ResourcePath) -> Result<Resource, LoadError> {
        let kind = (self.resolver)(path);
        let loader = self.loaders.get(&kind).ok_or(LoadError::UnsupportedKind(kind))?;
        let request = LoadRequest {
            id,
            path,
            file_path: self.config.file_path(path.as_str()),
            graphics: &*self.graphics,
            audio: &*self.audio,
        };
        loader.load(&request)
    }
}

impl Drop for ResourceLoadingService {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for ResourceLoadingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.loaders.keys().collect();
        kinds.sort();
        f.debug_struct("ResourceLoadingService")
            .field("root_dir", &self.config.root_dir)
            .field("loaders", &kinds)
            .field("cache", &*self.lock_cache())
            .finish_non_exhaustive()
    }
}

/// Ownership of one `Resolving` id
///
/// Dropping an uncompleted claim, on error or unwind, undoes the load
/// through [`ResourceCache::abandon_load`] and wakes the waiters so one of
/// them retries.
struct LoadClaim<'a> {
    service: &'a ResourceLoadingService,
    id: ResourceId,
    completed: bool,
}

impl LoadClaim<'_> {
    fn complete(mut self, resource: Arc<Resource>) -> Result<(), ResourceError> {
        let mut cache = self.service.lock_cache();
        if cache.is_closed() {
            // Teardown ran while this load was in flight
            drop(cache);
            self.completed = true;
            self.service.load_finished.notify_all();
            if let Err(e) = resource.release(&*self.service.graphics, &*self.service.audio) {
                warn!("Failed to release {} resource {}: {}", resource.kind(), self.id, e);
            }
            return Err(ResourceError::ShutDown);
        }
        let result = cache.insert(self.id, resource);
        drop(cache);
        self.completed = true;
        self.service.load_finished.notify_all();
        result
    }
}

impl Drop for LoadClaim<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.service.lock_cache().abandon_load(self.id);
            self.service.load_finished.notify_all();
        }
    }
}

/// Builder for [`ResourceLoadingService`]
pub struct ResourceServiceBuilder {
    config: ResourceConfig,
    resolver: Option<KindResolver>,
    loaders: Vec<Box<dyn ResourceLoader>>,
    graphics: Option<Arc<dyn GraphicsBackend>>,
    audio: Option<Arc<dyn AudioBackend>>,
}

impl ResourceServiceBuilder {
    /// Defaults: default config, one built-in loader per kind, headless graphics
    pub fn new() -> Self {
        Self {
            config: ResourceConfig::default(),
            resolver: None,
            loaders: default_loaders(),
            graphics: None,
            audio: None,
        }
    }

    /// Resource directories, extensions and preload policy
    pub fn with_config(mut self, config: ResourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the path to kind mapping
    ///
    /// Without one, kinds come from the configured directories and extensions.
    pub fn with_resolver(mut self, resolver: KindResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Register `loader`, replacing the loader for the same kind
    pub fn with_loader(mut self, loader: Box<dyn ResourceLoader>) -> Self {
        let kind = loader.kind();
        self.loaders.retain(|existing| existing.kind() != kind);
        self.loaders.push(loader);
        self
    }

    /// Graphics collaborator
    pub fn with_graphics(mut self, graphics: Arc<dyn GraphicsBackend>) -> Self {
        self.graphics = Some(graphics);
        self
    }

    /// Audio collaborator
    pub fn with_audio(mut self, audio: Arc<dyn AudioBackend>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Initialize the loaders and build the service
    pub fn build(self) -> ResourceLoadingService {
        let resolver = self.resolver.unwrap_or_else(|| config_resolver(&self.config));
        let graphics = self
            .graphics
            .unwrap_or_else(|| Arc::new(HeadlessGraphics::new()));
        let audio = self.audio.unwrap_or_else(default_audio);

        let mut loaders = HashMap::new();
        for mut loader in self.loaders {
            loader.initialize(&self.config);
            loaders.insert(loader.kind(), loader);
        }
        debug!(
            "Resource loading service ready: root '{}', {} loaders",
            self.config.root_dir.display(),
            loaders.len()
        );

        ResourceLoadingService {
            config: self.config,
            resolver,
            loaders,
            graphics,
            audio,
            cache: Mutex::new(ResourceCache::new()),
            load_finished: Condvar::new(),
        }
    }
}

impl Default for ResourceServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "audio")]
fn default_audio() -> Arc<dyn AudioBackend> {
    Arc::new(crate::backend::RodioAudio::new())
}

#[cfg(not(feature = "audio"))]
fn default_audio() -> Arc<dyn AudioBackend> {
    Arc::new(crate::backend::HeadlessAudio::new())
}
