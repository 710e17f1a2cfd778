// Resource Loader
//
// Loads external resources (templates, styles) for component analysis.
// Loading can be split into a preload, which runs concurrently for the whole
// program before analysis, and a synchronous `load` served from the cache.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::{Arc, Mutex, PoisonError};

/// Resource load error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResourceError {
    pub url: String,
    pub message: String,
}

impl ResourceError {
    pub fn not_found(url: &str) -> Self {
        Self {
            url: url.to_string(),
            message: format!("Resource not found: {}", url),
        }
    }

    pub fn load_failed(url: &str, reason: &str) -> Self {
        Self {
            url: url.to_string(),
            message: format!("Failed to load {}: {}", url, reason),
        }
    }
}

pub type Fetch<T> = Box<dyn FnOnce() -> Result<T, ResourceError> + Send>;

/// Pending work started by `ResourceLoader::preload`.
pub struct PreloadTask {
    url: String,
    run: Fetch<()>,
}

impl PreloadTask {
    pub fn new(url: impl Into<String>, run: impl FnOnce() -> Result<(), ResourceError> + Send + 'static) -> Self {
        Self {
            url: url.into(),
            run: Box::new(run),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn run(self) -> Result<(), ResourceError> {
        (self.run)()
    }
}

impl std::fmt::Debug for PreloadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadTask").field("url", &self.url).finish()
    }
}

/// Resource loader trait.
pub trait ResourceLoader: Send + Sync {
    /// Starts fetching `url`. `None` when the resource is already available
    /// or being fetched, or when the loader only loads synchronously.
    fn preload(&self, url: &str) -> Option<PreloadTask>;

    fn load(&self, url: &str) -> Result<String, ResourceError>;
}

/// Result of reading a resource through a `ResourceHost`.
pub enum ResourceRead {
    Ready(String),
    /// The content is produced by running the fetch.
    Pending(Fetch<String>),
}

/// Embedder hook for reading resources.
pub trait ResourceHost: Send + Sync {
    fn read_resource(&self, url: &str) -> Result<ResourceRead, ResourceError>;
}

impl<F> ResourceHost for F
where
    F: Fn(&str) -> Result<ResourceRead, ResourceError> + Send + Sync,
{
    fn read_resource(&self, url: &str) -> Result<ResourceRead, ResourceError> {
        self(url)
    }
}

/// Loads resources through a `ResourceHost`, caching what it read.
pub struct HostResourceLoader {
    host: Arc<dyn ResourceHost>,
    cache: Arc<Mutex<HashMap<String, String>>>,
    fetching: Arc<Mutex<HashSet<String>>>,
}

impl HostResourceLoader {
    pub fn new(host: Arc<dyn ResourceHost>) -> Self {
        Self {
            host,
            cache: Arc::default(),
            fetching: Arc::default(),
        }
    }

    fn cached(&self, url: &str) -> Option<String> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(url).cloned()
    }

    fn store(cache: &Mutex<HashMap<String, String>>, url: &str, content: String) {
        cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), content);
    }
}

impl ResourceLoader for HostResourceLoader {
    fn preload(&self, url: &str) -> Option<PreloadTask> {
        if self.cached(url).is_some() {
            return None;
        }
        if !self.fetching.lock().unwrap_or_else(PoisonError::into_inner).insert(url.to_string()) {
            return None;
        }
        let fetch = match self.host.read_resource(url) {
            Ok(ResourceRead::Ready(content)) => {
                Self::store(&self.cache, url, content);
                self.fetching.lock().unwrap_or_else(PoisonError::into_inner).remove(url);
                return None;
            }
            Ok(ResourceRead::Pending(fetch)) => fetch,
            Err(err) => {
                self.fetching.lock().unwrap_or_else(PoisonError::into_inner).remove(url);
                return Some(PreloadTask::new(url, move || Err(err)));
            }
        };
        let cache = Arc::clone(&self.cache);
        let fetching = Arc::clone(&self.fetching);
        let owned_url = url.to_string();
        Some(PreloadTask::new(url, move || {
            let result = fetch();
            fetching.lock().unwrap_or_else(PoisonError::into_inner).remove(&owned_url);
            Self::store(&cache, &owned_url, result?);
            Ok(())
        }))
    }

    fn load(&self, url: &str) -> Result<String, ResourceError> {
        if let Some(content) = self.cached(url) {
            return Ok(content);
        }
        let content = match self.host.read_resource(url)? {
            ResourceRead::Ready(content) => content,
            ResourceRead::Pending(fetch) => fetch()?,
        };
        Self::store(&self.cache, url, content.clone());
        Ok(content)
    }
}

/// Reads resources from disk; `url` is a file path.
#[derive(Debug, Default)]
pub struct FileResourceLoader;

impl FileResourceLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceLoader for FileResourceLoader {
    fn preload(&self, _url: &str) -> Option<PreloadTask> {
        None
    }

    fn load(&self, url: &str) -> Result<String, ResourceError> {
        fs::read_to_string(url).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ResourceError::not_found(url),
            _ => ResourceError::load_failed(url, &err.to_string()),
        })
    }
}
