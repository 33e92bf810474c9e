//! Process-wide native library loading
//!
//! The renderer is loaded at most once per process. Every [`LibraryLoader`]
//! and every thread observes the same [`NativeHandle`]; the load-and-cache
//! sequence runs under one mutex, so concurrent first calls neither
//! double-load nor see a partially built handle.

use crate::error::{BridgeError, BridgeResult};
use crate::ffi::handle::NativeHandle;
use gotmpl_config::Settings;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// The cached handle; `None` until the first successful load
static NATIVE_HANDLE: Mutex<Option<Arc<NativeHandle>>> = Mutex::new(None);

/// Number of times an open step actually ran to completion
static LOAD_COUNT: AtomicUsize = AtomicUsize::new(0);

fn lock_cache() -> MutexGuard<'static, Option<Arc<NativeHandle>>> {
    // The guarded value is only ever replaced whole, poisoning cannot tear it
    NATIVE_HANDLE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Resolves the platform artifact and loads it once
#[derive(Debug, Clone)]
pub struct LibraryLoader {
    artifact_path: PathBuf,
}

impl LibraryLoader {
    /// Loader for an explicit artifact path
    pub fn new(artifact_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
        }
    }

    /// Loader for the platform artifact inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(gotmpl_config::artifact_file_name()))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.artifact_path())
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    /// Return the process-wide handle, loading the artifact on first use
    pub fn ensure_loaded(&self) -> BridgeResult<Arc<NativeHandle>> {
        self.ensure_loaded_with(NativeHandle::open)
    }

    /// Like [`ensure_loaded`](Self::ensure_loaded) with a caller-supplied
    /// open step, used when the entry points come from somewhere other than
    /// `dlopen` of the artifact.
    ///
    /// The open step runs at most once per process, and only after the
    /// artifact path was found to exist.
    pub fn ensure_loaded_with<F>(&self, open: F) -> BridgeResult<Arc<NativeHandle>>
    where
        F: FnOnce(&Path) -> BridgeResult<NativeHandle>,
    {
        let mut cache = lock_cache();

        if let Some(handle) = cache.as_ref() {
            if let Some(origin) = handle.origin() {
                if origin != self.artifact_path {
                    warn!(
                        requested = %self.artifact_path.display(),
                        loaded = %origin.display(),
                        "renderer already loaded from a different path; reusing it"
                    );
                }
            }
            debug!("reusing cached renderer handle");
            return Ok(Arc::clone(handle));
        }

        if !self.artifact_path.exists() {
            error!(path = %self.artifact_path.display(), "renderer artifact not found");
            return Err(BridgeError::library_not_found(&self.artifact_path));
        }

        let handle = match open(&self.artifact_path) {
            Ok(handle) => Arc::new(handle),
            Err(e) => {
                error!(path = %self.artifact_path.display(), error = %e, "failed to load renderer");
                return Err(e);
            }
        };

        LOAD_COUNT.fetch_add(1, Ordering::SeqCst);
        info!(path = %self.artifact_path.display(), "loaded native renderer");
        *cache = Some(Arc::clone(&handle));
        Ok(handle)
    }
}

/// The cached handle, if one has been loaded
pub fn cached_handle() -> Option<Arc<NativeHandle>> {
    lock_cache().clone()
}

/// How many times the renderer has been loaded since start (or last reset)
pub fn load_count() -> usize {
    LOAD_COUNT.load(Ordering::SeqCst)
}

/// Forget the cached handle so the next engine loads again.
///
/// Test isolation only, available with the `test-utils` feature. Engines
/// built before the reset keep their own reference, so the old library stays
/// mapped until they are dropped.
#[cfg(any(test, feature = "test-utils"))]
pub fn reset_for_tests() {
    *lock_cache() = None;
    LOAD_COUNT.store(0, Ordering::SeqCst);
}
