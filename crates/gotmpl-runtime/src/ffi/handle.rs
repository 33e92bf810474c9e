//! Native handle: the loaded renderer and its entry points

use crate::error::{BridgeError, BridgeResult};
use libloading::{Library, Symbol};
use std::fmt;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

/// `RenderTemplate(template, json) -> char*`
pub type RenderFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut c_char;

/// `FreeString(char*)`
pub type FreeFn = unsafe extern "C" fn(*mut c_char);

pub const RENDER_SYMBOL: &[u8] = b"RenderTemplate\0";
pub const FREE_SYMBOL: &[u8] = b"FreeString\0";

/// Opaque reference to the native renderer
///
/// Holds the two bound entry points and, when loaded from disk, the library
/// that keeps them valid. Shared read-only once built.
pub struct NativeHandle {
    render: RenderFn,
    free: FreeFn,
    origin: Option<PathBuf>,
    // Must outlive the function pointers above; never unloaded explicitly.
    _library: Option<Library>,
}

impl NativeHandle {
    /// Load the artifact at `path` and bind both entry points
    ///
    /// Any platform failure (not a shared object, wrong architecture,
    /// missing symbol) is reported as `LibraryLoadFailure`.
    pub fn open(path: &Path) -> BridgeResult<Self> {
        // SAFETY: loading runs the library's initializers. The artifact is
        // the renderer shipped with this package and is trusted.
        let library =
            unsafe { Library::new(path) }.map_err(|e| BridgeError::load_failure(path, e))?;

        // SAFETY: the symbol types match the renderer's exported C signatures.
        // The copied pointers stay valid because `library` is stored alongside.
        let (render, free) = unsafe {
            let render: Symbol<'_, RenderFn> = library
                .get(RENDER_SYMBOL)
                .map_err(|e| BridgeError::load_failure(path, e))?;
            let free: Symbol<'_, FreeFn> = library
                .get(FREE_SYMBOL)
                .map_err(|e| BridgeError::load_failure(path, e))?;
            (*render, *free)
        };

        Ok(Self {
            render,
            free,
            origin: Some(path.to_path_buf()),
            _library: Some(library),
        })
    }

    /// Build a handle from entry points that are already in the process
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// - `render` returns NULL or a NUL-terminated buffer that `free` accepts
    /// - `free` releases exactly the buffers `render` returned
    /// - both functions stay valid for the lifetime of the handle
    pub unsafe fn from_raw(render: RenderFn, free: FreeFn) -> Self {
        Self {
            render,
            free,
            origin: None,
            _library: None,
        }
    }

    /// Path the handle was loaded from, `None` for in-process entry points
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// # Safety
    ///
    /// Both pointers must be valid NUL-terminated strings for the duration of
    /// the call.
    pub(crate) unsafe fn render_raw(
        &self,
        template: *const c_char,
        data: *const c_char,
    ) -> *mut c_char {
        (self.render)(template, data)
    }

    /// # Safety
    ///
    /// `buffer` must come from `render_raw` on this handle and must not have
    /// been freed already.
    pub(crate) unsafe fn free_raw(&self, buffer: *mut c_char) {
        (self.free)(buffer)
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
