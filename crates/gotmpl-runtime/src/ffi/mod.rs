//! Foreign Function Interface (FFI) infrastructure
//!
//! Everything that touches the native renderer lives here:
//! - [`handle`]: the loaded library and its two entry points
//! - [`loader`]: process-wide, load-once resolution of the artifact
//! - [`marshal`]: template and payload to NUL-terminated buffers
//! - [`caller`]: the synchronous native call
//! - [`buffer`]: ownership of the native result buffer
//!
//! # Safety
//!
//! FFI operations involve `unsafe` code and manual memory management.
//! All unsafe code is isolated in this module behind safe wrappers.

pub mod buffer;
pub mod caller;
pub mod handle;
pub mod loader;
pub mod marshal;

pub use buffer::NativeBuffer;
pub use handle::{FreeFn, NativeHandle, RenderFn, FREE_SYMBOL, RENDER_SYMBOL};
pub use loader::{cached_handle, load_count, LibraryLoader};

#[cfg(any(test, feature = "test-utils"))]
pub use loader::reset_for_tests;
pub use marshal::{encode_payload, TemplateSource};
