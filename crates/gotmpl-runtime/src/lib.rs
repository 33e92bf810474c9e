//! gotmpl runtime: a safe bridge to a native Go `text/template` renderer
//!
//! The renderer ships as a C-ABI shared library exporting two functions:
//! `RenderTemplate(template, json) -> char*` and `FreeString(char*)`. Every
//! outcome comes back as text; failures are marked by a sentinel prefix.
//! This crate provides:
//! - Load-once, process-wide resolution of the library ([`LibraryLoader`])
//! - Payload marshaling to the JSON the renderer parses
//! - Scoped ownership of the returned buffer ([`ffi::NativeBuffer`])
//! - Classification of the returned text ([`ResultClassifier`])
//! - Synchronous and async rendering ([`Engine`])

/// gotmpl runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod async_runtime;
pub mod classify;
pub mod engine;
pub mod error;
pub mod ffi;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;

pub use async_runtime::Offload;
pub use classify::{match_sentinel, ResultClassifier, SENTINELS};
pub use engine::{Engine, RenderOptions};
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use ffi::{LibraryLoader, NativeHandle};
