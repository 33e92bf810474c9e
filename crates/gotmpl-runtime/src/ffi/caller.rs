//! The synchronous native render call
//!
//! The call is atomic from this side: it returns a buffer or the process
//! dies with the renderer. Nothing here interprets the buffer's content.

use crate::error::{BridgeError, BridgeResult};
use crate::ffi::buffer::NativeBuffer;
use crate::ffi::handle::NativeHandle;
use std::ffi::CStr;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Held around every native call when calls are serialized
static CALL_LOCK: Mutex<()> = Mutex::new(());

/// Call the render entry point on the current thread
///
/// With `serialize` set, the call waits for every other serialized call in
/// the process to finish first. A NULL result is reported as
/// `UnknownNativeFailure` and never handed to `FreeString`.
pub fn invoke<'h>(
    handle: &'h NativeHandle,
    template: &CStr,
    data: &CStr,
    serialize: bool,
) -> BridgeResult<NativeBuffer<'h>> {
    debug!(
        template_bytes = template.to_bytes().len(),
        data_bytes = data.to_bytes().len(),
        serialize,
        "calling native renderer"
    );

    let raw = {
        let _guard = serialize.then(|| CALL_LOCK.lock().unwrap_or_else(PoisonError::into_inner));
        // SAFETY: both arguments are NUL-terminated and outlive the call; the
        // handle's constructors guarantee the entry point signature.
        unsafe { handle.render_raw(template.as_ptr(), data.as_ptr()) }
    };

    // SAFETY: `raw` came from this handle's render entry point just now.
    unsafe { NativeBuffer::from_raw(raw, handle) }.ok_or_else(|| {
        BridgeError::UnknownNativeFailure {
            message: "renderer returned a null buffer".to_string(),
        }
    })
}
