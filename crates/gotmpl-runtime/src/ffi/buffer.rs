//! Ownership of the renderer's result buffer
//!
//! The renderer allocates the result and only the renderer may free it.
//! [`NativeBuffer`] owns one such pointer and hands it back through
//! `FreeString` exactly once, when it is dropped: after a successful decode,
//! after a classified error, after a decode failure, or while unwinding.

use crate::ffi::handle::NativeHandle;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr::NonNull;
use std::str::Utf8Error;

/// RAII guard over a native-owned, NUL-terminated buffer
pub struct NativeBuffer<'h> {
    ptr: NonNull<c_char>,
    handle: &'h NativeHandle,
}

impl<'h> NativeBuffer<'h> {
    /// Take ownership of a pointer returned by `handle`'s render entry point.
    /// Returns `None` for NULL, which must never be passed to `FreeString`.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be a NUL-terminated buffer returned by
    /// `handle` that nobody else frees or retains.
    pub(crate) unsafe fn from_raw(ptr: *mut c_char, handle: &'h NativeHandle) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, handle })
    }

    /// Raw content without the terminating NUL
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the pointer is live and NUL-terminated until drop.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_bytes()
    }

    /// Borrow the content as UTF-8
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }
}

impl Drop for NativeBuffer<'_> {
    fn drop(&mut self) {
        // SAFETY: ownership was transferred in `from_raw`; drop runs once.
        unsafe { self.handle.free_raw(self.ptr.as_ptr()) }
    }
}
