//! In-process stand-ins for the native entry points used by unit tests
//!
//! `echo_render` returns the template text itself, so a test picks the exact
//! native output by picking the template. Two templates are special:
//! `<null>` returns a NULL pointer and `<invalid-utf8>` returns bytes that are
//! not UTF-8. `counting_free` tracks live buffers the way the Go renderer's
//! string pool does and counts frees of unknown pointers instead of crashing.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

static FREES: AtomicUsize = AtomicUsize::new(0);
static UNKNOWN_FREES: AtomicUsize = AtomicUsize::new(0);
static LIVE: Mutex<Vec<usize>> = Mutex::new(Vec::new());

pub const NULL_TEMPLATE: &str = "<null>";
pub const INVALID_UTF8_TEMPLATE: &str = "<invalid-utf8>";

pub fn alloc(bytes: Vec<u8>) -> *mut c_char {
    let ptr = CString::new(bytes).unwrap().into_raw();
    LIVE.lock().unwrap().push(ptr as usize);
    ptr
}

pub unsafe extern "C" fn echo_render(template: *const c_char, _data: *const c_char) -> *mut c_char {
    let template = CStr::from_ptr(template).to_bytes();
    if template == NULL_TEMPLATE.as_bytes() {
        return std::ptr::null_mut();
    }
    if template == INVALID_UTF8_TEMPLATE.as_bytes() {
        return alloc(vec![0xff, 0xfe, b'A']);
    }
    alloc(template.to_vec())
}

pub unsafe extern "C" fn counting_free(ptr: *mut c_char) {
    FREES.fetch_add(1, Ordering::SeqCst);
    let mut live = LIVE.lock().unwrap();
    match live.iter().position(|p| *p == ptr as usize) {
        Some(index) => {
            live.swap_remove(index);
            drop(CString::from_raw(ptr));
        }
        None => {
            UNKNOWN_FREES.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub fn frees() -> usize {
    FREES.load(Ordering::SeqCst)
}

pub fn unknown_frees() -> usize {
    UNKNOWN_FREES.load(Ordering::SeqCst)
}

pub fn live_buffers() -> usize {
    LIVE.lock().unwrap().len()
}

pub fn reset_counters() {
    FREES.store(0, Ordering::SeqCst);
    UNKNOWN_FREES.store(0, Ordering::SeqCst);
    LIVE.lock().unwrap().clear();
}
