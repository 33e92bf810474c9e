//! Shared test utilities: an in-process renderer speaking the native ABI
//!
//! `fake_render` imitates the Go renderer closely enough for the bridge:
//! it parses the JSON data, substitutes `{{.Field.Path}}` actions, and
//! reports failures with the same sentinel prefixes. A few extra actions
//! and template prefixes let tests steer it:
//! - `{{json .}}` writes the data back as JSON
//! - `{{sleep N}}` blocks the native call for N milliseconds
//! - `!raw:<text>` returns `<text>` verbatim
//! - `!invalid-utf8` returns bytes that are not UTF-8
//! - `!null` returns a NULL pointer
//!
//! Every buffer it hands out is tracked; `fake_free` counts releases and
//! records frees of pointers it does not own instead of crashing.

#![allow(dead_code)]

use gotmpl_runtime::{BridgeResult, NativeHandle};
use serde_json::Value;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub use pretty_assertions::{assert_eq, assert_ne};

static RENDER_CALLS: AtomicUsize = AtomicUsize::new(0);
static FREES: AtomicUsize = AtomicUsize::new(0);
static UNKNOWN_FREES: AtomicUsize = AtomicUsize::new(0);
static LIVE: Mutex<Vec<usize>> = Mutex::new(Vec::new());

fn store(bytes: Vec<u8>) -> *mut c_char {
    let ptr = CString::new(bytes).expect("fake output has no NUL").into_raw();
    LIVE.lock().unwrap().push(ptr as usize);
    ptr
}

pub unsafe extern "C" fn fake_render(template: *const c_char, data: *const c_char) -> *mut c_char {
    RENDER_CALLS.fetch_add(1, Ordering::SeqCst);
    let template = CStr::from_ptr(template).to_string_lossy().into_owned();
    let data = CStr::from_ptr(data).to_bytes();

    if template == "!null" {
        return std::ptr::null_mut();
    }
    if template == "!invalid-utf8" {
        return store(vec![b'o', b'k', 0xff, 0xfe]);
    }
    if let Some(raw) = template.strip_prefix("!raw:") {
        return store(raw.as_bytes().to_vec());
    }

    let data: Value = match serde_json::from_slice(data) {
        Ok(value) => value,
        Err(e) => return store(format!("JSON_ERROR: {}", e).into_bytes()),
    };

    match execute(&template, &data) {
        Ok(text) => store(text.into_bytes()),
        Err(message) => store(message.into_bytes()),
    }
}

pub unsafe extern "C" fn fake_free(ptr: *mut c_char) {
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

fn execute(template: &str, data: &Value) -> Result<String, String> {
    let mut out = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| {
            "TEMPLATE_PARSE_ERROR: template: ollama:1: unclosed action".to_string()
        })?;
        out.push_str(&action(after[..end].trim(), data)?);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn action(action: &str, data: &Value) -> Result<String, String> {
    if action == "json ." {
        return Ok(data.to_string());
    }
    if let Some(ms) = action.strip_prefix("sleep ") {
        let ms: u64 = ms
            .trim()
            .parse()
            .map_err(|_| format!("TEMPLATE_PARSE_ERROR: bad sleep argument {:?}", ms))?;
        std::thread::sleep(Duration::from_millis(ms));
        return Ok(String::new());
    }
    if action == "." {
        return Ok(format_value(data));
    }
    let Some(path) = action.strip_prefix('.') else {
        let name = action.split_whitespace().next().unwrap_or_default();
        return Err(format!(
            "TEMPLATE_PARSE_ERROR: template: ollama:1: function {:?} not defined",
            name
        ));
    };

    let mut current = data;
    for field in path.split('.') {
        current = match current {
            Value::Object(map) => match map.get(field) {
                Some(value) => value,
                None => return Ok("<no value>".to_string()),
            },
            other => {
                return Err(format!(
                    "TEMPLATE_EXECUTE_ERROR: template: ollama:1: executing \"ollama\" at <.{}>: can't evaluate field {} in type {}",
                    path,
                    field,
                    go_type(other)
                ))
            }
        };
    }
    Ok(format_value(current))
}

fn go_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "interface {}",
        Value::Bool(_) => "bool",
        Value::Number(_) => "float64",
        Value::String(_) => "string",
        Value::Array(_) => "[]interface {}",
        Value::Object(_) => "map[string]interface {}",
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "<no value>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", k, format_value(&map[k])))
                .collect();
            format!("map[{}]", parts.join(" "))
        }
    }
}

/// Handle backed by the fake renderer
pub fn fake_handle() -> NativeHandle {
    unsafe { NativeHandle::from_raw(fake_render, fake_free) }
}

/// Open step for `LibraryLoader::ensure_loaded_with`
pub fn fake_open(_: &Path) -> BridgeResult<NativeHandle> {
    Ok(fake_handle())
}

pub fn render_calls() -> usize {
    RENDER_CALLS.load(Ordering::SeqCst)
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
    RENDER_CALLS.store(0, Ordering::SeqCst);
    FREES.store(0, Ordering::SeqCst);
    UNKNOWN_FREES.store(0, Ordering::SeqCst);
    LIVE.lock().unwrap().clear();
}

/// Every buffer handed out was released exactly once
pub fn assert_all_reclaimed() {
    assert_eq!(live_buffers(), 0, "native buffers leaked");
    assert_eq!(unknown_frees(), 0, "unknown or double free");
}
