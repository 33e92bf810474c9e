//! Marshaling: template and payload to NUL-terminated buffers
//!
//! - The template is converted once, when the engine is built, and passed
//!   byte-for-byte on every call.
//! - The payload is serialized to compact JSON per call. Non-ASCII text is
//!   emitted as UTF-8; map key order carries no meaning for the renderer.

use crate::error::{BridgeError, BridgeResult};
use serde::Serialize;
use std::ffi::{CStr, CString};

/// Immutable template text plus its C representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    text: String,
    c_text: CString,
}

impl TemplateSource {
    /// Fails with `InvalidTemplate` if the text contains a NUL byte, which
    /// a C string cannot carry.
    pub fn new(text: impl Into<String>) -> BridgeResult<Self> {
        let text = text.into();
        let c_text = CString::new(text.as_bytes()).map_err(|e| BridgeError::InvalidTemplate {
            position: e.nul_position(),
        })?;
        Ok(Self { text, c_text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_c_str(&self) -> &CStr {
        &self.c_text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Serialize render data to the JSON buffer the renderer parses
///
/// Anything JSON cannot express (maps with non-string keys, a `Serialize`
/// impl that reports an error) fails with `SerializationError`.
pub fn encode_payload<T>(payload: &T) -> BridgeResult<CString>
where
    T: Serialize + ?Sized,
{
    let bytes = serde_json::to_vec(payload).map_err(BridgeError::serialization)?;
    // serde_json escapes U+0000, so a NUL here means a broken serializer
    CString::new(bytes).map_err(|e| {
        BridgeError::serialization(format!("encoded data contains NUL at {}", e.nul_position()))
    })
}
