//! Classification of native output
//!
//! The renderer reports every outcome as plain text. Failures start with a
//! fixed sentinel prefix; anything else is the rendered output.

use crate::error::{BridgeError, BridgeResult, ErrorKind};
use tracing::warn;

/// Sentinel prefixes in match order
pub const SENTINELS: &[(&str, ErrorKind)] = &[
    ("JSON_ERROR:", ErrorKind::NativeJson),
    ("TEMPLATE_PARSE_ERROR:", ErrorKind::NativeParse),
    ("TEMPLATE_EXECUTE_ERROR:", ErrorKind::NativeExecute),
];

/// Kind of the first sentinel `text` starts with
pub fn match_sentinel(text: &str) -> Option<ErrorKind> {
    SENTINELS
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

/// Whether `text` opens with something shaped like a sentinel: an upper-case
/// identifier ending in `_ERROR`, immediately followed by `:`.
pub fn looks_like_sentinel(text: &str) -> bool {
    let Some((head, _)) = text.split_once(':') else {
        return false;
    };
    head.len() > "_ERROR".len()
        && head.ends_with("_ERROR")
        && head.starts_with(|c: char| c.is_ascii_uppercase())
        && head
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Maps decoded native text to the render result
///
/// In strict mode (the default) any output shaped like an unknown sentinel
/// is rejected, including legitimate template output such as
/// `HTTP_ERROR: 404` at the very start. Use lenient mode for templates that
/// can produce such text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultClassifier {
    strict: bool,
}

impl ResultClassifier {
    /// `strict` turns unknown sentinel-shaped prefixes into
    /// `UnknownNativeFailure` instead of success.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn classify(&self, text: &str) -> BridgeResult<String> {
        if let Some(kind) = match_sentinel(text) {
            warn!(?kind, message = text, "renderer reported an error");
            return Err(BridgeError::native(kind, text));
        }

        if self.strict && looks_like_sentinel(text) {
            warn!(message = text, "renderer output starts with an unknown error sentinel");
            return Err(BridgeError::UnknownNativeFailure {
                message: text.to_string(),
            });
        }

        Ok(text.to_string())
    }
}

impl Default for ResultClassifier {
    fn default() -> Self {
        Self::new(true)
    }
}
