//! Error taxonomy for the renderer bridge

use gotmpl_config::ConfigError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type BridgeResult<T> = Result<T, BridgeError>;

/// Discriminant of a [`BridgeError`], for matching without destructuring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LibraryNotFound,
    LibraryLoadFailure,
    InvalidTemplate,
    Config,
    Serialization,
    NativeJson,
    NativeParse,
    NativeExecute,
    Decoding,
    UnknownNativeFailure,
    WorkerFailed,
}

impl ErrorKind {
    /// Kinds reported by the native renderer itself
    pub fn is_native(self) -> bool {
        matches!(
            self,
            ErrorKind::NativeJson
                | ErrorKind::NativeParse
                | ErrorKind::NativeExecute
                | ErrorKind::UnknownNativeFailure
        )
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(
        "Shared library not found at: {}. Try reinstalling the package so the renderer artifact is rebuilt.",
        path.display()
    )]
    LibraryNotFound { path: PathBuf },

    #[error("Failed to load shared library {}: {reason}", path.display())]
    LibraryLoadFailure { path: PathBuf, reason: String },

    #[error("Template contains a NUL byte at offset {position} and cannot be passed to the renderer")]
    InvalidTemplate { position: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to serialize render data: {reason}")]
    SerializationError { reason: String },

    #[error("{message}")]
    NativeJsonError { message: String },

    #[error("{message}")]
    NativeParseError { message: String },

    #[error("{message}")]
    NativeExecuteError { message: String },

    #[error("Renderer returned invalid UTF-8: {0}")]
    DecodingError(#[from] std::str::Utf8Error),

    #[error("Unrecognized renderer failure: {message}")]
    UnknownNativeFailure { message: String },

    #[error("Render worker failed: {0}")]
    WorkerFailed(String),
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::LibraryNotFound { .. } => ErrorKind::LibraryNotFound,
            BridgeError::LibraryLoadFailure { .. } => ErrorKind::LibraryLoadFailure,
            BridgeError::InvalidTemplate { .. } => ErrorKind::InvalidTemplate,
            BridgeError::Config(_) => ErrorKind::Config,
            BridgeError::SerializationError { .. } => ErrorKind::Serialization,
            BridgeError::NativeJsonError { .. } => ErrorKind::NativeJson,
            BridgeError::NativeParseError { .. } => ErrorKind::NativeParse,
            BridgeError::NativeExecuteError { .. } => ErrorKind::NativeExecute,
            BridgeError::DecodingError(_) => ErrorKind::Decoding,
            BridgeError::UnknownNativeFailure { .. } => ErrorKind::UnknownNativeFailure,
            BridgeError::WorkerFailed(_) => ErrorKind::WorkerFailed,
        }
    }

    /// Whether the renderer itself rejected the call
    pub fn is_native(&self) -> bool {
        self.kind().is_native()
    }

    /// Full native message for renderer-reported failures
    pub fn native_message(&self) -> Option<&str> {
        match self {
            BridgeError::NativeJsonError { message }
            | BridgeError::NativeParseError { message }
            | BridgeError::NativeExecuteError { message }
            | BridgeError::UnknownNativeFailure { message } => Some(message),
            _ => None,
        }
    }

    /// Build the error for a classified native message
    ///
    /// Kinds that are not native failures fall back to `UnknownNativeFailure`.
    pub fn native(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::NativeJson => BridgeError::NativeJsonError { message },
            ErrorKind::NativeParse => BridgeError::NativeParseError { message },
            ErrorKind::NativeExecute => BridgeError::NativeExecuteError { message },
            _ => BridgeError::UnknownNativeFailure { message },
        }
    }

    pub fn library_not_found(path: impl Into<PathBuf>) -> Self {
        Self::LibraryNotFound { path: path.into() }
    }

    pub fn load_failure(path: &Path, reason: impl ToString) -> Self {
        Self::LibraryLoadFailure {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn serialization(reason: impl ToString) -> Self {
        Self::SerializationError {
            reason: reason.to_string(),
        }
    }
}
