//! Error types for the synthesis engine.
//!
//! Internal plumbing uses [`TtsError`] with `?` propagation. The public
//! synthesis call wraps failures into a plain [`ErrorInfo`] value carried by
//! the result envelope, so binding hosts can check a tag instead of matching
//! a Rust enum.

use serde::{Deserialize, Serialize};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TtsError>;

/// Stable error tags exposed to embedding hosts.
///
/// `Ok` is tag zero; every other tag maps onto one [`TtsError`] family.
/// The network tags are reserved for the model downloader, which lives
/// outside this crate but shares the same code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Ok = 0,
    InvalidConfig,
    ModelNotFound,
    UnsupportedLanguage,
    InvalidText,
    TextTooLong,
    NotInitialized,
    AlreadyInitialized,
    SynthesisFailed,
    Timeout,
    FetchFailed,
    ConnectionFailed,
    AuthFailed,
    Internal,
    OutOfMemory,
    FileWriteFailed,
}

/// Plain error value carried by a synthesis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: String,
}

impl ErrorInfo {
    /// The "no error" value.
    pub fn ok() -> Self {
        Self {
            kind: ErrorKind::Ok,
            message: String::new(),
            detail: String::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.kind == ErrorKind::Ok
    }
}

impl Default for ErrorInfo {
    fn default() -> Self {
        Self::ok()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TtsError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("model file not found: {0}")]
    ModelNotFound(String),

    #[error("unsupported language or backend: {0}")]
    UnsupportedLanguage(String),

    #[error("invalid input text: {0}")]
    InvalidText(String),

    #[error("input text too long: {got} characters (limit {limit})")]
    TextTooLong { got: usize, limit: usize },

    #[error("engine not initialized, call initialize() first")]
    NotInitialized,

    #[error("engine already initialized")]
    AlreadyInitialized,

    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,

    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("failed to write audio file: {0}")]
    FileWrite(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl TtsError {
    /// Stable tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::ModelNotFound(_) => ErrorKind::ModelNotFound,
            Self::UnsupportedLanguage(_) => ErrorKind::UnsupportedLanguage,
            Self::InvalidText(_) => ErrorKind::InvalidText,
            Self::TextTooLong { .. } => ErrorKind::TextTooLong,
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::SynthesisFailed(_) => ErrorKind::SynthesisFailed,
            Self::EspeakNotFound => ErrorKind::ModelNotFound,
            Self::Ort(_) => ErrorKind::Internal,
            Self::Io(_) => ErrorKind::Internal,
            Self::Shape(_) => ErrorKind::Internal,
            Self::FileWrite(_) => ErrorKind::FileWriteFailed,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert into the plain value carried by result envelopes.
    pub fn info(&self) -> ErrorInfo {
        let message = match self.kind() {
            ErrorKind::InvalidConfig => "invalid configuration",
            ErrorKind::ModelNotFound => "model file not found",
            ErrorKind::UnsupportedLanguage => "unsupported language",
            ErrorKind::InvalidText => "invalid input text",
            ErrorKind::TextTooLong => "input text too long",
            ErrorKind::NotInitialized => "engine not initialized",
            ErrorKind::AlreadyInitialized => "engine already initialized",
            ErrorKind::SynthesisFailed => "synthesis failed",
            ErrorKind::FileWriteFailed => "file write failed",
            _ => "internal error",
        };
        ErrorInfo {
            kind: self.kind(),
            message: message.to_string(),
            detail: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_info_has_zero_tag() {
        let info = ErrorInfo::ok();
        assert_eq!(info.kind, ErrorKind::Ok);
        assert!(info.is_ok());
    }

    #[test]
    fn error_kind_mapping_is_stable() {
        assert_eq!(
            TtsError::InvalidText("empty".into()).kind(),
            ErrorKind::InvalidText
        );
        assert_eq!(TtsError::NotInitialized.kind(), ErrorKind::NotInitialized);
        assert_eq!(
            TtsError::SynthesisFailed("boom".into()).kind(),
            ErrorKind::SynthesisFailed
        );
    }

    #[test]
    fn info_carries_display_as_detail() {
        let err = TtsError::TextTooLong { got: 9000, limit: 5000 };
        let info = err.info();
        assert_eq!(info.kind, ErrorKind::TextTooLong);
        assert!(info.detail.contains("9000"));
        assert!(!info.is_ok());
    }
}
