//! Backend construction by kind.

use crate::config::{BackendKind, EngineConfig};
use crate::error::Result;

use super::{KokoroBackend, MatchaBackend, SpeechBackend};

const SUPPORTED: &[BackendKind] = &[
    BackendKind::MatchaZh,
    BackendKind::MatchaEn,
    BackendKind::MatchaZhEn,
    BackendKind::Kokoro,
];

/// Construct the backend for the configured kind.
///
/// Reserved kinds yield `None`; the engine turns that into an
/// `UnsupportedLanguage` error.
pub fn create_backend(config: &EngineConfig) -> Option<Result<Box<dyn SpeechBackend>>> {
    match config.backend {
        BackendKind::MatchaZh | BackendKind::MatchaEn | BackendKind::MatchaZhEn => Some(
            MatchaBackend::new(config.clone()).map(|b| Box::new(b) as Box<dyn SpeechBackend>),
        ),
        BackendKind::Kokoro => Some(
            KokoroBackend::new(config.clone()).map(|b| Box::new(b) as Box<dyn SpeechBackend>),
        ),
        BackendKind::CosyVoice | BackendKind::Piper => None,
    }
}

/// Whether the kind has a working implementation.
pub fn is_backend_supported(kind: BackendKind) -> bool {
    SUPPORTED.contains(&kind)
}

/// Kinds [`create_backend`] can construct.
pub fn supported_backends() -> &'static [BackendKind] {
    SUPPORTED
}
