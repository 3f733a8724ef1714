//! # zhtts
//!
//! Offline text-to-speech for Chinese, English, and code-switched
//! Chinese-English input. All acoustic inference runs on the local CPU via
//! ONNX Runtime; the only external process is the espeak-ng phonemizer for
//! English text.
//!
//! ## Backends
//!
//! - **Matcha-ZH**: Matcha acoustic model (icefall zh-baker) + Vocos
//!   vocoder, 22.05 kHz
//! - **Matcha-EN**: Matcha (ljspeech) + Vocos, 22.05 kHz
//! - **Matcha-ZH-EN**: bilingual Matcha + Vocos, 16 kHz
//! - **Kokoro**: single end-to-end model, 24 kHz
//!
//! ## Quick Start
//!
//! ```no_run
//! use zhtts::{EngineConfig, TtsEngine};
//! use std::path::Path;
//!
//! let mut engine = TtsEngine::new(EngineConfig::default())?;
//! let result = engine.synthesize("你好世界");
//! assert!(result.is_success());
//! result.write_wav(Path::new("hello.wav"))?;
//! # Ok::<(), zhtts::TtsError>(())
//! ```
//!
//! Model files live under a cache directory (see [`assets`]); download
//! them with the companion fetch tool or point `model_dir` at an existing
//! layout.

pub mod assets;
pub mod audio;
pub mod backend;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod phoneme;
pub mod text;

pub use audio::{AudioChunk, SentenceInfo, SynthesisResult};
pub use backend::{create_backend, is_backend_supported, supported_backends, SpeechBackend};
pub use config::{BackendKind, EngineConfig, EngineConfigBuilder};
pub use engine::{StreamingHandler, TtsEngine};
pub use error::{ErrorInfo, ErrorKind, Result, TtsError};

/// Install an env_logger for hosts that have no logger of their own.
///
/// Honors `RUST_LOG`; defaults to `info` for this crate. Safe to call more
/// than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("zhtts=info"),
    )
    .try_init();
}
