//! Synthesis backends and the factory that constructs them.
//!
//! A backend owns its neural sessions, vocabulary, and phonemizer state.
//! The engine facade drives exactly one backend through the object-safe
//! [`SpeechBackend`] trait.

pub mod factory;
pub mod kokoro;
pub mod matcha;
pub mod pipeline;
pub mod voices;

pub use factory::{create_backend, is_backend_supported, supported_backends};
pub use kokoro::KokoroBackend;
pub use matcha::MatchaBackend;

use crate::audio::AudioChunk;
use crate::error::Result;

/// Capability set every backend implements.
///
/// Lifecycle: uninitialized -> initialized -> shut down. `initialize` on an
/// initialized backend fails with `AlreadyInitialized`; `synthesize` before
/// init (or after shutdown) fails with `NotInitialized`.
pub trait SpeechBackend: Send {
    /// Load models and vocabularies. Fails if already initialized.
    fn initialize(&mut self) -> Result<()>;

    /// Synthesize one utterance. Text arrives already validated non-empty.
    fn synthesize(&mut self, text: &str) -> Result<AudioChunk>;

    /// Change the global speech rate. Invalid values error without
    /// mutating state.
    fn set_speed(&mut self, speed: f32) -> Result<()>;

    /// Change the speaker index. Validated against the model's speaker
    /// count when the backend is initialized.
    fn set_speaker(&mut self, speaker_id: i32) -> Result<()>;

    /// Native output rate of the loaded model.
    fn sample_rate(&self) -> u32;

    /// Number of speakers the acoustic model carries.
    fn num_speakers(&self) -> usize;

    /// Drop sessions and vocabularies. Further synthesize calls fail with
    /// `NotInitialized`.
    fn shutdown(&mut self);
}
