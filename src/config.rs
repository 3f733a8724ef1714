//! Engine configuration.
//!
//! [`EngineConfig`] is constructed by the caller (directly, via
//! [`EngineConfigBuilder`], or from JSON for binding hosts) and is immutable
//! after engine init except for the dynamic setters on the engine facade.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};

/// Which synthesis pipeline a request is routed through.
///
/// `CosyVoice` and `Piper` are reserved identifiers: the factory recognizes
/// them but returns no backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Matcha acoustic model + Vocos vocoder, Chinese (icefall zh-baker).
    MatchaZh,
    /// Matcha acoustic model + Vocos vocoder, American English (ljspeech).
    MatchaEn,
    /// Matcha acoustic model + Vocos vocoder, code-switched Chinese-English.
    MatchaZhEn,
    /// Kokoro single-model pipeline, 24 kHz.
    Kokoro,
    /// Reserved, not implemented.
    CosyVoice,
    /// Reserved, not implemented.
    Piper,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MatchaZh => "matcha-zh",
            Self::MatchaEn => "matcha-en",
            Self::MatchaZhEn => "matcha-zh-en",
            Self::Kokoro => "kokoro",
            Self::CosyVoice => "cosyvoice",
            Self::Piper => "piper",
        }
    }
}

/// Upper bound accepted for a single synthesis call, in Unicode scalars.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Full engine configuration.
///
/// Invariants enforced by [`EngineConfig::validate`]:
/// `speech_rate > 0`, `speaker_id >= 0`, `volume` in `[0, 100]`,
/// `compression_ratio >= 1`, `compression_threshold` in `(0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(default, setter(into))]
pub struct EngineConfig {
    /// Pipeline selection.
    pub backend: BackendKind,
    /// Model cache root. Empty means the per-user cache directory.
    pub model_dir: PathBuf,
    /// Kokoro voice identifier, e.g. `"zf_xiaobei"`. Ignored by Matcha.
    pub voice: String,
    /// Speaker index for multi-speaker acoustic models.
    pub speaker_id: i32,
    /// Global speech rate multiplier. Must be positive.
    pub speech_rate: f32,
    /// Reserved. Accepted and stored but not wired into inference.
    pub pitch: f32,
    /// Requested native sample rate. Zero means "whatever the model emits".
    pub sample_rate: u32,
    /// Resample target. Zero disables resampling.
    pub output_sample_rate: u32,
    /// RMS target for loudness normalization.
    pub target_rms: f32,
    /// Dynamic-range compression ratio applied above the threshold.
    pub compression_ratio: f32,
    /// Compression knee threshold, in absolute sample amplitude.
    pub compression_threshold: f32,
    /// RMS normalization when true, peak normalization otherwise.
    pub use_rms_norm: bool,
    /// Enable DC-offset removal, edge fades and the DC blocker.
    pub remove_clicks: bool,
    /// Intra-op thread count for the neural sessions.
    pub num_threads: usize,
    /// Run a tiny inference pass right after init to pay first-call costs early.
    pub warmup: bool,
    /// Output volume in percent, 0-100.
    pub volume: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::MatchaZh,
            model_dir: PathBuf::new(),
            voice: String::from("zf_xiaobei"),
            speaker_id: 0,
            speech_rate: 1.0,
            pitch: 1.0,
            sample_rate: 0,
            output_sample_rate: 0,
            target_rms: 0.15,
            compression_ratio: 4.0,
            compression_threshold: 0.9,
            use_rms_norm: true,
            remove_clicks: true,
            num_threads: 4,
            warmup: false,
            volume: 100,
        }
    }
}

impl EngineConfig {
    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<()> {
        if !(self.speech_rate.is_finite() && self.speech_rate > 0.0) {
            return Err(TtsError::InvalidConfig(format!(
                "speech_rate must be positive, got {}",
                self.speech_rate
            )));
        }
        if self.speaker_id < 0 {
            return Err(TtsError::InvalidConfig(format!(
                "speaker_id must be non-negative, got {}",
                self.speaker_id
            )));
        }
        if self.volume > 100 {
            return Err(TtsError::InvalidConfig(format!(
                "volume must be in [0, 100], got {}",
                self.volume
            )));
        }
        if self.compression_ratio < 1.0 {
            return Err(TtsError::InvalidConfig(format!(
                "compression_ratio must be >= 1, got {}",
                self.compression_ratio
            )));
        }
        if !(self.compression_threshold > 0.0 && self.compression_threshold <= 1.0) {
            return Err(TtsError::InvalidConfig(format!(
                "compression_threshold must be in (0, 1], got {}",
                self.compression_threshold
            )));
        }
        if self.backend == BackendKind::Kokoro && self.voice.is_empty() {
            return Err(TtsError::InvalidConfig(
                "Kokoro backend requires a voice identifier".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a configuration from JSON, for binding hosts.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TtsError::InvalidConfig(format!("bad config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_overrides_fields() {
        let config = EngineConfigBuilder::default()
            .backend(BackendKind::Kokoro)
            .voice("zf_xiaobei")
            .speech_rate(1.5f32)
            .build()
            .unwrap();
        assert_eq!(config.backend, BackendKind::Kokoro);
        assert_eq!(config.speech_rate, 1.5);
        assert_eq!(config.volume, 100);
    }

    #[test]
    fn rejects_bad_rate_and_volume() {
        let mut config = EngineConfig::default();
        config.speech_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.volume = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_speaker() {
        let mut config = EngineConfig::default();
        config.speaker_id = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig::default();
        let parsed = EngineConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(parsed.backend, config.backend);
        assert_eq!(parsed.speech_rate, config.speech_rate);
    }

    #[test]
    fn kokoro_without_voice_is_invalid() {
        let mut config = EngineConfig::default();
        config.backend = BackendKind::Kokoro;
        config.voice.clear();
        assert!(config.validate().is_err());
    }
}
