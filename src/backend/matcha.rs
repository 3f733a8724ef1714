//! The Matcha-family backend: acoustic model + Vocos vocoder + ISTFT.
//!
//! Three variants share the pipeline and differ in phonemization and
//! blank-token policy:
//!
//! | variant | phonemizer | blanks | vocoder |
//! |---|---|---|---|
//! | zh | jieba + lexicon | yes | vocos 22.05 kHz |
//! | en | espeak + Gruut-US | yes | vocos 22.05 kHz |
//! | zh-en | pinyin + IPA walker | no | vocos 16 kHz |

use crate::assets;
use crate::audio::AudioChunk;
use crate::config::{BackendKind, EngineConfig};
use crate::dsp::{resample_linear, Istft, PostProcessor};
use crate::error::{Result, TtsError};
use crate::phoneme::{en_text_to_token_ids, zh_en_text_to_token_ids, ZhPhonemizer};
use crate::phoneme::ipa::espeak_available;
use crate::text::{normalize, Lang, Lexicon, TokenMap};

use super::pipeline::{
    insert_blanks, load_session, meta_i64, require_io_names, run_acoustic, run_vocoder,
    MatchaSessions, MatchaState, DEFAULT_HOP_LENGTH, DEFAULT_LENGTH_SCALE, DEFAULT_N_FFT,
    DEFAULT_NOISE_SCALE, DEFAULT_WIN_LENGTH,
};
use super::SpeechBackend;

/// Token sequence the optional warmup pass feeds through the models.
const WARMUP_TOKENS: [i64; 3] = [1, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchaVariant {
    Zh,
    En,
    ZhEn,
}

impl MatchaVariant {
    fn from_kind(kind: BackendKind) -> Option<Self> {
        match kind {
            BackendKind::MatchaZh => Some(Self::Zh),
            BackendKind::MatchaEn => Some(Self::En),
            BackendKind::MatchaZhEn => Some(Self::ZhEn),
            _ => None,
        }
    }

    /// The monolingual models were trained with blanks between tokens;
    /// the bilingual one was not.
    fn uses_blank_tokens(&self) -> bool {
        !matches!(self, Self::ZhEn)
    }

    fn normalize_lang(&self) -> Lang {
        match self {
            Self::Zh => Lang::Zh,
            Self::En => Lang::En,
            Self::ZhEn => Lang::Auto,
        }
    }

    fn needs_espeak(&self) -> bool {
        !matches!(self, Self::Zh)
    }

    fn default_sample_rate(&self) -> u32 {
        match self {
            Self::Zh | Self::En => 22050,
            Self::ZhEn => 16000,
        }
    }
}

pub struct MatchaBackend {
    config: EngineConfig,
    variant: MatchaVariant,
    state: Option<MatchaState>,
    zh_phonemizer: Option<ZhPhonemizer>,
    speed: f32,
    speaker_id: i32,
}

impl MatchaBackend {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let variant = MatchaVariant::from_kind(config.backend).ok_or_else(|| {
            TtsError::UnsupportedLanguage(format!(
                "{} is not a Matcha backend",
                config.backend.as_str()
            ))
        })?;
        let speed = config.speech_rate;
        let speaker_id = config.speaker_id;
        Ok(Self {
            config,
            variant,
            state: None,
            zh_phonemizer: None,
            speed,
            speaker_id,
        })
    }

    /// The variant's `text_to_token_ids` hook.
    fn text_to_token_ids(&self, text: &str, tokens: &TokenMap) -> Result<Vec<i64>> {
        match self.variant {
            MatchaVariant::Zh => {
                let phonemizer = self
                    .zh_phonemizer
                    .as_ref()
                    .ok_or(TtsError::NotInitialized)?;
                Ok(phonemizer.text_to_token_ids(text, tokens))
            }
            MatchaVariant::En => en_text_to_token_ids(text, tokens),
            MatchaVariant::ZhEn => zh_en_text_to_token_ids(text, tokens),
        }
    }

    /// Effective output rate: the resample target when set, else native.
    fn output_rate(&self, state: &MatchaState) -> u32 {
        if self.config.output_sample_rate != 0
            && self.config.output_sample_rate != state.sample_rate
        {
            self.config.output_sample_rate
        } else {
            state.sample_rate
        }
    }

    /// Run tokens through acoustic, vocoder and ISTFT.
    fn infer(&self, state: &MatchaState, ids: &[i64]) -> Result<Vec<f32>> {
        // 1 / speech_rate scales the model's own length scale.
        let length_scale = state.length_scale / self.speed;
        let mut sessions = state
            .sessions
            .lock()
            .map_err(|_| TtsError::Internal("inference mutex poisoned".into()))?;

        let mel = run_acoustic(&mut sessions.acoustic, ids, state.noise_scale, length_scale)?;
        if mel.frames == 0 {
            return Ok(Vec::new());
        }
        let stft = run_vocoder(&mut sessions.vocoder, &mel)?;
        if stft.bins != state.istft.num_bins() {
            return Err(TtsError::SynthesisFailed(format!(
                "vocoder produced {} bins but n_fft implies {}",
                stft.bins,
                state.istft.num_bins()
            )));
        }
        Ok(state.istft.process(&stft.real, &stft.imag, stft.frames))
    }
}

impl SpeechBackend for MatchaBackend {
    fn initialize(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(TtsError::AlreadyInitialized);
        }
        if self.variant.needs_espeak() && !espeak_available() {
            return Err(TtsError::EspeakNotFound);
        }

        let paths = assets::matcha_paths(&self.config)?;

        let tokens = match self.variant {
            // The bilingual vocabulary is line-indexed from 1 and keeps a
            // bare-space line as the space token.
            MatchaVariant::ZhEn => TokenMap::from_lines_file(&paths.tokens, 1)?,
            _ => TokenMap::from_file_auto(&paths.tokens, 0)?,
        };
        if tokens.is_empty() {
            return Err(TtsError::Internal(format!(
                "empty token vocabulary at {}",
                paths.tokens.display()
            )));
        }

        if let Some(lexicon_path) = &paths.lexicon {
            let lexicon = Lexicon::from_file(lexicon_path)?;
            self.zh_phonemizer = Some(ZhPhonemizer::new(lexicon));
        }

        let acoustic = load_session(&paths.acoustic, self.config.num_threads)?;
        require_io_names(
            &acoustic,
            &["x", "x_length", "noise_scale", "length_scale"],
            &["mel"],
            "acoustic",
        )?;
        let vocoder = load_session(&paths.vocoder, self.config.num_threads)?;
        require_io_names(&vocoder, &["mels"], &["mag", "x", "y"], "vocoder")?;

        let pad_id = meta_i64(&acoustic, "pad_id", 0);
        let num_speakers = meta_i64(&acoustic, "n_speakers", 1).max(1) as usize;
        let sample_rate = meta_i64(
            &acoustic,
            "sample_rate",
            self.variant.default_sample_rate() as i64,
        ) as u32;

        let n_fft = meta_i64(&vocoder, "n_fft", DEFAULT_N_FFT as i64) as usize;
        let hop_length = meta_i64(&vocoder, "hop_length", DEFAULT_HOP_LENGTH as i64) as usize;
        let win_length = meta_i64(&vocoder, "win_length", DEFAULT_WIN_LENGTH as i64) as usize;

        if self.speaker_id as usize >= num_speakers {
            return Err(TtsError::InvalidConfig(format!(
                "speaker_id {} out of range, model has {num_speakers} speakers",
                self.speaker_id
            )));
        }

        log::info!(
            "matcha {:?} ready: {sample_rate} Hz, pad_id {pad_id}, n_fft {n_fft}, hop {hop_length}",
            self.variant
        );

        self.state = Some(MatchaState {
            sessions: std::sync::Mutex::new(MatchaSessions { acoustic, vocoder }),
            tokens,
            pad_id,
            num_speakers,
            sample_rate,
            noise_scale: DEFAULT_NOISE_SCALE,
            length_scale: DEFAULT_LENGTH_SCALE,
            istft: Istft::new(n_fft, hop_length, win_length),
        });

        if self.config.warmup {
            if let Some(state) = self.state.as_ref() {
                let ids = if self.variant.uses_blank_tokens() {
                    insert_blanks(&WARMUP_TOKENS, state.pad_id)
                } else {
                    WARMUP_TOKENS.to_vec()
                };
                match self.infer(state, &ids) {
                    Ok(samples) => log::debug!("warmup produced {} samples", samples.len()),
                    Err(e) => log::warn!("warmup inference failed: {e}"),
                }
            }
        }
        Ok(())
    }

    fn synthesize(&mut self, text: &str) -> Result<AudioChunk> {
        let state = self.state.as_ref().ok_or(TtsError::NotInitialized)?;

        let normalized = normalize(text, self.variant.normalize_lang());
        let ids = self.text_to_token_ids(&normalized, &state.tokens)?;
        let ids = if self.variant.uses_blank_tokens() {
            if ids.is_empty() {
                Vec::new()
            } else {
                insert_blanks(&ids, state.pad_id)
            }
        } else {
            ids
        };

        // An empty token sequence is a successful empty utterance.
        if ids.is_empty() {
            return Ok(AudioChunk::empty(self.output_rate(state)));
        }

        let mut samples = self.infer(state, &ids)?;
        if samples.is_empty() {
            return Ok(AudioChunk::empty(self.output_rate(state)));
        }

        let mut rate = state.sample_rate;
        if self.config.output_sample_rate != 0 && self.config.output_sample_rate != rate {
            samples = resample_linear(&samples, rate, self.config.output_sample_rate);
            rate = self.config.output_sample_rate;
        }

        PostProcessor::from_config(&self.config).process(&mut samples);
        Ok(AudioChunk::new(samples, rate))
    }

    fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(TtsError::InvalidConfig(format!(
                "speed must be positive, got {speed}"
            )));
        }
        self.speed = speed;
        Ok(())
    }

    fn set_speaker(&mut self, speaker_id: i32) -> Result<()> {
        if speaker_id < 0 {
            return Err(TtsError::InvalidConfig(format!(
                "speaker_id must be non-negative, got {speaker_id}"
            )));
        }
        if let Some(state) = &self.state {
            if speaker_id as usize >= state.num_speakers {
                return Err(TtsError::InvalidConfig(format!(
                    "speaker_id {speaker_id} out of range, model has {} speakers",
                    state.num_speakers
                )));
            }
        }
        self.speaker_id = speaker_id;
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.state
            .as_ref()
            .map(|s| s.sample_rate)
            .unwrap_or_else(|| self.variant.default_sample_rate())
    }

    fn num_speakers(&self) -> usize {
        self.state.as_ref().map(|s| s.num_speakers).unwrap_or(1)
    }

    fn shutdown(&mut self) {
        // MatchaState drops sessions before vocabularies by field order.
        self.state = None;
        self.zh_phonemizer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: BackendKind) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.backend = kind;
        config.model_dir = std::path::PathBuf::from("/nonexistent");
        config
    }

    #[test]
    fn variant_blank_policy() {
        assert!(MatchaVariant::Zh.uses_blank_tokens());
        assert!(MatchaVariant::En.uses_blank_tokens());
        assert!(!MatchaVariant::ZhEn.uses_blank_tokens());
    }

    #[test]
    fn kokoro_kind_is_rejected() {
        assert!(MatchaBackend::new(config(BackendKind::Kokoro)).is_err());
    }

    #[test]
    fn synthesize_before_init_is_not_initialized() {
        let mut backend = MatchaBackend::new(config(BackendKind::MatchaZh)).unwrap();
        let err = backend.synthesize("你好").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotInitialized);
    }

    #[test]
    fn init_without_models_is_model_not_found() {
        let mut backend = MatchaBackend::new(config(BackendKind::MatchaZh)).unwrap();
        let err = backend.initialize().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ModelNotFound);
    }

    #[test]
    fn setters_validate_without_mutating() {
        let mut backend = MatchaBackend::new(config(BackendKind::MatchaZh)).unwrap();
        assert!(backend.set_speed(0.0).is_err());
        assert!(backend.set_speed(-1.0).is_err());
        assert_eq!(backend.speed, 1.0, "failed set must not mutate");
        backend.set_speed(2.0).unwrap();
        assert_eq!(backend.speed, 2.0);

        assert!(backend.set_speaker(-1).is_err());
        assert_eq!(backend.speaker_id, 0);
    }

    #[test]
    fn default_rates_per_variant() {
        let backend = MatchaBackend::new(config(BackendKind::MatchaZhEn)).unwrap();
        assert_eq!(backend.sample_rate(), 16000);
        let backend = MatchaBackend::new(config(BackendKind::MatchaZh)).unwrap();
        assert_eq!(backend.sample_rate(), 22050);
    }
}
