//! The Kokoro backend: a single end-to-end session mapping token ids, a
//! style vector and a speed scalar straight to a waveform.
//!
//! Differences from the Matcha family: one session instead of two, a fixed
//! 24 kHz output rate with no resampling, no blank insertion, no ISTFT,
//! and an inverted speed input (`1 / speech_rate`).

use std::sync::Mutex;

use ndarray::{arr1, Array2};
use ort::inputs;
use ort::session::Session;
use ort::value::TensorRef;

use crate::assets;
use crate::audio::AudioChunk;
use crate::config::{BackendKind, EngineConfig};
use crate::dsp::PostProcessor;
use crate::error::{Result, TtsError};
use crate::phoneme::ipa::espeak_available;
use crate::phoneme::KokoroPhonemizer;
use crate::text::{normalize, Lang};

use super::pipeline::{load_session, require_io_names};
use super::voices::{VoiceStyle, STYLE_DIM};
use super::SpeechBackend;

/// The model's fixed output rate.
pub const KOKORO_SAMPLE_RATE: u32 = 24000;

struct KokoroState {
    session: Mutex<Session>,
    voice: VoiceStyle,
}

pub struct KokoroBackend {
    config: EngineConfig,
    phonemizer: KokoroPhonemizer,
    state: Option<KokoroState>,
    speed: f32,
}

impl KokoroBackend {
    pub fn new(config: EngineConfig) -> Result<Self> {
        if config.backend != BackendKind::Kokoro {
            return Err(TtsError::UnsupportedLanguage(format!(
                "{} is not the Kokoro backend",
                config.backend.as_str()
            )));
        }
        let speed = config.speech_rate;
        Ok(Self {
            config,
            phonemizer: KokoroPhonemizer::new(),
            state: None,
            speed,
        })
    }

    fn run_inference(&self, state: &KokoroState, ids: &[i64], style: &[f32]) -> Result<Vec<f32>> {
        let len = ids.len();
        let input_ids = Array2::from_shape_vec((1, len), ids.to_vec())?;
        let style_arr = Array2::from_shape_vec((1, STYLE_DIM), style.to_vec())?;
        // The session expects the inverse of the speech rate.
        let speed_arr = arr1(&[1.0f32 / self.speed]);

        let mut session = state
            .session
            .lock()
            .map_err(|_| TtsError::Internal("inference mutex poisoned".into()))?;
        let outputs = session
            .run(inputs![
                "input_ids" => TensorRef::from_array_view(input_ids.view())?,
                "style" => TensorRef::from_array_view(style_arr.view())?,
                "speed" => TensorRef::from_array_view(speed_arr.view())?,
            ])
            .map_err(|e| TtsError::SynthesisFailed(format!("kokoro inference: {e}")))?;

        let waveform_value = outputs
            .iter()
            .find(|(name, _)| *name == "waveform")
            .ok_or_else(|| {
                TtsError::SynthesisFailed("kokoro model produced no 'waveform'".into())
            })?
            .1;
        let waveform = waveform_value
            .try_extract_array::<f32>()
            .map_err(|e| TtsError::SynthesisFailed(format!("waveform extraction: {e}")))?;

        Ok(waveform.iter().copied().collect())
    }
}

impl SpeechBackend for KokoroBackend {
    fn initialize(&mut self) -> Result<()> {
        if self.state.is_some() {
            return Err(TtsError::AlreadyInitialized);
        }
        // English runs go through espeak; Chinese-only use still works
        // without it, so absence only warns here.
        if !espeak_available() {
            log::warn!("espeak-ng not found; Kokoro will skip English segments");
        }

        let paths = assets::kokoro_paths(&self.config)?;
        let session = load_session(&paths.model, self.config.num_threads)?;
        require_io_names(&session, &["input_ids", "style", "speed"], &["waveform"], "kokoro")?;
        let voice = VoiceStyle::load(&paths.voice)?;

        log::info!(
            "kokoro ready: voice {} with {} style rows",
            self.config.voice,
            voice.num_rows()
        );
        self.state = Some(KokoroState {
            session: Mutex::new(session),
            voice,
        });

        if self.config.warmup {
            if let Some(state) = self.state.as_ref() {
                let ids = [0i64, 1, 2, 3, 0];
                let style = state.voice.row(3).to_vec();
                match self.run_inference(state, &ids, &style) {
                    Ok(samples) => log::debug!("warmup produced {} samples", samples.len()),
                    Err(e) => log::warn!("warmup inference failed: {e}"),
                }
            }
        }
        Ok(())
    }

    fn synthesize(&mut self, text: &str) -> Result<AudioChunk> {
        let state = self.state.as_ref().ok_or(TtsError::NotInitialized)?;

        let normalized = normalize(text, Lang::Auto);
        let ids = self.phonemizer.text_to_token_ids(&normalized)?;
        // Two sentinels and nothing else means no content survived.
        if ids.len() <= 2 {
            return Ok(AudioChunk::empty(KOKORO_SAMPLE_RATE));
        }

        // Style row keyed by content token count, clamped by the store.
        let content_len = ids.len() - 2;
        let style = state.voice.row(content_len).to_vec();

        let mut samples = self.run_inference(state, &ids, &style)?;
        if samples.is_empty() {
            return Ok(AudioChunk::empty(KOKORO_SAMPLE_RATE));
        }

        PostProcessor::from_config(&self.config).process(&mut samples);
        Ok(AudioChunk::new(samples, KOKORO_SAMPLE_RATE))
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
        // Kokoro selects voices by file, not speaker index; only 0 is valid.
        if speaker_id != 0 {
            return Err(TtsError::InvalidConfig(format!(
                "kokoro has a single speaker per voice file, got {speaker_id}"
            )));
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        KOKORO_SAMPLE_RATE
    }

    fn num_speakers(&self) -> usize {
        1
    }

    fn shutdown(&mut self) {
        self.state = None;
    }
}
