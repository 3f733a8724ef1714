//! The engine facade: owns one backend, wraps every call in the result
//! envelope, and fakes streaming with a single event per utterance.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::audio::{AudioChunk, SynthesisResult};
use crate::backend::{create_backend, SpeechBackend};
use crate::config::{EngineConfig, MAX_TEXT_CHARS};
use crate::error::{ErrorInfo, Result, TtsError};

/// Callbacks for the pseudo-streaming call.
///
/// The engine emits `on_open`, then one `on_event` with the full result,
/// then `on_complete` (or `on_error`), then `on_close`. Partial progress
/// is never emitted.
pub trait StreamingHandler {
    fn on_open(&mut self) {}
    fn on_event(&mut self, _result: &SynthesisResult) {}
    fn on_complete(&mut self) {}
    fn on_error(&mut self, _error: &ErrorInfo) {}
    fn on_close(&mut self) {}
}

/// Blocking text-to-speech engine over one configured backend.
///
/// Construction validates the config, builds the backend, and initializes
/// it (loading models). Synthesis runs on the caller's thread; concurrent
/// use from several threads serializes on the backend's inference mutex.
pub struct TtsEngine {
    config: EngineConfig,
    backend: Box<dyn SpeechBackend>,
    next_request_id: AtomicU64,
}

impl TtsEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let backend = create_backend(&config)
            .ok_or_else(|| {
                TtsError::UnsupportedLanguage(format!(
                    "backend {} is reserved and has no implementation",
                    config.backend.as_str()
                ))
            })??;
        let mut engine = Self {
            config,
            backend,
            next_request_id: AtomicU64::new(1),
        };
        engine.backend.initialize()?;
        Ok(engine)
    }

    /// Test seam: wrap an already-built backend without touching disk.
    #[cfg(test)]
    fn with_backend(config: EngineConfig, backend: Box<dyn SpeechBackend>) -> Self {
        Self {
            config,
            backend,
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Synthesize one utterance, blocking until the audio is ready.
    ///
    /// Never returns `Err`: failures are reported inside the envelope so
    /// binding hosts always get timings and an error tag to check.
    pub fn synthesize(&mut self, text: &str) -> SynthesisResult {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();
        match self.synthesize_inner(text) {
            Ok(audio) => {
                let elapsed = start.elapsed().as_millis() as u64;
                let result = SynthesisResult::ok(request_id, text, audio, elapsed);
                log::info!(
                    "request {request_id}: {} ms audio in {} ms (rtf {:.3})",
                    result.audio_duration_ms,
                    result.processing_time_ms,
                    result.rtf
                );
                result
            }
            Err(err) => {
                log::warn!("request {request_id} failed: {err}");
                SynthesisResult::from_error(request_id, &err, start.elapsed().as_millis() as u64)
            }
        }
    }

    fn synthesize_inner(&mut self, text: &str) -> Result<AudioChunk> {
        if text.trim().is_empty() {
            return Err(TtsError::InvalidText("input text is empty".into()));
        }
        let char_count = text.chars().count();
        if char_count > MAX_TEXT_CHARS {
            return Err(TtsError::TextTooLong {
                got: char_count,
                limit: MAX_TEXT_CHARS,
            });
        }

        let mut chunk = self.backend.synthesize(text)?;
        let gain = f32::from(self.config.volume) / 100.0;
        if gain < 1.0 {
            for s in chunk.samples.iter_mut() {
                *s *= gain;
            }
        }
        Ok(chunk)
    }

    /// Synthesize and write a 16-bit mono PCM WAV.
    pub fn synthesize_to_file(&mut self, text: &str, path: &Path) -> SynthesisResult {
        let result = self.synthesize(text);
        if !result.success {
            return result;
        }
        match result.audio.write_wav(path) {
            Ok(()) => result,
            Err(err) => SynthesisResult::from_error(
                result.request_id,
                &err,
                result.processing_time_ms,
            ),
        }
    }

    /// Degenerate streaming: one event carrying the whole utterance.
    pub fn synthesize_streaming(
        &mut self,
        text: &str,
        handler: &mut dyn StreamingHandler,
    ) -> SynthesisResult {
        handler.on_open();
        let result = self.synthesize(text);
        if result.success {
            handler.on_event(&result);
            handler.on_complete();
        } else {
            handler.on_error(&result.error);
        }
        handler.on_close();
        result
    }

    /// Change the speech rate. Failure leaves the engine untouched.
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.backend.set_speed(speed)?;
        self.config.speech_rate = speed;
        Ok(())
    }

    /// Change the speaker index. Failure leaves the engine untouched.
    pub fn set_speaker(&mut self, speaker_id: i32) -> Result<()> {
        self.backend.set_speaker(speaker_id)?;
        self.config.speaker_id = speaker_id;
        Ok(())
    }

    /// Change the output volume, in percent.
    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        if volume > 100 {
            return Err(TtsError::InvalidConfig(format!(
                "volume must be in [0, 100], got {volume}"
            )));
        }
        self.config.volume = volume;
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        if self.config.output_sample_rate != 0 {
            self.config.output_sample_rate
        } else {
            self.backend.sample_rate()
        }
    }

    pub fn num_speakers(&self) -> usize {
        self.backend.num_speakers()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Release models. Subsequent synthesize calls fail with
    /// `NotInitialized` inside the envelope.
    pub fn shutdown(&mut self) {
        self.backend.shutdown();
    }
}

impl Drop for TtsEngine {
    fn drop(&mut self) {
        self.backend.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioChunk;
    use crate::error::ErrorKind;

    /// Scripted backend for facade tests.
    struct FakeBackend {
        initialized: bool,
        fail_synthesis: bool,
        calls: usize,
        speed: f32,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self {
                initialized: true,
                fail_synthesis: false,
                calls: 0,
                speed: 1.0,
            }
        }
    }

    impl SpeechBackend for FakeBackend {
        fn initialize(&mut self) -> Result<()> {
            if self.initialized {
                return Err(TtsError::AlreadyInitialized);
            }
            self.initialized = true;
            Ok(())
        }

        fn synthesize(&mut self, _text: &str) -> Result<AudioChunk> {
            self.calls += 1;
            if !self.initialized {
                return Err(TtsError::NotInitialized);
            }
            if self.fail_synthesis {
                return Err(TtsError::SynthesisFailed("scripted failure".into()));
            }
            // One second of audio, scaled by speed the way a real model
            // shortens output.
            let samples = vec![0.5f32; (22050.0 / self.speed) as usize];
            Ok(AudioChunk::new(samples, 22050))
        }

        fn set_speed(&mut self, speed: f32) -> Result<()> {
            if speed <= 0.0 {
                return Err(TtsError::InvalidConfig("bad speed".into()));
            }
            self.speed = speed;
            Ok(())
        }

        fn set_speaker(&mut self, speaker_id: i32) -> Result<()> {
            if speaker_id != 0 {
                return Err(TtsError::InvalidConfig("bad speaker".into()));
            }
            Ok(())
        }

        fn sample_rate(&self) -> u32 {
            22050
        }

        fn num_speakers(&self) -> usize {
            1
        }

        fn shutdown(&mut self) {
            self.initialized = false;
        }
    }

    fn engine() -> TtsEngine {
        TtsEngine::with_backend(EngineConfig::default(), Box::new(FakeBackend::new()))
    }

    #[test]
    fn empty_input_is_invalid_text() {
        let mut engine = engine();
        let result = engine.synthesize("");
        assert!(!result.is_success());
        assert_eq!(result.error.kind, ErrorKind::InvalidText);
        assert!(result.audio.is_empty());

        let result = engine.synthesize("   ");
        assert_eq!(result.error.kind, ErrorKind::InvalidText);
    }

    #[test]
    fn oversized_input_is_text_too_long() {
        let mut engine = engine();
        let text = "好".repeat(MAX_TEXT_CHARS + 1);
        let result = engine.synthesize(&text);
        assert_eq!(result.error.kind, ErrorKind::TextTooLong);
    }

    #[test]
    fn successful_result_carries_timing_and_sentence() {
        let mut engine = engine();
        let result = engine.synthesize("你好世界");
        assert!(result.is_success());
        assert_eq!(result.audio.sample_rate, 22050);
        assert_eq!(result.audio_duration_ms, 1000);
        assert!(result.audio.is_final);
        assert_eq!(result.sentences.len(), 1);
        assert_eq!(result.sentences[0].text, "你好世界");
        assert!(result.error.is_ok());
    }

    #[test]
    fn request_ids_increase_across_calls() {
        let mut engine = engine();
        let first = engine.synthesize("一");
        let second = engine.synthesize("二");
        assert!(second.request_id > first.request_id);
    }

    #[test]
    fn speed_change_shortens_audio() {
        let mut engine = engine();
        let normal = engine.synthesize("你好").audio_duration_ms;
        engine.set_speed(2.0).unwrap();
        let fast = engine.synthesize("你好").audio_duration_ms;
        assert!(fast as f32 <= normal as f32 * 0.7, "{fast} vs {normal}");
        assert_eq!(engine.config().speech_rate, 2.0);
    }

    #[test]
    fn invalid_setters_do_not_mutate_config() {
        let mut engine = engine();
        assert!(engine.set_speed(-1.0).is_err());
        assert_eq!(engine.config().speech_rate, 1.0);
        assert!(engine.set_speaker(5).is_err());
        assert_eq!(engine.config().speaker_id, 0);
        assert!(engine.set_volume(101).is_err());
        assert_eq!(engine.config().volume, 100);
    }

    #[test]
    fn volume_scales_samples() {
        let mut engine = engine();
        engine.set_volume(50).unwrap();
        let result = engine.synthesize("你好");
        assert!((result.audio.samples[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn shutdown_turns_calls_into_not_initialized() {
        let mut engine = engine();
        engine.shutdown();
        let result = engine.synthesize("你好");
        assert_eq!(result.error.kind, ErrorKind::NotInitialized);
    }

    #[test]
    fn synthesis_failure_is_wrapped() {
        let mut engine = TtsEngine::with_backend(
            EngineConfig::default(),
            Box::new(FakeBackend {
                fail_synthesis: true,
                ..FakeBackend::new()
            }),
        );
        let result = engine.synthesize("你好");
        assert_eq!(result.error.kind, ErrorKind::SynthesisFailed);
        assert!(result.error.detail.contains("scripted failure"));
    }

    #[test]
    fn write_to_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.wav");
        let mut engine = engine();
        let result = engine.synthesize_to_file("你好", &path);
        assert!(result.is_success());

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 22050);
        assert_eq!(reader.spec().channels, 1);
    }

    #[derive(Default)]
    struct RecordingHandler {
        events: Vec<&'static str>,
        received_final: bool,
    }

    impl StreamingHandler for RecordingHandler {
        fn on_open(&mut self) {
            self.events.push("open");
        }
        fn on_event(&mut self, result: &SynthesisResult) {
            self.received_final = result.audio.is_final;
            self.events.push("event");
        }
        fn on_complete(&mut self) {
            self.events.push("complete");
        }
        fn on_error(&mut self, _error: &ErrorInfo) {
            self.events.push("error");
        }
        fn on_close(&mut self) {
            self.events.push("close");
        }
    }

    #[test]
    fn streaming_fires_single_event_in_order() {
        let mut engine = engine();
        let mut handler = RecordingHandler::default();
        let result = engine.synthesize_streaming("你好", &mut handler);
        assert!(result.is_success());
        assert_eq!(handler.events, vec!["open", "event", "complete", "close"]);
        assert!(handler.received_final, "the single chunk is final");
    }

    #[test]
    fn streaming_routes_errors_before_close() {
        let mut engine = engine();
        let mut handler = RecordingHandler::default();
        let result = engine.synthesize_streaming("", &mut handler);
        assert!(!result.is_success());
        assert_eq!(handler.events, vec!["open", "error", "close"]);
    }
}
