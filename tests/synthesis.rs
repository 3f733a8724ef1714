//! End-to-end synthesis scenarios.
//!
//! These drive real models and are ignored by default; populate the model
//! cache (or point `ZHTTS_MODEL_DIR` at one) and run with
//! `cargo test -- --ignored`.

use std::path::PathBuf;

use zhtts::{BackendKind, EngineConfig, ErrorKind, TtsEngine};

fn config(backend: BackendKind) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.backend = backend;
    if let Ok(dir) = std::env::var("ZHTTS_MODEL_DIR") {
        config.model_dir = PathBuf::from(dir);
    }
    config
}

#[test]
fn factory_reports_the_four_pipelines() {
    let kinds = zhtts::supported_backends();
    assert_eq!(kinds.len(), 4);
    assert!(kinds.contains(&BackendKind::MatchaZh));
    assert!(kinds.contains(&BackendKind::Kokoro));
    assert!(!zhtts::is_backend_supported(BackendKind::CosyVoice));
}

#[test]
#[ignore = "requires downloaded model files"]
fn chinese_hello() {
    let mut engine = TtsEngine::new(config(BackendKind::MatchaZh)).unwrap();
    let result = engine.synthesize("你好世界");
    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.audio.sample_rate, 22050);
    assert!(
        (500..=2500).contains(&result.audio_duration_ms),
        "duration {} ms",
        result.audio_duration_ms
    );
    assert_eq!(result.sentences.len(), 1);
    assert_eq!(result.sentences[0].text, "你好世界");
}

#[test]
#[ignore = "requires downloaded model files and espeak-ng"]
fn english_digit_spelling() {
    let mut engine = TtsEngine::new(config(BackendKind::MatchaEn)).unwrap();
    let result = engine.synthesize("The year 2024 was good.");
    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.audio.sample_rate, 22050);
    assert!(!result.audio.is_empty());
}

#[test]
#[ignore = "requires downloaded model files and espeak-ng"]
fn bilingual_code_switch() {
    let mut engine = TtsEngine::new(config(BackendKind::MatchaZhEn)).unwrap();
    let result = engine.synthesize("今天学Python");
    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.audio.sample_rate, 16000);
    assert!(!result.audio.is_empty());
}

#[test]
#[ignore = "requires downloaded model files"]
fn kokoro_with_explicit_voice() {
    let mut cfg = config(BackendKind::Kokoro);
    cfg.voice = "zf_xiaobei".to_string();
    let mut engine = TtsEngine::new(cfg).unwrap();
    let result = engine.synthesize("你好");
    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(result.audio.sample_rate, 24000);
    assert!(!result.audio.is_empty());
}

#[test]
#[ignore = "requires downloaded model files"]
fn empty_input_is_invalid() {
    let mut engine = TtsEngine::new(config(BackendKind::MatchaZh)).unwrap();
    let result = engine.synthesize("");
    assert!(!result.is_success());
    assert_eq!(result.error.kind, ErrorKind::InvalidText);
    assert!(result.audio.is_empty());
}

#[test]
#[ignore = "requires downloaded model files"]
fn doubling_speed_shortens_audio() {
    let mut engine = TtsEngine::new(config(BackendKind::MatchaZh)).unwrap();
    let normal = engine.synthesize("你好世界").audio_duration_ms;
    engine.set_speed(2.0).unwrap();
    let fast = engine.synthesize("你好世界").audio_duration_ms;
    assert!(
        fast as f64 <= normal as f64 * 0.7,
        "expected <= 70% of {normal} ms, got {fast} ms"
    );
}
