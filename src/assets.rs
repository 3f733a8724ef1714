//! Model cache layout and path resolution.
//!
//! The downloader that populates this layout lives outside the crate; the
//! engine only resolves and validates paths beneath the cache root.
//!
//! ```text
//! <cache_root>/matcha-tts/
//!     matcha-icefall-zh-baker/{model-steps-3.onnx, tokens.txt, lexicon.txt, dict/}
//!     matcha-icefall-en_US-ljspeech/{model-steps-3.onnx, tokens.txt}
//!     matcha-icefall-zh-en/{model-steps-3.onnx, vocab_tts.txt}
//!     vocos-22khz-univ.onnx
//!     vocos-16khz-univ.onnx
//! <cache_root>/kokoro-tts/
//!     kokoro-v1.0.onnx
//!     voices/<name>.bin
//! ```

use std::path::{Path, PathBuf};

use crate::config::{BackendKind, EngineConfig};
use crate::error::{Result, TtsError};

const MATCHA_SUBDIR: &str = "matcha-tts";
const KOKORO_SUBDIR: &str = "kokoro-tts";

/// Resolved file set for one Matcha variant.
#[derive(Debug, Clone)]
pub struct MatchaPaths {
    pub acoustic: PathBuf,
    pub vocoder: PathBuf,
    pub tokens: PathBuf,
    pub lexicon: Option<PathBuf>,
}

/// Resolved file set for the Kokoro backend.
#[derive(Debug, Clone)]
pub struct KokoroPaths {
    pub model: PathBuf,
    pub voice: PathBuf,
}

/// The cache root: the configured model directory, or the per-user cache
/// directory when the config leaves it empty.
pub fn cache_root(config: &EngineConfig) -> PathBuf {
    if !config.model_dir.as_os_str().is_empty() {
        return config.model_dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zhtts")
}

/// Resolve and validate the files a Matcha variant needs.
pub fn matcha_paths(config: &EngineConfig) -> Result<MatchaPaths> {
    let root = cache_root(config).join(MATCHA_SUBDIR);
    let (model_dir, tokens_name, vocoder_name, has_lexicon) = match config.backend {
        BackendKind::MatchaZh => (
            "matcha-icefall-zh-baker",
            "tokens.txt",
            "vocos-22khz-univ.onnx",
            true,
        ),
        BackendKind::MatchaEn => (
            "matcha-icefall-en_US-ljspeech",
            "tokens.txt",
            "vocos-22khz-univ.onnx",
            false,
        ),
        BackendKind::MatchaZhEn => (
            "matcha-icefall-zh-en",
            "vocab_tts.txt",
            "vocos-16khz-univ.onnx",
            false,
        ),
        other => {
            return Err(TtsError::UnsupportedLanguage(format!(
                "{} is not a Matcha backend",
                other.as_str()
            )))
        }
    };

    let dir = root.join(model_dir);
    let paths = MatchaPaths {
        acoustic: dir.join("model-steps-3.onnx"),
        vocoder: root.join(vocoder_name),
        tokens: dir.join(tokens_name),
        lexicon: has_lexicon.then(|| dir.join("lexicon.txt")),
    };

    require(&paths.acoustic)?;
    require(&paths.vocoder)?;
    require(&paths.tokens)?;
    if let Some(lexicon) = &paths.lexicon {
        require(lexicon)?;
    }
    Ok(paths)
}

/// Resolve and validate the Kokoro model and the configured voice file.
pub fn kokoro_paths(config: &EngineConfig) -> Result<KokoroPaths> {
    let root = cache_root(config).join(KOKORO_SUBDIR);
    let paths = KokoroPaths {
        model: root.join("kokoro-v1.0.onnx"),
        voice: root.join("voices").join(format!("{}.bin", config.voice)),
    };
    require(&paths.model)?;
    require(&paths.voice)?;
    Ok(paths)
}

fn require(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TtsError::ModelNotFound(path.display().to_string()))
    }
}
