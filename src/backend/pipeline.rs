//! Shared machinery for the Matcha-family backends: session loading,
//! graph I/O validation, metadata extraction, blank insertion, and the
//! acoustic/vocoder inference steps.
//!
//! These are free functions over [`MatchaState`]; the per-language
//! backends differ only in their `text_to_token_ids` hook and whether
//! they insert blanks.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{arr1, Array2, Array3};
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use crate::dsp::Istft;
use crate::error::{Result, TtsError};
use crate::text::TokenMap;

/// Defaults used when the vocoder metadata omits the STFT parameters.
pub const DEFAULT_N_FFT: usize = 1024;
pub const DEFAULT_HOP_LENGTH: usize = 256;
pub const DEFAULT_WIN_LENGTH: usize = 1024;

/// Defaults for the acoustic model's sampling knobs.
pub const DEFAULT_NOISE_SCALE: f32 = 0.667;
pub const DEFAULT_LENGTH_SCALE: f32 = 1.0;

/// Both neural sessions, guarded by one mutex so concurrent synthesize
/// calls serialize instead of failing.
pub struct MatchaSessions {
    pub acoustic: Session,
    pub vocoder: Session,
}

/// Everything a Matcha backend owns after init.
///
/// Field order is load-bearing for shutdown: sessions drop before the
/// vocabularies.
pub struct MatchaState {
    pub sessions: Mutex<MatchaSessions>,
    pub tokens: TokenMap,
    pub pad_id: i64,
    pub num_speakers: usize,
    pub sample_rate: u32,
    pub noise_scale: f32,
    pub length_scale: f32,
    pub istft: Istft,
}

/// Build a CPU session the way every backend in this crate does.
pub fn load_session(path: &Path, num_threads: usize) -> Result<Session> {
    log::info!("loading ONNX session from {}", path.display());
    let providers = vec![CPUExecutionProvider::default().build()];
    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers(providers)?;
    if num_threads > 0 {
        builder = builder.with_intra_threads(num_threads)?;
    }
    Ok(builder.commit_from_file(path)?)
}

/// Engines match graph I/O names exactly; a mismatch is a fatal init error.
pub fn require_io_names(
    session: &Session,
    expected_inputs: &[&str],
    expected_outputs: &[&str],
    what: &str,
) -> Result<()> {
    let mut input_names = Vec::new();
    for input in &session.inputs {
        input_names.push(input.name.clone());
    }
    let mut output_names = Vec::new();
    for output in &session.outputs {
        output_names.push(output.name.clone());
    }

    for name in expected_inputs {
        if !input_names.iter().any(|n| n == name) {
            return Err(TtsError::InvalidConfig(format!(
                "{what} model is missing input {name:?} (has {input_names:?})"
            )));
        }
    }
    for name in expected_outputs {
        if !output_names.iter().any(|n| n == name) {
            return Err(TtsError::InvalidConfig(format!(
                "{what} model is missing output {name:?} (has {output_names:?})"
            )));
        }
    }
    Ok(())
}

/// Integer metadata value with a default.
pub fn meta_i64(session: &Session, key: &str, default: i64) -> i64 {
    session
        .metadata()
        .ok()
        .and_then(|m| m.custom(key).ok().flatten())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `[pad, t1, pad, t2, pad, ..., tn, pad]` using the model's pad id.
pub fn insert_blanks(tokens: &[i64], pad_id: i64) -> Vec<i64> {
    let mut out = Vec::with_capacity(tokens.len() * 2 + 1);
    out.push(pad_id);
    for &t in tokens {
        out.push(t);
        out.push(pad_id);
    }
    out
}

/// Flattened mel output plus its dimensions.
pub struct MelTensor {
    pub data: Vec<f32>,
    pub mel_dim: usize,
    pub frames: usize,
}

/// Run the acoustic model: token ids to a mel tensor.
///
/// Inference failures come back as `SynthesisFailed` carrying the runtime
/// message, per the propagation policy.
pub fn run_acoustic(
    session: &mut Session,
    ids: &[i64],
    noise_scale: f32,
    length_scale: f32,
) -> Result<MelTensor> {
    let len = ids.len();
    let x = Array2::from_shape_vec((1, len), ids.to_vec())?;
    let x_length = arr1(&[len as i64]);
    let noise = arr1(&[noise_scale]);
    let scale = arr1(&[length_scale]);

    let outputs = session
        .run(inputs![
            "x" => TensorRef::from_array_view(x.view())?,
            "x_length" => TensorRef::from_array_view(x_length.view())?,
            "noise_scale" => TensorRef::from_array_view(noise.view())?,
            "length_scale" => TensorRef::from_array_view(scale.view())?,
        ])
        .map_err(|e| TtsError::SynthesisFailed(format!("acoustic inference: {e}")))?;

    let mel_value = outputs
        .iter()
        .find(|(name, _)| *name == "mel")
        .ok_or_else(|| TtsError::SynthesisFailed("acoustic model produced no 'mel'".into()))?
        .1;
    let mel = mel_value
        .try_extract_array::<f32>()
        .map_err(|e| TtsError::SynthesisFailed(format!("mel extraction: {e}")))?;

    let shape = mel.shape().to_vec();
    if shape.len() != 3 {
        return Err(TtsError::SynthesisFailed(format!(
            "mel tensor has shape {shape:?}, expected [1, mel_dim, frames]"
        )));
    }
    Ok(MelTensor {
        data: mel.iter().copied().collect(),
        mel_dim: shape[1],
        frames: shape[2],
    })
}

/// Real/imaginary STFT frames in `[T, K]` layout, ready for the ISTFT.
pub struct StftFrames {
    pub real: Vec<f32>,
    pub imag: Vec<f32>,
    pub frames: usize,
    pub bins: usize,
}

/// Run the vocoder: mel tensor to magnitude/phase, reinterleaved as
/// `real[t, k] = mag[k, t] * x[k, t]`, `imag[t, k] = mag[k, t] * y[k, t]`.
pub fn run_vocoder(session: &mut Session, mel: &MelTensor) -> Result<StftFrames> {
    let mels = Array3::from_shape_vec((1, mel.mel_dim, mel.frames), mel.data.clone())?;
    let outputs = session
        .run(inputs![
            "mels" => TensorRef::from_array_view(mels.view())?,
        ])
        .map_err(|e| TtsError::SynthesisFailed(format!("vocoder inference: {e}")))?;

    let mut mag = None;
    let mut cos = None;
    let mut sin = None;
    for (name, value) in outputs.iter() {
        let tensor = value
            .try_extract_array::<f32>()
            .map_err(|e| TtsError::SynthesisFailed(format!("vocoder output {name}: {e}")))?;
        let shape = tensor.shape().to_vec();
        let data: Vec<f32> = tensor.iter().copied().collect();
        match name {
            "mag" => mag = Some((shape, data)),
            "x" => cos = Some((shape, data)),
            "y" => sin = Some((shape, data)),
            _ => {}
        }
    }
    let ((shape, mag), (_, cos), (_, sin)) = match (mag, cos, sin) {
        (Some(m), Some(c), Some(s)) => (m, c, s),
        _ => {
            return Err(TtsError::SynthesisFailed(
                "vocoder must produce 'mag', 'x' and 'y'".into(),
            ))
        }
    };

    if shape.len() != 3 {
        return Err(TtsError::SynthesisFailed(format!(
            "vocoder output has shape {shape:?}, expected [1, bins, frames]"
        )));
    }
    let bins = shape[1];
    let frames = shape[2];

    // Inputs are [K, T]; the ISTFT wants [T, K].
    let mut real = vec![0.0f32; frames * bins];
    let mut imag = vec![0.0f32; frames * bins];
    for k in 0..bins {
        for t in 0..frames {
            let src = k * frames + t;
            let dst = t * bins + k;
            real[dst] = mag[src] * cos[src];
            imag[dst] = mag[src] * sin[src];
        }
    }
    Ok(StftFrames {
        real,
        imag,
        frames,
        bins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_insertion_length_and_parity() {
        let tokens = vec![5i64, 6, 7];
        let blanked = insert_blanks(&tokens, 0);
        assert_eq!(blanked.len(), 2 * tokens.len() + 1);
        for (i, &id) in blanked.iter().enumerate() {
            if i % 2 == 0 {
                assert_eq!(id, 0, "even positions are pad");
            }
        }
        assert_eq!(blanked, vec![0, 5, 0, 6, 0, 7, 0]);
    }

    #[test]
    fn blank_insertion_of_empty_is_single_pad() {
        assert_eq!(insert_blanks(&[], 3), vec![3]);
    }
}
