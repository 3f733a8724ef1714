//! Audio containers and the synthesis result envelope.

use std::path::Path;

use crate::error::{ErrorInfo, Result, TtsError};

/// One block of mono PCM audio produced by a backend.
///
/// Samples are float32 in `[-1, 1]`. The engine emits a single chunk per
/// utterance with `is_final` set.
#[derive(Debug, Clone, Default)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Always 1; kept explicit for binding hosts.
    pub channels: u16,
    pub is_final: bool,
    pub sentence_index: usize,
    /// Offset of this chunk from the start of the utterance, in milliseconds.
    pub timestamp_ms: u64,
}

impl AudioChunk {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
            is_final: true,
            sentence_index: 0,
            timestamp_ms: 0,
        }
    }

    /// Empty final chunk at the given rate. Used when phonemization yields
    /// nothing; an empty result is still a success.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in milliseconds: `len * 1000 / sample_rate`.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Clamp to `[-1, 1]` and scale to 16-bit PCM.
    pub fn to_int16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect()
    }

    /// Write a canonical RIFF/WAVE file: PCM, mono, 16-bit, little-endian.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)
            .map_err(|e| TtsError::FileWrite(format!("{}: {e}", path.display())))?;
        for sample in self.to_int16() {
            writer
                .write_sample(sample)
                .map_err(|e| TtsError::FileWrite(format!("{}: {e}", path.display())))?;
        }
        writer
            .finalize()
            .map_err(|e| TtsError::FileWrite(format!("{}: {e}", path.display())))?;
        Ok(())
    }
}

/// Timing info for one input sentence.
///
/// The engine currently synthesizes whole utterances, so there is exactly
/// one entry spanning the full audio.
#[derive(Debug, Clone)]
pub struct SentenceInfo {
    pub index: usize,
    pub text: String,
    pub start_ms: u64,
    pub duration_ms: u64,
}

/// The envelope returned by every public synthesis call.
///
/// `success` and `error` mirror each other: callers check `success` before
/// consuming `audio`. `rtf` is processing time over audio duration, zero
/// when no audio was produced.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub request_id: u64,
    pub audio: AudioChunk,
    pub sentences: Vec<SentenceInfo>,
    pub audio_duration_ms: u64,
    pub processing_time_ms: u64,
    pub rtf: f32,
    pub success: bool,
    pub error: ErrorInfo,
}

impl SynthesisResult {
    /// Successful result for one utterance.
    pub fn ok(request_id: u64, text: &str, audio: AudioChunk, processing_time_ms: u64) -> Self {
        let audio_duration_ms = audio.duration_ms();
        let rtf = if audio_duration_ms > 0 {
            processing_time_ms as f32 / audio_duration_ms as f32
        } else {
            0.0
        };
        let sentences = vec![SentenceInfo {
            index: 0,
            text: text.to_string(),
            start_ms: 0,
            duration_ms: audio_duration_ms,
        }];
        Self {
            request_id,
            audio,
            sentences,
            audio_duration_ms,
            processing_time_ms,
            rtf,
            success: true,
            error: ErrorInfo::ok(),
        }
    }

    /// Failed result carrying the error tags; no audio.
    pub fn from_error(request_id: u64, err: &TtsError, processing_time_ms: u64) -> Self {
        Self {
            request_id,
            audio: AudioChunk::default(),
            sentences: Vec::new(),
            audio_duration_ms: 0,
            processing_time_ms,
            rtf: 0.0,
            success: false,
            error: err.info(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Write the audio to a WAV file. Fails on unsuccessful results.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        if !self.success {
            return Err(TtsError::Internal(
                "cannot write audio of a failed synthesis".to_string(),
            ));
        }
        self.audio.write_wav(path)
    }
}
