//! Kokoro voice style loading.
//!
//! A voice file is a raw little-endian float32 blob whose length is a
//! multiple of 256 floats; it reshapes to an `(N, 256)` row-major matrix.
//! Synthesis selects one row by clamped token length.

use std::path::Path;

use crate::error::{Result, TtsError};

/// Style vector dimension the Kokoro model conditions on.
pub const STYLE_DIM: usize = 256;

/// One loaded voice: `(N, 256)` style matrix stored flat.
pub struct VoiceStyle {
    data: Vec<f32>,
    rows: usize,
}

impl VoiceStyle {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| TtsError::ModelNotFound(format!("{}: {e}", path.display())))?;
        if bytes.len() % 4 != 0 {
            return Err(TtsError::Internal(format!(
                "voice file {} has {} bytes, not a multiple of 4",
                path.display(),
                bytes.len()
            )));
        }
        let floats = bytes.len() / 4;
        if floats == 0 || floats % STYLE_DIM != 0 {
            return Err(TtsError::Internal(format!(
                "voice file {} holds {floats} floats, not a positive multiple of {STYLE_DIM}",
                path.display()
            )));
        }

        let mut data = Vec::with_capacity(floats);
        for chunk in bytes.chunks_exact(4) {
            data.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        let rows = floats / STYLE_DIM;
        log::info!(
            "loaded voice style {} ({rows} rows of {STYLE_DIM})",
            path.display()
        );
        Ok(Self { data, rows })
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Row for the given token length, clamped into range.
    pub fn row(&self, token_len: usize) -> &[f32] {
        let idx = token_len.min(self.rows - 1);
        &self.data[idx * STYLE_DIM..(idx + 1) * STYLE_DIM]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn voice_file(rows: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for row in 0..rows {
            for col in 0..STYLE_DIM {
                let v = row as f32 + col as f32 / 1000.0;
                file.write_all(&v.to_le_bytes()).unwrap();
            }
        }
        file
    }

    #[test]
    fn loads_and_indexes_rows() {
        let file = voice_file(3);
        let voice = VoiceStyle::load(file.path()).unwrap();
        assert_eq!(voice.num_rows(), 3);
        assert_eq!(voice.row(1)[0], 1.0);
        assert_eq!(voice.row(1).len(), STYLE_DIM);
    }

    #[test]
    fn clamps_out_of_range_indices() {
        let file = voice_file(2);
        let voice = VoiceStyle::load(file.path()).unwrap();
        assert_eq!(voice.row(500)[0], 1.0, "clamped to the last row");
        assert_eq!(voice.row(0)[0], 0.0);
    }

    #[test]
    fn rejects_misaligned_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 1000]).unwrap();
        assert!(VoiceStyle::load(file.path()).is_err());
    }
}
