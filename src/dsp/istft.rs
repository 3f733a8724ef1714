//! Inverse short-time Fourier transform: Hann-window overlap-add
//! reconstruction from the vocoder's magnitude/phase frames.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Floor below which window-energy compensation is skipped.
const ENERGY_FLOOR: f32 = 1e-8;

/// Periodic-symmetric Hann window: `w[i] = 0.5 * (1 - cos(2πi/(N-1)))`.
pub fn hann_window(len: usize) -> Vec<f32> {
    if len == 1 {
        return vec![0.0];
    }
    (0..len)
        .map(|i| {
            0.5 * (1.0
                - (2.0 * std::f32::consts::PI * i as f32 / (len - 1) as f32).cos())
        })
        .collect()
}

/// Overlap-add ISTFT over `n_fft`-point spectra.
pub struct Istft {
    n_fft: usize,
    hop_length: usize,
    win_length: usize,
    window: Vec<f32>,
    ifft: Arc<dyn Fft<f32>>,
}

impl Istft {
    pub fn new(n_fft: usize, hop_length: usize, win_length: usize) -> Self {
        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(n_fft);
        Self {
            n_fft,
            hop_length,
            win_length,
            window: hann_window(win_length),
            ifft,
        }
    }

    /// Number of frequency bins each frame must carry: `n_fft / 2 + 1`.
    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Reconstruct audio from `frames` rows of `num_bins()` real and
    /// imaginary values, laid out row-major `[T, K]`.
    ///
    /// Output length is `n_fft + (frames - 1) * hop_length`. Each frame is
    /// inverse-transformed, windowed, and overlap-added; the accumulated
    /// squared-window energy divides the result wherever it is above the
    /// floor.
    pub fn process(&self, real: &[f32], imag: &[f32], frames: usize) -> Vec<f32> {
        let bins = self.num_bins();
        debug_assert_eq!(real.len(), frames * bins);
        debug_assert_eq!(imag.len(), frames * bins);
        if frames == 0 {
            return Vec::new();
        }

        let out_len = self.n_fft + (frames - 1) * self.hop_length;
        let mut output = vec![0.0f32; out_len];
        let mut window_energy = vec![0.0f32; out_len];

        for t in 0..frames {
            // Full Hermitian spectrum from the one-sided frame.
            let mut spectrum = vec![Complex::new(0.0f32, 0.0f32); self.n_fft];
            let row = &real[t * bins..(t + 1) * bins];
            let row_imag = &imag[t * bins..(t + 1) * bins];
            for k in 0..bins {
                spectrum[k] = Complex::new(row[k], row_imag[k]);
            }
            for k in 1..bins - 1 {
                spectrum[self.n_fft - k] = spectrum[k].conj();
            }

            self.ifft.process(&mut spectrum);

            let offset = t * self.hop_length;
            for i in 0..self.win_length.min(self.n_fft) {
                // rustfft leaves the inverse unnormalized.
                let sample = spectrum[i].re / self.n_fft as f32 * self.window[i];
                output[offset + i] += sample;
                window_energy[offset + i] += self.window[i] * self.window[i];
            }
        }

        for (sample, &energy) in output.iter_mut().zip(window_energy.iter()) {
            if energy > ENERGY_FLOOR {
                *sample /= energy;
            }
        }
        output
    }
}
