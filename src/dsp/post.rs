//! Audio post-processing: dynamic-range compression, loudness
//! normalization with a soft knee, click/DC cleanup, and the linear
//! resampler.

/// Hard ceiling on the RMS normalization gain.
const MAX_RMS_GAIN: f32 = 3.0;

/// Soft-knee threshold and span: samples above 0.95 are squashed with a
/// tanh so the output never leaves [-1, 1].
const KNEE: f32 = 0.95;
const KNEE_SPAN: f32 = 0.05;
const KNEE_SLOPE: f32 = 20.0;

/// Peak normalization target used when RMS normalization is off.
const PEAK_TARGET: f32 = 0.8;

/// Settings snapshot for the post chain.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    pub target_rms: f32,
    pub compression_ratio: f32,
    pub compression_threshold: f32,
    pub use_rms_norm: bool,
    pub remove_clicks: bool,
}

impl PostProcessor {
    pub fn from_config(config: &crate::config::EngineConfig) -> Self {
        Self {
            target_rms: config.target_rms,
            compression_ratio: config.compression_ratio,
            compression_threshold: config.compression_threshold,
            use_rms_norm: config.use_rms_norm,
            remove_clicks: config.remove_clicks,
        }
    }

    /// Run the full chain in place: compress, normalize, then clean up
    /// clicks and DC when enabled.
    pub fn process(&self, samples: &mut [f32]) {
        if samples.is_empty() {
            return;
        }
        self.compress(samples);
        if self.use_rms_norm {
            self.normalize_rms(samples);
        } else {
            normalize_peak(samples);
        }
        if self.remove_clicks {
            remove_clicks(samples);
        }
    }

    /// Soft compression above the threshold, preserving sign.
    fn compress(&self, samples: &mut [f32]) {
        let threshold = self.compression_threshold;
        let ratio = self.compression_ratio;
        for s in samples.iter_mut() {
            let a = s.abs();
            if a > threshold {
                *s = s.signum() * (threshold + (a - threshold) / ratio);
            }
        }
    }

    /// Scale to the target RMS (gain capped), then apply the soft knee.
    fn normalize_rms(&self, samples: &mut [f32]) {
        let rms = rms(samples);
        if rms > 0.0 {
            let gain = (self.target_rms / rms).min(MAX_RMS_GAIN);
            for s in samples.iter_mut() {
                *s *= gain;
            }
        }
        for s in samples.iter_mut() {
            *s = soft_knee(*s);
        }
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// `|s| > 0.95` maps to `0.95 + 0.05 * tanh((|s| - 0.95) * 20)`, so the
/// output magnitude stays strictly below 1.
fn soft_knee(s: f32) -> f32 {
    let a = s.abs();
    if a <= KNEE {
        return s;
    }
    s.signum() * (KNEE + KNEE_SPAN * ((a - KNEE) * KNEE_SLOPE).tanh())
}

fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 0.0 {
        let gain = PEAK_TARGET / peak;
        for s in samples.iter_mut() {
            *s *= gain;
        }
    }
}

/// DC-offset subtraction, cosine edge fades, a one-pole DC blocker, and a
/// hard zero on the final sample.
fn remove_clicks(samples: &mut [f32]) {
    let len = samples.len();
    if len == 0 {
        return;
    }

    let mean: f32 = samples.iter().sum::<f32>() / len as f32;
    if mean.abs() > 0.01 {
        for s in samples.iter_mut() {
            *s -= mean;
        }
    }

    let fade_in = (len / 100).min(44);
    fade(samples, fade_in, false);
    let fade_out = (len / 50).min(110);
    fade(samples, fade_out, true);

    // y[n] = 0.999 * (y[n-1] + x[n] - x[n-1])
    let mut prev_x = samples[0];
    let mut prev_y = samples[0];
    for s in samples.iter_mut().skip(1) {
        let x = *s;
        let y = 0.999 * (prev_y + x - prev_x);
        *s = y;
        prev_x = x;
        prev_y = y;
    }

    samples[len - 1] = 0.0;
}

/// Cosine ramp over `n` samples: `0.5 * (1 - cos(π * i / n))`.
fn fade(samples: &mut [f32], n: usize, out: bool) {
    if n == 0 {
        return;
    }
    let len = samples.len();
    for i in 0..n.min(len) {
        let g = 0.5 * (1.0 - (std::f32::consts::PI * i as f32 / n as f32).cos());
        if out {
            samples[len - 1 - i] *= g;
        } else {
            samples[i] *= g;
        }
    }
}

/// Linear-interpolation resampler.
///
/// `out[i] = in[floor(i/r)] * (1-f) + in[floor(i/r)+1] * f` with
/// `r = dst/src`; reads past the end clamp to the last sample. Identity
/// when the rates match.
pub fn resample_linear(input: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || input.is_empty() || src_rate == 0 || dst_rate == 0 {
        return input.to_vec();
    }
    let ratio = dst_rate as f64 / src_rate as f64;
    let out_len = (input.len() as f64 * ratio).round() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 / ratio;
        let idx = pos.floor() as usize;
        let frac = (pos - idx as f64) as f32;
        let a = input.get(idx).copied().unwrap_or(0.0);
        let b = input.get(idx + 1).copied().unwrap_or(a);
        out.push(a * (1.0 - frac) + b * frac);
    }
    out
}
