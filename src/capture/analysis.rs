//! Frequency analysis for capture sessions.
//!
//! Turns raw time-domain input into byte-scaled frequency bins: Hann window,
//! forward FFT, exponential smoothing on the linear magnitudes, then a decibel
//! mapping of each bin into `0..=255`. Downstream consumers reduce the bins to
//! normalized bar values or a single average level.

use rustfft::{num_complex::Complex, FftPlanner};

/// Decibel floor of the byte mapping; bins at or below map to 0.
pub const MIN_DECIBELS: f32 = -100.0;
/// Decibel ceiling of the byte mapping; bins at or above map to 255.
pub const MAX_DECIBELS: f32 = -30.0;
/// Gain applied to the averaged level before sensitivity, so ordinary speech
/// reaches a useful portion of the meter.
pub const LEVEL_MAKEUP_GAIN: f32 = 2.0;

/// Stateful spectrum analyzer with an internal FFT planner.
pub struct FrequencyAnalyzer {
    fft_planner: FftPlanner<f32>,
    fft_size: usize,
    smoothing: f32,
    /// Exponentially smoothed linear magnitudes, one per bin.
    smoothed: Vec<f32>,
    /// Byte-scaled bins recomputed on every [`process`](Self::process).
    bytes: Vec<u8>,
}

impl FrequencyAnalyzer {
    /// Creates an analyzer.
    ///
    /// # Arguments
    /// * `fft_size` - Requested window size; rounded up to a power of two and
    ///   clamped to `32..=32768`
    /// * `smoothing` - Exponential smoothing time constant, clamped to
    ///   `[0, 0.99]`; higher values carry more history between frames
    pub fn new(fft_size: usize, smoothing: f32) -> Self {
        let fft_size = fft_size.next_power_of_two().clamp(32, 32768);
        let bins = fft_size / 2;
        Self {
            fft_planner: FftPlanner::new(),
            fft_size,
            smoothing: smoothing.clamp(0.0, 0.99),
            smoothed: vec![0.0; bins],
            bytes: vec![0; bins],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of frequency bins produced, `fft_size / 2`.
    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Clears smoothing history and byte bins back to silence.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }

    /// Analyzes the most recent `fft_size` samples of `samples`.
    ///
    /// Fewer samples are zero-padded; an empty slice counts as silence and
    /// lets the smoothed bins decay instead of freezing them.
    pub fn process(&mut self, samples: &[f32]) {
        let n = self.fft_size;
        let count = samples.len().min(n);

        let mut buffer: Vec<Complex<f32>>;
        if count == 0 {
            buffer = vec![Complex::new(0.0, 0.0); n];
        } else {
            // Hann window over the newest samples to reduce spectral leakage.
            let recent = &samples[samples.len() - count..];
            buffer = recent
                .iter()
                .enumerate()
                .map(|(i, &s)| {
                    let window = 0.5
                        * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / count as f32).cos());
                    Complex::new(s * window, 0.0)
                })
                .collect();
            buffer.resize(n, Complex::new(0.0, 0.0));

            let fft = self.fft_planner.plan_fft_forward(n);
            fft.process(&mut buffer);
        }

        let tau = self.smoothing;
        let scale = 1.0 / n as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        for (k, slot) in self.smoothed.iter_mut().enumerate() {
            let magnitude = buffer[k].norm() * scale;
            *slot = tau * *slot + (1.0 - tau) * magnitude;
            let db = if *slot > 1e-12 {
                20.0 * slot.log10()
            } else {
                MIN_DECIBELS
            };
            self.bytes[k] = (((db - MIN_DECIBELS) / range) * 255.0).clamp(0.0, 255.0) as u8;
        }
    }

    /// Current byte-scaled frequency bins, one per [`bin_count`](Self::bin_count).
    pub fn byte_bins(&self) -> &[u8] {
        &self.bytes
    }
}

/// Maps byte bins to normalized bar values: `min(1, bin/255 * sensitivity)`.
pub fn normalized_bins(bytes: &[u8], sensitivity: f32, out: &mut Vec<f32>) {
    out.clear();
    out.extend(
        bytes
            .iter()
            .map(|&b| (b as f32 / 255.0 * sensitivity).clamp(0.0, 1.0)),
    );
}

/// Reduces byte bins to one level:
/// `min(1, avg/255 * LEVEL_MAKEUP_GAIN * sensitivity)`.
pub fn average_level(bytes: &[u8], sensitivity: f32) -> f32 {
    if bytes.is_empty() {
        return 0.0;
    }
    let sum: u32 = bytes.iter().map(|&b| u32::from(b)).sum();
    let avg = sum as f32 / bytes.len() as f32 / 255.0;
    (avg * LEVEL_MAKEUP_GAIN * sensitivity).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(amplitude: f32, cycles: usize, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * cycles as f32 * i as f32 / len as f32).sin()
            })
            .collect()
    }

    #[test]
    fn silence_maps_to_zero_bytes() {
        let mut analyzer = FrequencyAnalyzer::new(256, 0.0);
        analyzer.process(&vec![0.0; 256]);
        assert!(analyzer.byte_bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn bin_centered_sine_lights_its_bin() {
        let mut analyzer = FrequencyAnalyzer::new(256, 0.0);
        analyzer.process(&sine(1.0, 8, 256));
        let bins = analyzer.byte_bins();
        // Full-scale sine lands well above the decibel ceiling.
        assert_eq!(bins[8], 255);
        // Energy stays local: a Hann-windowed bin-centered sine only spills
        // into adjacent bins.
        assert!(bins[40] < 30, "far bin {}", bins[40]);
    }

    #[test]
    fn smoothing_carries_history_across_frames() {
        let mut smoothed = FrequencyAnalyzer::new(256, 0.8);
        let mut instant = FrequencyAnalyzer::new(256, 0.0);
        let tone = sine(0.1, 8, 256);

        smoothed.process(&tone);
        instant.process(&tone);
        let held = smoothed.byte_bins()[8];
        assert!(held > 0);

        smoothed.process(&vec![0.0; 256]);
        instant.process(&vec![0.0; 256]);
        // History decays but survives one silent frame; without smoothing the
        // bin drops straight back to zero.
        assert!(smoothed.byte_bins()[8] > 0);
        assert!(smoothed.byte_bins()[8] <= held);
        assert_eq!(instant.byte_bins()[8], 0);
    }

    #[test]
    fn short_input_is_zero_padded_not_rejected() {
        let mut analyzer = FrequencyAnalyzer::new(256, 0.0);
        analyzer.process(&[0.5, -0.5, 0.5, -0.5]);
        assert_eq!(analyzer.bin_count(), 128);
    }

    #[test]
    fn fft_size_is_normalized() {
        assert_eq!(FrequencyAnalyzer::new(100, 0.8).fft_size(), 128);
        assert_eq!(FrequencyAnalyzer::new(0, 0.8).fft_size(), 32);
        assert_eq!(FrequencyAnalyzer::new(256, 0.8).bin_count(), 128);
    }

    #[test]
    fn reset_returns_to_silence() {
        let mut analyzer = FrequencyAnalyzer::new(256, 0.8);
        analyzer.process(&sine(1.0, 8, 256));
        assert!(analyzer.byte_bins().iter().any(|&b| b > 0));
        analyzer.reset();
        assert!(analyzer.byte_bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn average_level_applies_makeup_gain_and_clamps() {
        let quiet = vec![51u8; 16];
        assert!((average_level(&quiet, 1.0) - 0.4).abs() < 1e-6);
        assert!((average_level(&quiet, 2.0) - 0.8).abs() < 1e-6);
        let loud = vec![255u8; 16];
        assert_eq!(average_level(&loud, 1.0), 1.0);
        assert_eq!(average_level(&[], 1.0), 0.0);
    }

    #[test]
    fn normalized_bins_scale_and_clamp() {
        let mut out = Vec::new();
        normalized_bins(&[0, 127, 255], 1.5, &mut out);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.747_058_8).abs() < 1e-4);
        assert_eq!(out[2], 1.0);
    }
}
