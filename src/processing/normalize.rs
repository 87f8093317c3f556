// src/processing/normalize.rs
//! Baseline estimation, dF/F and z-scoring

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::constants::normalization::MIN_BASELINE_SAMPLES;
use crate::config::{BaselineConfig, ZScoreWindow};
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};
use crate::processing::filters::{Filter, PadType, ZeroPhaseFilter};
use crate::utils::stats::{mean, std_dev};
use crate::utils::time::{first_index_after, time_axis};
use crate::utils::validation::{ensure_aligned, ensure_non_empty};

/// dF/F together with the baseline it was divided by
#[derive(Debug, Clone)]
pub struct DeltaF {
    pub values: Vec<f64>,
    /// Slow low-pass of the denoised dynamic channel
    pub baseline: Vec<f64>,
}

/// Slow low-pass baseline of the denoised dynamic channel
#[derive(Debug, Clone)]
pub struct BaselineNormalizer {
    order: usize,
    cutoff_hz: f64,
}

impl BaselineNormalizer {
    pub fn new(config: &BaselineConfig) -> Self {
        Self {
            order: config.lowpass_order,
            cutoff_hz: config.lowpass_cutoff_hz,
        }
    }

    /// Baseline fluorescence `F0`
    pub fn baseline(&self, denoised: &[f64], sampling_frequency: f64) -> PhotometryResult<Vec<f64>> {
        ensure_non_empty(denoised, PipelineStage::Normalization, "denoised trace")?;
        ZeroPhaseFilter::butterworth_lowpass(self.order, self.cutoff_hz, sampling_frequency, PadType::Even)?
            .apply(denoised)
    }

    /// `corrected / F0`, with `F0` taken from the denoised dynamic trace
    pub fn delta_f_over_f(
        &self,
        corrected: &[f64],
        denoised: &[f64],
        sampling_frequency: f64,
    ) -> PhotometryResult<DeltaF> {
        ensure_aligned(corrected, denoised, PipelineStage::Normalization)?;
        let baseline = self.baseline(denoised, sampling_frequency)?;
        let values = divide_by_baseline(corrected, &baseline)?;

        debug!(samples = values.len(), "dF/F computed");

        Ok(DeltaF { values, baseline })
    }
}

/// Elementwise quotient; a zero baseline yields non-finite values
pub fn divide_by_baseline(signal: &[f64], baseline: &[f64]) -> PhotometryResult<Vec<f64>> {
    ensure_aligned(signal, baseline, PipelineStage::Normalization)?;
    let values: Vec<f64> = signal.iter().zip(baseline).map(|(s, b)| s / b).collect();

    let non_finite = values.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        warn!(non_finite, "baseline division produced non-finite values");
    }
    Ok(values)
}

/// Z-scored trace with the statistics of its baseline window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScore {
    /// Time axis of the truncated trace
    pub time: Vec<f64>,
    pub values: Vec<f64>,
    /// Exclusive end of the baseline window in truncated indices
    pub baseline_end_index: usize,
    pub mean: f64,
    pub std: f64,
}

/// Z-score `signal` against the window between `start_s` and `baseline_end_s`
///
/// The trace is first truncated to samples with time `> start_s`. The
/// baseline window runs from the truncated start to the first sample with
/// time `> baseline_end_s`, or to the end when no sample passes it.
pub fn z_score(signal: &[f64], time: &[f64], start_s: f64, baseline_end_s: f64) -> PhotometryResult<ZScore> {
    if signal.len() != time.len() {
        return Err(PhotometryError::invalid_parameter(
            PipelineStage::Normalization,
            "time",
            format!("time axis has {} entries, signal has {}", time.len(), signal.len()),
        ));
    }

    let start = first_index_after(time, start_s).ok_or_else(|| {
        PhotometryError::insufficient(
            PipelineStage::Normalization,
            format!("no samples after analysis start {} s", start_s),
        )
    })?;
    let time = &time[start..];
    let values = &signal[start..];

    let baseline_end_index = first_index_after(time, baseline_end_s).unwrap_or(time.len());
    if baseline_end_index < MIN_BASELINE_SAMPLES {
        return Err(PhotometryError::EmptyBaselineWindow {
            samples: baseline_end_index,
            required: MIN_BASELINE_SAMPLES,
        });
    }

    let window = &values[..baseline_end_index];
    let mean = mean(window);
    let std = std_dev(window);
    if std == 0.0 {
        warn!("baseline window has zero variance");
    }

    debug!(start, baseline_end_index, mean, std, "z-score baseline");

    Ok(ZScore {
        time: time.to_vec(),
        values: values.iter().map(|v| (v - mean) / std).collect(),
        baseline_end_index,
        mean,
        std,
    })
}

/// Z-score a trace whose time axis is the 1-indexed axis at `sampling_frequency`
pub fn z_score_with_rate(signal: &[f64], sampling_frequency: f64, window: ZScoreWindow) -> PhotometryResult<ZScore> {
    let time = time_axis(signal.len(), sampling_frequency);
    z_score(signal, &time, window.start_s, window.baseline_end_s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_delta_f_times_baseline_is_corrected() {
        let fs = 100.0;
        let denoised: Vec<f64> = (0..2000).map(|i| 4.0 + 0.1 * (i as f64 * 0.02).sin()).collect();
        let corrected: Vec<f64> = (0..2000).map(|i| 0.05 * (i as f64 * 0.07).cos()).collect();

        let normalizer = BaselineNormalizer::new(&BaselineConfig::default());
        let df = normalizer.delta_f_over_f(&corrected, &denoised, fs).unwrap();

        assert_eq!(df.values.len(), corrected.len());
        for ((v, b), c) in df.values.iter().zip(&df.baseline).zip(&corrected) {
            assert_abs_diff_eq!(v * b, *c, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_baseline_propagates() {
        let values = divide_by_baseline(&[1.0, 0.0], &[0.0, 0.0]).unwrap();
        assert!(values[0].is_infinite());
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_z_score_window() {
        let time: Vec<f64> = (1..=100).map(|i| i as f64 * 0.1).collect();
        let signal: Vec<f64> = (0..100).map(|i| (i % 7) as f64).collect();

        let z = z_score(&signal, &time, 1.0, 5.0).unwrap();
        // Truncated start is the first time > 1.0
        assert!(z.time[0] > 1.0);
        assert_eq!(z.time.len(), z.values.len());
        assert!(z.time[z.baseline_end_index] > 5.0);
        assert!(z.time[z.baseline_end_index - 1] <= 5.0);

        let window = &z.values[..z.baseline_end_index];
        assert_abs_diff_eq!(mean(window), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std_dev(window), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_z_score_baseline_beyond_end() {
        let time = [1.0, 2.0, 3.0, 4.0];
        let z = z_score(&[1.0, 2.0, 3.0, 4.0], &time, 0.0, 100.0).unwrap();
        assert_eq!(z.baseline_end_index, 4);
        assert_abs_diff_eq!(z.mean, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_z_score_empty_window() {
        let time = [1.0, 2.0, 3.0, 4.0];
        match z_score(&[1.0, 2.0, 3.0, 4.0], &time, 0.5, 1.5) {
            Err(PhotometryError::EmptyBaselineWindow { samples, required }) => {
                assert_eq!(samples, 1);
                assert_eq!(required, 2);
            }
            other => panic!("Expected empty baseline window, got {:?}", other),
        }
    }

    #[test]
    fn test_z_score_start_after_end() {
        let err = z_score(&[1.0, 2.0], &[1.0, 2.0], 5.0, 6.0).unwrap_err();
        assert!(matches!(err, PhotometryError::InsufficientData { .. }));
    }

    #[test]
    fn test_z_score_with_rate() {
        let signal: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.3).sin()).collect();
        let window = ZScoreWindow {
            start_s: 1.0,
            baseline_end_s: 4.0,
        };
        let z = z_score_with_rate(&signal, 100.0, window).unwrap();
        // Samples at 1.01 s .. 10.0 s
        assert_eq!(z.values.len(), 900);
        assert_eq!(z.baseline_end_index, 300);
    }
}
