// src/utils/time.rs
//! Sample-index time axes
//!
//! Time is derived from the sample count and sampling frequency, never
//! stored independently. The convention is 1-indexed: sample `i` sits at
//! `(i + 1) / fs` seconds.

use crate::error::{PhotometryResult, PipelineStage};
use crate::utils::validation::ensure_positive;

/// Build the 1-indexed time axis for `sample_count` samples at `sampling_frequency` Hz
pub fn time_axis(sample_count: usize, sampling_frequency: f64) -> Vec<f64> {
    (1..=sample_count)
        .map(|i| i as f64 / sampling_frequency)
        .collect()
}

/// Total duration covered by `sample_count` samples
pub fn duration_seconds(sample_count: usize, sampling_frequency: f64) -> f64 {
    sample_count as f64 / sampling_frequency
}

/// Index of the first sample whose time strictly exceeds `threshold_s`
pub fn first_index_after(time: &[f64], threshold_s: f64) -> Option<usize> {
    time.iter().position(|&t| t > threshold_s)
}

/// Validate a sampling frequency
pub fn validate_sampling_frequency(sampling_frequency: f64) -> PhotometryResult<()> {
    ensure_positive(sampling_frequency, PipelineStage::Acquisition, "sampling_frequency")
}
