// src/utils/validation.rs
//! Input validation shared by the processing stages
//!
//! Each check raises the pipeline error for the stage that called it so the
//! failure is reported where the violation was detected.

use crate::error::{PhotometryError, PhotometryResult, PipelineStage};

/// Reject empty traces
pub fn ensure_non_empty(samples: &[f64], stage: PipelineStage, what: &str) -> PhotometryResult<()> {
    if samples.is_empty() {
        return Err(PhotometryError::insufficient(stage, format!("{} is empty", what)));
    }
    Ok(())
}

/// Require at least `required` samples
pub fn ensure_min_len(
    samples: &[f64],
    required: usize,
    stage: PipelineStage,
    what: &str,
) -> PhotometryResult<()> {
    if samples.len() < required {
        return Err(PhotometryError::insufficient(
            stage,
            format!("{} has {} samples, at least {} required", what, samples.len(), required),
        ));
    }
    Ok(())
}

/// Require the dynamic and isosbestic traces to be sample-aligned
pub fn ensure_aligned(dynamic: &[f64], isosbestic: &[f64], stage: PipelineStage) -> PhotometryResult<()> {
    if dynamic.len() != isosbestic.len() {
        return Err(PhotometryError::ChannelAlignment {
            stage,
            dynamic_len: dynamic.len(),
            isosbestic_len: isosbestic.len(),
        });
    }
    Ok(())
}

/// Require an odd, non-zero window width
pub fn ensure_odd_window(width: usize, stage: PipelineStage, name: &str) -> PhotometryResult<()> {
    if width == 0 || width % 2 == 0 {
        return Err(PhotometryError::invalid_parameter(
            stage,
            name,
            format!("window width must be odd, got {}", width),
        ));
    }
    Ok(())
}

/// Require a finite value strictly greater than zero
pub fn ensure_positive(value: f64, stage: PipelineStage, name: &str) -> PhotometryResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PhotometryError::invalid_parameter(
            stage,
            name,
            format!("must be positive and finite, got {}", value),
        ));
    }
    Ok(())
}
