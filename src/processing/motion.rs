// src/processing/motion.rs
//! Isosbestic regression for motion artifact removal

use tracing::debug;

use crate::error::{PhotometryResult, PipelineStage};
use crate::utils::stats::LinearFit;
use crate::utils::validation::{ensure_aligned, ensure_non_empty};

/// Motion-corrected dynamic trace with the regression that produced it
#[derive(Debug, Clone)]
pub struct MotionCorrection {
    pub corrected: Vec<f64>,
    /// `intercept + slope * isosbestic`
    pub estimated_motion: Vec<f64>,
    pub fit: LinearFit,
}

/// Regress the debleached dynamic trace on the debleached isosbestic trace
/// and subtract the prediction
pub fn correct_motion(dynamic: &[f64], isosbestic: &[f64]) -> PhotometryResult<MotionCorrection> {
    ensure_aligned(dynamic, isosbestic, PipelineStage::MotionCorrection)?;
    ensure_non_empty(dynamic, PipelineStage::MotionCorrection, "dynamic trace")?;

    let fit = LinearFit::fit(isosbestic, dynamic, PipelineStage::MotionCorrection)?;
    let estimated_motion = fit.predict_all(isosbestic);
    let corrected = dynamic
        .iter()
        .zip(&estimated_motion)
        .map(|(y, m)| y - m)
        .collect();

    debug!(slope = fit.slope, intercept = fit.intercept, "motion regression");

    Ok(MotionCorrection {
        corrected,
        estimated_motion,
        fit,
    })
}
