// src/utils/stats.rs
//! Descriptive statistics and ordinary least-squares line fitting

use serde::{Deserialize, Serialize};

use crate::error::{PhotometryError, PhotometryResult, PipelineStage};

/// Arithmetic mean, NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Pearson correlation coefficient between two equally long series
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    sxy / (sxx * syy).sqrt()
}

/// Straight line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Change in `y` per unit of `x`
    pub slope: f64,
    /// Value of `y` at `x = 0`
    pub intercept: f64,
}

impl LinearFit {
    /// Least-squares regression of `y` on `x`
    ///
    /// Fails with `InsufficientData` when `x` has zero variance.
    pub fn fit(x: &[f64], y: &[f64], stage: PipelineStage) -> PhotometryResult<Self> {
        if x.len() != y.len() {
            return Err(PhotometryError::ChannelAlignment {
                stage,
                dynamic_len: y.len(),
                isosbestic_len: x.len(),
            });
        }
        if x.is_empty() {
            return Err(PhotometryError::insufficient(stage, "regression needs at least one sample"));
        }

        let mx = mean(x);
        let my = mean(y);

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - mx;
            sxy += dx * (yi - my);
            sxx += dx * dx;
        }

        if sxx == 0.0 || !sxx.is_finite() {
            return Err(PhotometryError::insufficient(stage, "regressor has zero variance"));
        }

        let slope = sxy / sxx;
        Ok(Self {
            slope,
            intercept: my - slope * mx,
        })
    }

    /// Evaluate the line at `x`
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Evaluate the line over a series
    pub fn predict_all(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.predict(xi)).collect()
    }
}
