// src/processing/polynomial.rs
//! Least-squares polynomial fitting for bleach-trend removal
//!
//! The abscissa is mapped onto `[-1, 1]` before fitting, so long recordings
//! (hundreds of thousands of samples) stay well conditioned. The system is
//! solved with Householder QR rather than normal equations.

use ndarray::{Array1, Array2};

use crate::config::constants::debleach::RANK_TOLERANCE;
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};
use crate::utils::validation::ensure_min_len;

/// Polynomial fitted over a mapped domain
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFit {
    /// Ascending powers of the mapped variable `u = (x - offset) / scale`
    coefficients: Vec<f64>,
    offset: f64,
    scale: f64,
}

impl PolynomialFit {
    /// Fit a polynomial of `degree` to `(x, y)` in the least-squares sense
    pub fn fit(x: &[f64], y: &[f64], degree: usize) -> PhotometryResult<Self> {
        if x.len() != y.len() {
            return Err(PhotometryError::invalid_parameter(
                PipelineStage::Debleaching,
                "x",
                format!("abscissa has {} samples, ordinate has {}", x.len(), y.len()),
            ));
        }
        ensure_min_len(y, degree + 1, PipelineStage::Debleaching, "polynomial fit input")?;

        let lo = x.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let offset = (lo + hi) / 2.0;
        let scale = if hi > lo { (hi - lo) / 2.0 } else { 1.0 };

        let columns = degree + 1;
        let mut design = Array2::<f64>::zeros((x.len(), columns));
        for (row, &xi) in x.iter().enumerate() {
            let u = (xi - offset) / scale;
            let mut power = 1.0;
            for col in 0..columns {
                design[[row, col]] = power;
                power *= u;
            }
        }

        let coefficients = solve_least_squares(design, Array1::from(y.to_vec()))?;

        Ok(Self {
            coefficients,
            offset,
            scale,
        })
    }

    /// Fit against the sample-index axis `0..N-1`
    pub fn fit_indexed(y: &[f64], degree: usize) -> PhotometryResult<Self> {
        Self::fit(&index_axis(y.len()), y, degree)
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Coefficients in ascending powers of the mapped variable
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let u = (x - self.offset) / self.scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * u + c)
    }

    pub fn evaluate_all(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.evaluate(xi)).collect()
    }
}

/// Sample-index abscissa `0, 1, ..., n - 1`
pub fn index_axis(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// Subtract a fitted polynomial trend, returning the residual and the fit
pub fn detrend(y: &[f64], degree: usize) -> PhotometryResult<(Vec<f64>, PolynomialFit)> {
    let x = index_axis(y.len());
    let fit = PolynomialFit::fit(&x, y, degree)?;
    let residual = y
        .iter()
        .zip(&x)
        .map(|(&yi, &xi)| yi - fit.evaluate(xi))
        .collect();
    Ok((residual, fit))
}

/// Minimise `|A c - b|` by Householder QR and back substitution
fn solve_least_squares(mut a: Array2<f64>, mut b: Array1<f64>) -> PhotometryResult<Vec<f64>> {
    let (rows, cols) = a.dim();
    let rank_deficient = || {
        PhotometryError::insufficient(
            PipelineStage::Debleaching,
            "polynomial fit is rank deficient (too few distinct abscissa values)",
        )
    };

    for k in 0..cols {
        let norm = (k..rows).map(|i| a[[i, k]] * a[[i, k]]).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(rank_deficient());
        }
        let alpha = if a[[k, k]] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = (k..rows).map(|i| a[[i, k]]).collect();
        v[0] -= alpha;
        let v_norm_sq: f64 = v.iter().map(|vi| vi * vi).sum();

        for j in k..cols {
            let dot: f64 = v.iter().enumerate().map(|(idx, vi)| vi * a[[k + idx, j]]).sum();
            let factor = 2.0 * dot / v_norm_sq;
            for (idx, vi) in v.iter().enumerate() {
                a[[k + idx, j]] -= factor * vi;
            }
        }

        let dot: f64 = v.iter().enumerate().map(|(idx, vi)| vi * b[k + idx]).sum();
        let factor = 2.0 * dot / v_norm_sq;
        for (idx, vi) in v.iter().enumerate() {
            b[k + idx] -= factor * vi;
        }
    }

    let max_pivot = (0..cols).map(|k| a[[k, k]].abs()).fold(0.0, f64::max);
    let mut solution = vec![0.0; cols];
    for k in (0..cols).rev() {
        let pivot = a[[k, k]];
        if pivot.abs() <= RANK_TOLERANCE * max_pivot {
            return Err(rank_deficient());
        }
        let tail: f64 = ((k + 1)..cols).map(|j| a[[k, j]] * solution[j]).sum();
        solution[k] = (b[k] - tail) / pivot;
    }

    Ok(solution)
}
