// src/processing/filters/median.rs
//! Sliding median filter for impulsive noise

use super::Filter;
use crate::error::{PhotometryResult, PipelineStage};
use crate::utils::validation::ensure_odd_window;

/// Odd-width sliding median; samples outside the trace count as zero
#[derive(Debug, Clone)]
pub struct MedianFilter {
    name: String,
    width: usize,
}

impl MedianFilter {
    pub fn new(width: usize) -> PhotometryResult<Self> {
        ensure_odd_window(width, PipelineStage::Filtering, "median_width")?;
        Ok(Self {
            name: format!("Median-{}", width),
            width,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Filter for MedianFilter {
    fn apply(&self, input: &[f64]) -> PhotometryResult<Vec<f64>> {
        if self.width == 1 {
            return Ok(input.to_vec());
        }

        let half = self.width / 2;
        let n = input.len();
        let mut window = Vec::with_capacity(self.width);
        let mut output = Vec::with_capacity(n);

        for i in 0..n {
            window.clear();
            for j in 0..self.width {
                let value = (i + j)
                    .checked_sub(half)
                    .and_then(|idx| input.get(idx))
                    .copied()
                    .unwrap_or(0.0);
                window.push(value);
            }
            window.sort_unstable_by(f64::total_cmp);
            output.push(window[half]);
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
