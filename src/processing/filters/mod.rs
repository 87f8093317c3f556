// src/processing/filters/mod.rs
//! Digital filters for photometry traces
//!
//! All filters here operate on a fully buffered trace and return a new
//! buffer of the same length.

pub mod iir;
pub mod median;

pub use iir::*;
pub use median::*;

use serde::{Deserialize, Serialize};

use crate::error::PhotometryResult;

/// Whole-trace filter
pub trait Filter {
    fn apply(&self, input: &[f64]) -> PhotometryResult<Vec<f64>>;
    fn name(&self) -> &str;
}

/// Edge extension used before forward-backward filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadType {
    /// Point reflection about the edge sample: `2 * x[0] - x[i]`
    Odd,
    /// Mirror reflection excluding the edge sample: `x[i]`
    Even,
    /// Repeat the edge sample
    Constant,
    /// No extension
    None,
}

/// Ordered chain of filters applied one after another
pub struct FilterChain {
    filters: Vec<Box<dyn Filter + Send + Sync>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Append a filter to the end of the chain
    pub fn with(mut self, filter: Box<dyn Filter + Send + Sync>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn process(&self, input: &[f64]) -> PhotometryResult<Vec<f64>> {
        let mut current = input.to_vec();
        for filter in &self.filters {
            current = filter.apply(&current)?;
        }
        Ok(current)
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Extend `input` by `pad` samples on both sides
pub(crate) fn extend_edges(input: &[f64], pad: usize, pad_type: PadType) -> Vec<f64> {
    let n = input.len();
    let mut out = Vec::with_capacity(n + 2 * pad);
    if n == 0 || pad == 0 {
        out.extend_from_slice(input);
        return out;
    }

    let first = input[0];
    let last = input[n - 1];

    match pad_type {
        PadType::Odd => {
            out.extend((1..=pad).rev().map(|i| 2.0 * first - input[i]));
            out.extend_from_slice(input);
            out.extend((1..=pad).map(|i| 2.0 * last - input[n - 1 - i]));
        }
        PadType::Even => {
            out.extend((1..=pad).rev().map(|i| input[i]));
            out.extend_from_slice(input);
            out.extend((1..=pad).map(|i| input[n - 1 - i]));
        }
        PadType::Constant => {
            out.extend(std::iter::repeat(first).take(pad));
            out.extend_from_slice(input);
            out.extend(std::iter::repeat(last).take(pad));
        }
        PadType::None => out.extend_from_slice(input),
    }

    out
}
