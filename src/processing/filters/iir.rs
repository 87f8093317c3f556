// src/processing/filters/iir.rs
//! Butterworth low-pass filters applied forward and backward (zero phase)

use super::{extend_edges, Filter, PadType};
use crate::config::constants::filter::{MAX_BUTTERWORTH_ORDER, MIN_BUTTERWORTH_ORDER, PAD_LENGTH_MULTIPLIER};
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};

/// Second-order section, `a[0]` normalised to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl Biquad {
    /// Gain at zero frequency
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[1] + self.a[2])
    }

    /// Transposed direct form II state matching a constant input `x`
    fn steady_state(&self, x: f64) -> [f64; 2] {
        let y = self.dc_gain() * x;
        let z1 = self.b[2] * x - self.a[2] * y;
        let z0 = self.b[1] * x - self.a[1] * y + z1;
        [z0, z1]
    }

    fn filter_in_place(&self, data: &mut [f64], mut z: [f64; 2]) {
        for value in data.iter_mut() {
            let x = *value;
            let y = self.b[0] * x + z[0];
            z[0] = self.b[1] * x - self.a[1] * y + z[1];
            z[1] = self.b[2] * x - self.a[2] * y;
            *value = y;
        }
    }
}

/// Butterworth low-pass run forward then backward over a padded trace
///
/// Each pass starts from the steady state of its first input sample, so a
/// constant trace passes through unchanged.
#[derive(Debug, Clone)]
pub struct ZeroPhaseFilter {
    name: String,
    sections: Vec<Biquad>,
    order: usize,
    cutoff_hz: f64,
    sampling_rate_hz: f64,
    pad_type: PadType,
}

impl ZeroPhaseFilter {
    /// Design a Butterworth low-pass of the given order
    pub fn butterworth_lowpass(
        order: usize,
        cutoff_hz: f64,
        sampling_rate_hz: f64,
        pad_type: PadType,
    ) -> PhotometryResult<Self> {
        let design_error = |reason: String| PhotometryError::InvalidFilterDesign {
            cutoff_hz,
            sampling_rate_hz,
            reason,
        };

        if !(MIN_BUTTERWORTH_ORDER..=MAX_BUTTERWORTH_ORDER).contains(&order) {
            return Err(design_error(format!(
                "order must be {}-{}, got {}",
                MIN_BUTTERWORTH_ORDER, MAX_BUTTERWORTH_ORDER, order
            )));
        }
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(design_error("sampling frequency must be positive".to_string()));
        }
        if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 {
            return Err(design_error("cutoff must be positive".to_string()));
        }
        if 2.0 * cutoff_hz >= sampling_rate_hz {
            return Err(design_error(format!(
                "cutoff must be below the Nyquist frequency ({} Hz)",
                sampling_rate_hz / 2.0
            )));
        }

        // Pre-warped cutoff for the bilinear transform
        let k = (std::f64::consts::PI * cutoff_hz / sampling_rate_hz).tan();
        let k2 = k * k;

        let mut sections = Vec::with_capacity(order.div_ceil(2));
        for i in 0..order / 2 {
            let theta = std::f64::consts::PI * (2 * i + 1) as f64 / (2 * order) as f64;
            let damping = 2.0 * theta.sin();
            let norm = 1.0 + damping * k + k2;
            sections.push(Biquad {
                b: [k2 / norm, 2.0 * k2 / norm, k2 / norm],
                a: [1.0, 2.0 * (k2 - 1.0) / norm, (1.0 - damping * k + k2) / norm],
            });
        }
        if order % 2 == 1 {
            let norm = 1.0 + k;
            sections.push(Biquad {
                b: [k / norm, k / norm, 0.0],
                a: [1.0, (k - 1.0) / norm, 0.0],
            });
        }

        Ok(Self {
            name: format!("Butterworth{}-LowPass-{}Hz", order, cutoff_hz),
            sections,
            order,
            cutoff_hz,
            sampling_rate_hz,
            pad_type,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// Samples added on each side before filtering
    pub fn pad_len(&self) -> usize {
        match self.pad_type {
            PadType::None => 0,
            _ => PAD_LENGTH_MULTIPLIER * (self.order + 1),
        }
    }

    fn filter_forward(&self, data: &mut [f64]) {
        for section in &self.sections {
            let Some(&first) = data.first() else {
                return;
            };
            section.filter_in_place(data, section.steady_state(first));
        }
    }
}

impl Filter for ZeroPhaseFilter {
    fn apply(&self, input: &[f64]) -> PhotometryResult<Vec<f64>> {
        let pad = self.pad_len();
        if input.len() <= pad || input.is_empty() {
            return Err(PhotometryError::insufficient(
                PipelineStage::Filtering,
                format!(
                    "{} needs more than {} samples, got {}",
                    self.name,
                    pad,
                    input.len()
                ),
            ));
        }

        let mut extended = extend_edges(input, pad, self.pad_type);
        self.filter_forward(&mut extended);
        extended.reverse();
        self.filter_forward(&mut extended);
        extended.reverse();

        Ok(extended[pad..pad + input.len()].to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
