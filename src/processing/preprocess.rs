// src/processing/preprocess.rs
//! Per-channel denoising and bleach removal

use tracing::debug;

use crate::config::{DebleachConfig, DenoiseConfig, PhotometryConfig};
use crate::error::{PhotometryResult, PipelineStage};
use crate::processing::filters::{FilterChain, MedianFilter, PadType, ZeroPhaseFilter};
use crate::processing::polynomial::{detrend, PolynomialFit};
use crate::utils::validation::ensure_non_empty;

/// Output of preprocessing one channel
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Denoised trace with the polynomial bleach trend subtracted
    pub debleached: Vec<f64>,
    /// Median + low-pass filtered trace, bleach still present
    pub denoised: Vec<f64>,
    /// Fitted bleach trend over the sample-index axis
    pub bleach_fit: PolynomialFit,
}

/// Median filter, zero-phase low-pass and polynomial debleach
#[derive(Debug, Clone)]
pub struct Preprocessor {
    median: MedianFilter,
    lowpass_order: usize,
    lowpass_cutoff_hz: f64,
    polynomial_order: usize,
}

impl Preprocessor {
    pub fn new(denoise: &DenoiseConfig, debleach: &DebleachConfig) -> PhotometryResult<Self> {
        Ok(Self {
            median: MedianFilter::new(denoise.median_width)?,
            lowpass_order: denoise.lowpass_order,
            lowpass_cutoff_hz: denoise.lowpass_cutoff_hz,
            polynomial_order: debleach.polynomial_order,
        })
    }

    pub fn from_config(config: &PhotometryConfig) -> PhotometryResult<Self> {
        Self::new(&config.denoise, &config.debleach)
    }

    pub fn polynomial_order(&self) -> usize {
        self.polynomial_order
    }

    /// Denoising chain for a given sampling frequency
    ///
    /// The low-pass design depends on `fs`, so the chain is built per trace.
    pub fn denoise_chain(&self, sampling_frequency: f64) -> PhotometryResult<FilterChain> {
        let lowpass = ZeroPhaseFilter::butterworth_lowpass(
            self.lowpass_order,
            self.lowpass_cutoff_hz,
            sampling_frequency,
            PadType::Odd,
        )?;
        Ok(FilterChain::new()
            .with(Box::new(self.median.clone()))
            .with(Box::new(lowpass)))
    }

    /// Median filter then zero-phase low-pass
    pub fn denoise(&self, samples: &[f64], sampling_frequency: f64) -> PhotometryResult<Vec<f64>> {
        ensure_non_empty(samples, PipelineStage::Filtering, "trace")?;
        self.denoise_chain(sampling_frequency)?.process(samples)
    }

    /// Denoise then debleach one channel
    pub fn preprocess(&self, samples: &[f64], sampling_frequency: f64) -> PhotometryResult<Preprocessed> {
        let denoised = self.denoise(samples, sampling_frequency)?;
        let (debleached, bleach_fit) = debleach(&denoised, self.polynomial_order)?;

        debug!(
            samples = samples.len(),
            polynomial_order = self.polynomial_order,
            "channel preprocessed"
        );

        Ok(Preprocessed {
            debleached,
            denoised,
            bleach_fit,
        })
    }
}

/// Subtract a least-squares polynomial of `order` fitted against the sample index
pub fn debleach(denoised: &[f64], order: usize) -> PhotometryResult<(Vec<f64>, PolynomialFit)> {
    ensure_non_empty(denoised, PipelineStage::Debleaching, "denoised trace")?;
    detrend(denoised, order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn preprocessor() -> Preprocessor {
        Preprocessor::new(&DenoiseConfig::default(), &DebleachConfig::default()).unwrap()
    }

    fn bleaching_trace(n: usize, fs: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = (i + 1) as f64 / fs;
                5.0 * (-t / 40.0).exp() + 2.0 + 0.3 * (2.0 * std::f64::consts::PI * 0.5 * t).sin()
            })
            .collect()
    }

    #[test]
    fn test_preserves_length() {
        let input = bleaching_trace(2000, 100.0);
        let out = preprocessor().preprocess(&input, 100.0).unwrap();

        assert_eq!(out.denoised.len(), input.len());
        assert_eq!(out.debleached.len(), input.len());
        assert_eq!(out.bleach_fit.degree(), 4);
    }

    #[test]
    fn test_debleached_has_no_residual_trend() {
        let out = preprocessor().preprocess(&bleaching_trace(3000, 100.0), 100.0).unwrap();
        let refit = PolynomialFit::fit_indexed(&out.debleached, 4).unwrap();
        for &c in refit.coefficients() {
            assert_abs_diff_eq!(c, 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_chain_order() {
        let chain = preprocessor().denoise_chain(100.0).unwrap();
        let names = chain.names();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("Median"));
        assert!(names[1].starts_with("Butterworth"));
    }

    #[test]
    fn test_cutoff_above_nyquist() {
        let err = preprocessor().preprocess(&bleaching_trace(500, 15.0), 15.0).unwrap_err();
        assert_eq!(err.stage(), PipelineStage::Filtering);
    }

    #[test]
    fn test_empty_trace() {
        assert!(preprocessor().preprocess(&[], 100.0).is_err());
        assert!(debleach(&[], 4).is_err());
    }
}
