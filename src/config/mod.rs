// src/config/mod.rs
//! Pipeline configuration

pub mod constants;
pub mod loader;

pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use serde::{Deserialize, Serialize};

use crate::error::{PhotometryError, PhotometryResult};
use crate::processing::downsample::BlockMode;
use crate::processing::strategy::NormalizationStrategy;
use crate::processing::trim::TrimPolicy;

/// Complete pipeline configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PhotometryConfig {
    #[serde(default)]
    pub channels: ChannelConfig,
    #[serde(default)]
    pub trim: TrimConfig,
    #[serde(default)]
    pub denoise: DenoiseConfig,
    #[serde(default)]
    pub debleach: DebleachConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub normalization: NormalizationConfig,
    #[serde(default)]
    pub downsample: DownsampleConfig,
}

/// Stream names for the two channels
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChannelConfig {
    #[serde(default = "defaults::dynamic_channel")]
    pub dynamic: String,

    #[serde(default = "defaults::isosbestic_channel")]
    pub isosbestic: String,
}

/// Onset artifact removal
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrimConfig {
    #[serde(default = "defaults::trim_cutoff_s")]
    pub cutoff_s: f64,

    /// Drop a fixed number of leading samples instead of a time window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_samples: Option<usize>,
}

/// Median and low-pass denoising
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DenoiseConfig {
    #[serde(default = "defaults::median_width")]
    pub median_width: usize,

    #[serde(default = "defaults::denoise_order")]
    pub lowpass_order: usize,

    #[serde(default = "defaults::denoise_cutoff_hz")]
    pub lowpass_cutoff_hz: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DebleachConfig {
    #[serde(default = "defaults::polynomial_order")]
    pub polynomial_order: usize,
}

/// Slow baseline-fluorescence filter
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BaselineConfig {
    #[serde(default = "defaults::baseline_order")]
    pub lowpass_order: usize,

    #[serde(default = "defaults::baseline_cutoff_hz")]
    pub lowpass_cutoff_hz: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub strategy: NormalizationStrategy,

    /// When set, the dF/F output is z-scored against this window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zscore: Option<ZScoreWindow>,
}

/// Analysis start and baseline end, both in seconds on the trace time axis
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct ZScoreWindow {
    pub start_s: f64,
    pub baseline_end_s: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DownsampleConfig {
    #[serde(default = "defaults::downsample_factor")]
    pub factor: usize,

    #[serde(default)]
    pub mode: BlockMode,

    #[serde(default)]
    pub apply_to_output: bool,
}

/// Default value providers using constants
mod defaults {
    use crate::config::constants::*;

    pub fn dynamic_channel() -> String { channels::DEFAULT_DYNAMIC_CHANNEL.to_string() }
    pub fn isosbestic_channel() -> String { channels::DEFAULT_ISOSBESTIC_CHANNEL.to_string() }

    pub fn trim_cutoff_s() -> f64 { trim::DEFAULT_CUTOFF_S }

    pub fn median_width() -> usize { filter::DEFAULT_MEDIAN_WIDTH }
    pub fn denoise_order() -> usize { filter::DEFAULT_DENOISE_ORDER }
    pub fn denoise_cutoff_hz() -> f64 { filter::DEFAULT_DENOISE_CUTOFF_HZ }
    pub fn baseline_order() -> usize { filter::DEFAULT_BASELINE_ORDER }
    pub fn baseline_cutoff_hz() -> f64 { filter::DEFAULT_BASELINE_CUTOFF_HZ }

    pub fn polynomial_order() -> usize { debleach::DEFAULT_POLYNOMIAL_ORDER }

    pub fn downsample_factor() -> usize { downsample::DEFAULT_FACTOR }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            dynamic: defaults::dynamic_channel(),
            isosbestic: defaults::isosbestic_channel(),
        }
    }
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            cutoff_s: defaults::trim_cutoff_s(),
            skip_samples: None,
        }
    }
}

impl TrimConfig {
    /// Trim policy described by this section
    pub fn policy(&self) -> TrimPolicy {
        match self.skip_samples {
            Some(count) => TrimPolicy::Samples(count),
            None => TrimPolicy::Seconds(self.cutoff_s),
        }
    }
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            median_width: defaults::median_width(),
            lowpass_order: defaults::denoise_order(),
            lowpass_cutoff_hz: defaults::denoise_cutoff_hz(),
        }
    }
}

impl Default for DebleachConfig {
    fn default() -> Self {
        Self {
            polynomial_order: defaults::polynomial_order(),
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            lowpass_order: defaults::baseline_order(),
            lowpass_cutoff_hz: defaults::baseline_cutoff_hz(),
        }
    }
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            factor: defaults::downsample_factor(),
            mode: BlockMode::default(),
            apply_to_output: false,
        }
    }
}

impl PhotometryConfig {
    /// Check every range and cross-field constraint, collecting all violations
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.channels.dynamic.is_empty() || self.channels.isosbestic.is_empty() {
            errors.push("channel names must not be empty".to_string());
        }
        if self.channels.dynamic == self.channels.isosbestic {
            errors.push(format!(
                "dynamic and isosbestic channels must differ (both '{}')",
                self.channels.dynamic
            ));
        }

        if !self.trim.cutoff_s.is_finite() || self.trim.cutoff_s < 0.0 {
            errors.push(format!("trim cutoff must be a non-negative number of seconds, got {}", self.trim.cutoff_s));
        }

        if self.denoise.median_width == 0 || self.denoise.median_width % 2 == 0 {
            errors.push(format!("median width must be odd, got {}", self.denoise.median_width));
        }

        for (name, order, cutoff) in [
            ("denoise", self.denoise.lowpass_order, self.denoise.lowpass_cutoff_hz),
            ("baseline", self.baseline.lowpass_order, self.baseline.lowpass_cutoff_hz),
        ] {
            if !(filter::MIN_BUTTERWORTH_ORDER..=filter::MAX_BUTTERWORTH_ORDER).contains(&order) {
                errors.push(format!(
                    "{} low-pass order must be {}-{}, got {}",
                    name, filter::MIN_BUTTERWORTH_ORDER, filter::MAX_BUTTERWORTH_ORDER, order
                ));
            }
            if !cutoff.is_finite() || cutoff <= 0.0 {
                errors.push(format!("{} low-pass cutoff must be positive, got {} Hz", name, cutoff));
            }
        }

        if self.debleach.polynomial_order > debleach::MAX_POLYNOMIAL_ORDER {
            errors.push(format!(
                "debleach polynomial order must be at most {}, got {}",
                debleach::MAX_POLYNOMIAL_ORDER, self.debleach.polynomial_order
            ));
        }

        if let Some(window) = &self.normalization.zscore {
            if !window.start_s.is_finite() || !window.baseline_end_s.is_finite() {
                errors.push("z-score window bounds must be finite".to_string());
            } else if window.baseline_end_s <= window.start_s {
                errors.push(format!(
                    "z-score baseline end ({} s) must be after the analysis start ({} s)",
                    window.baseline_end_s, window.start_s
                ));
            }
        }

        if self.downsample.factor == 0 {
            errors.push("downsample factor must be at least 1".to_string());
        }

        errors
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> PhotometryResult<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PhotometryError::Configuration(ConfigError::Validation(errors)))
        }
    }
}
