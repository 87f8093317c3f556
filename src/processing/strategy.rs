// src/processing/strategy.rs
//! Normalization strategy selection and the single-step alternate method

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::constants::normalization::PERCENT_SCALE;
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};
use crate::utils::stats::{mean, LinearFit};
use crate::utils::validation::{ensure_aligned, ensure_non_empty};

/// Method used to turn the channel pair into dF/F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NormalizationStrategy {
    /// Filter, debleach, regress and divide by a slow baseline
    #[default]
    Default,
    /// Regress the raw traces and express the residual in percent
    Alternate,
}

impl NormalizationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationStrategy::Default => "default",
            NormalizationStrategy::Alternate => "alternate",
        }
    }

    /// Units of the dF/F this strategy produces
    pub fn units(&self) -> DeltaFUnits {
        match self {
            NormalizationStrategy::Default => DeltaFUnits::Fraction,
            NormalizationStrategy::Alternate => DeltaFUnits::Percent,
        }
    }
}

impl fmt::Display for NormalizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationStrategy {
    type Err = PhotometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(NormalizationStrategy::Default),
            "alternate" | "legacy" => Ok(NormalizationStrategy::Alternate),
            _ => Err(PhotometryError::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for NormalizationStrategy {
    type Error = PhotometryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NormalizationStrategy> for String {
    fn from(strategy: NormalizationStrategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Scale of a dF/F trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaFUnits {
    /// `dF / F`
    Fraction,
    /// `100 * dF / F`
    Percent,
}

/// Baseline chosen by the alternate method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AlternateBaseline {
    /// Fitted isosbestic prediction `slope * x + intercept`
    Regression(LinearFit),
    /// Mean of the dynamic trace, used when the regression slope is negative
    Mean {
        /// Mean of the dynamic trace
        value: f64,
        /// Negative slope that triggered the fallback
        rejected_slope: f64,
    },
}

impl AlternateBaseline {
    pub fn is_fallback(&self) -> bool {
        matches!(self, AlternateBaseline::Mean { .. })
    }
}

/// Percent dF/F from the alternate method
#[derive(Debug, Clone)]
pub struct AlternateDeltaF {
    /// `100 * (dynamic - baseline) / baseline`
    pub values: Vec<f64>,
    pub baseline: AlternateBaseline,
}

/// Regress raw dynamic on raw isosbestic and express the residual in percent
///
/// A negative slope means the isosbestic is anti-correlated with the
/// dynamic channel; the baseline then falls back to the dynamic mean.
pub fn alternate_delta_f(dynamic: &[f64], isosbestic: &[f64]) -> PhotometryResult<AlternateDeltaF> {
    ensure_aligned(dynamic, isosbestic, PipelineStage::Normalization)?;
    ensure_non_empty(dynamic, PipelineStage::Normalization, "dynamic trace")?;

    let fit = LinearFit::fit(isosbestic, dynamic, PipelineStage::Normalization)?;

    let (values, baseline) = if fit.slope < 0.0 {
        let value = mean(dynamic);
        warn!(slope = fit.slope, baseline = value, "negative isosbestic slope, using dynamic mean as baseline");
        let values = dynamic
            .iter()
            .map(|y| PERCENT_SCALE * (y - value) / value)
            .collect();
        (
            values,
            AlternateBaseline::Mean {
                value,
                rejected_slope: fit.slope,
            },
        )
    } else {
        debug!(slope = fit.slope, intercept = fit.intercept, "alternate regression baseline");
        let values = dynamic
            .iter()
            .zip(isosbestic)
            .map(|(y, x)| {
                let b = fit.predict(*x);
                PERCENT_SCALE * (y - b) / b
            })
            .collect();
        (values, AlternateBaseline::Regression(fit))
    };

    Ok(AlternateDeltaF { values, baseline })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_parse_strategy() {
        assert_eq!("default".parse::<NormalizationStrategy>().unwrap(), NormalizationStrategy::Default);
        assert_eq!("Alternate".parse::<NormalizationStrategy>().unwrap(), NormalizationStrategy::Alternate);
        assert_eq!("legacy".parse::<NormalizationStrategy>().unwrap(), NormalizationStrategy::Alternate);

        match "ratio".parse::<NormalizationStrategy>() {
            Err(PhotometryError::UnknownStrategy(tag)) => assert_eq!(tag, "ratio"),
            other => panic!("Expected unknown strategy, got {:?}", other),
        }
    }

    #[test]
    fn test_strategy_units() {
        assert_eq!(NormalizationStrategy::default().units(), DeltaFUnits::Fraction);
        assert_eq!(NormalizationStrategy::Alternate.units(), DeltaFUnits::Percent);
        assert_eq!(NormalizationStrategy::Alternate.to_string(), "alternate");
    }

    #[test]
    fn test_positive_slope_uses_regression() {
        let x: Vec<f64> = (0..100).map(|i| 1.0 + 0.01 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();

        let result = alternate_delta_f(&y, &x).unwrap();
        assert!(!result.baseline.is_fallback());
        for v in &result.values {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_negative_slope_falls_back_to_mean() {
        let x: Vec<f64> = (0..100).map(|i| 1.0 + 0.01 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 5.0 - v).collect();
        let m = mean(&y);

        let result = alternate_delta_f(&y, &x).unwrap();
        match result.baseline {
            AlternateBaseline::Mean { value, rejected_slope } => {
                assert_abs_diff_eq!(value, m, epsilon = 1e-12);
                assert!(rejected_slope < 0.0);
            }
            other => panic!("Expected mean baseline, got {:?}", other),
        }
        for (v, yi) in result.values.iter().zip(&y) {
            assert_abs_diff_eq!(*v, 100.0 * (yi - m) / m, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_alternate_length_mismatch() {
        assert!(matches!(
            alternate_delta_f(&[1.0, 2.0], &[1.0]),
            Err(PhotometryError::ChannelAlignment { .. })
        ));
    }
}
