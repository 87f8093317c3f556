// src/error.rs
//! Unified error handling for the photometry pipeline
//!
//! Every stage reports failures through [`PhotometryError`]. Errors are raised
//! at the point of violation and propagated unchanged; no stage substitutes a
//! default value for invalid numerical input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Unified error type for the photometry pipeline
#[derive(Debug, Error)]
pub enum PhotometryError {
    /// A trim, window or fit left no usable samples
    #[error("[{stage}] insufficient data: {reason}")]
    InsufficientData {
        stage: PipelineStage,
        reason: String,
    },

    /// Filter cutoff incompatible with the sampling frequency or order out of range
    #[error("[FILTER] invalid filter design: {reason} (cutoff {cutoff_hz} Hz, sampling {sampling_rate_hz} Hz)")]
    InvalidFilterDesign {
        cutoff_hz: f64,
        sampling_rate_hz: f64,
        reason: String,
    },

    /// Dynamic and isosbestic traces differ in length
    #[error("[{stage}] channel alignment error: dynamic has {dynamic_len} samples, isosbestic has {isosbestic_len}")]
    ChannelAlignment {
        stage: PipelineStage,
        dynamic_len: usize,
        isosbestic_len: usize,
    },

    /// Baseline window holds too few samples to estimate a variance
    #[error("[NORMALIZATION] baseline window has {samples} samples, at least {required} required")]
    EmptyBaselineWindow { samples: usize, required: usize },

    /// Strategy tag not recognised
    #[error("[CONFIG] unknown normalization strategy '{0}' (expected 'default' or 'alternate')")]
    UnknownStrategy(String),

    /// Named channel absent from the recording
    #[error("[ACQUISITION] channel '{name}' ({role}) not found in recording")]
    MissingChannel { name: String, role: String },

    /// Dynamic and isosbestic were sampled at different rates
    #[error("[ACQUISITION] sampling frequency mismatch: dynamic {dynamic_hz} Hz, isosbestic {isosbestic_hz} Hz")]
    SamplingRateMismatch { dynamic_hz: f64, isosbestic_hz: f64 },

    /// Parameter outside its valid range
    #[error("[{stage}] invalid parameter '{name}': {reason}")]
    InvalidParameter {
        stage: PipelineStage,
        name: String,
        reason: String,
    },

    /// Configuration loading or validation failure
    #[error("[CONFIG] {0}")]
    Configuration(#[from] ConfigError),
}

/// Pipeline stages for error tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Acquisition,
    Trimming,
    Filtering,
    Debleaching,
    MotionCorrection,
    Normalization,
    Downsampling,
    Configuration,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Acquisition => "ACQUISITION",
            PipelineStage::Trimming => "TRIM",
            PipelineStage::Filtering => "FILTER",
            PipelineStage::Debleaching => "DEBLEACH",
            PipelineStage::MotionCorrection => "MOTION",
            PipelineStage::Normalization => "NORMALIZATION",
            PipelineStage::Downsampling => "DOWNSAMPLE",
            PipelineStage::Configuration => "CONFIG",
        };
        f.write_str(name)
    }
}

impl PhotometryError {
    /// Stage in which the error was raised
    pub fn stage(&self) -> PipelineStage {
        match self {
            PhotometryError::InsufficientData { stage, .. }
            | PhotometryError::ChannelAlignment { stage, .. }
            | PhotometryError::InvalidParameter { stage, .. } => *stage,
            PhotometryError::InvalidFilterDesign { .. } => PipelineStage::Filtering,
            PhotometryError::EmptyBaselineWindow { .. } => PipelineStage::Normalization,
            PhotometryError::UnknownStrategy(_) | PhotometryError::Configuration(_) => {
                PipelineStage::Configuration
            }
            PhotometryError::MissingChannel { .. } | PhotometryError::SamplingRateMismatch { .. } => {
                PipelineStage::Acquisition
            }
        }
    }

    pub(crate) fn insufficient(stage: PipelineStage, reason: impl Into<String>) -> Self {
        PhotometryError::InsufficientData {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(
        stage: PipelineStage,
        name: &str,
        reason: impl Into<String>,
    ) -> Self {
        PhotometryError::InvalidParameter {
            stage,
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for photometry operations
pub type PhotometryResult<T> = Result<T, PhotometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PhotometryError::ChannelAlignment {
            stage: PipelineStage::MotionCorrection,
            dynamic_len: 1000,
            isosbestic_len: 999,
        };

        let display = err.to_string();
        assert!(display.contains("MOTION"));
        assert!(display.contains("1000"));
        assert!(display.contains("999"));
    }

    #[test]
    fn test_error_stage() {
        let err = PhotometryError::EmptyBaselineWindow {
            samples: 1,
            required: 2,
        };
        assert_eq!(err.stage(), PipelineStage::Normalization);

        let err = PhotometryError::UnknownStrategy("fancy".to_string());
        assert_eq!(err.stage(), PipelineStage::Configuration);
        assert!(err.to_string().contains("fancy"));
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PhotometryError>();
    }

    #[test]
    fn test_config_error_conversion() {
        let config_err = ConfigError::Validation(vec!["median width must be odd".to_string()]);
        let err: PhotometryError = config_err.into();

        match err {
            PhotometryError::Configuration(ConfigError::Validation(messages)) => {
                assert_eq!(messages.len(), 1);
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
    }
}
