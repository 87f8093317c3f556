// src/processing/downsample.rs
//! Block averaging of traces and their time axes

use serde::{Deserialize, Serialize};

use crate::config::DownsampleConfig;
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};
use crate::utils::stats::mean;

/// How many samples each block averages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockMode {
    /// `[i, i + N - 1)`: the last sample of every block is left out
    #[default]
    Legacy,
    /// `[i, i + N)`
    Exact,
}

/// Downsampled trace and time axis
#[derive(Debug, Clone, PartialEq)]
pub struct Downsampled {
    /// Block means
    pub samples: Vec<f64>,
    /// Time of each block's first sample
    pub time: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct Downsampler {
    factor: usize,
    mode: BlockMode,
}

impl Downsampler {
    pub fn new(factor: usize, mode: BlockMode) -> PhotometryResult<Self> {
        if factor == 0 {
            return Err(PhotometryError::invalid_parameter(
                PipelineStage::Downsampling,
                "factor",
                "must be at least 1",
            ));
        }
        Ok(Self { factor, mode })
    }

    pub fn from_config(config: &DownsampleConfig) -> PhotometryResult<Self> {
        Self::new(config.factor, config.mode)
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    pub fn mode(&self) -> BlockMode {
        self.mode
    }

    /// Average consecutive blocks of `factor` samples
    ///
    /// The output time of each block is the time of its first sample.
    pub fn apply(&self, samples: &[f64], time: &[f64]) -> PhotometryResult<Downsampled> {
        if samples.len() != time.len() {
            return Err(PhotometryError::invalid_parameter(
                PipelineStage::Downsampling,
                "time",
                format!("time axis has {} entries, trace has {}", time.len(), samples.len()),
            ));
        }
        if self.factor == 1 {
            return Ok(Downsampled {
                samples: samples.to_vec(),
                time: time.to_vec(),
            });
        }

        let span = match self.mode {
            BlockMode::Legacy => self.factor - 1,
            BlockMode::Exact => self.factor,
        };
        let n = samples.len();

        let averaged = (0..n)
            .step_by(self.factor)
            .map(|start| mean(&samples[start..(start + span).min(n)]))
            .collect();
        let time = time.iter().step_by(self.factor).copied().collect();

        Ok(Downsampled {
            samples: averaged,
            time,
        })
    }
}
