// src/processing/pipeline.rs
//! End-to-end photometry pipeline: trim, preprocess, correct, normalize

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::acquisition::{ChannelPair, Recording};
use crate::config::constants::normalization::PERCENT_SCALE;
use crate::config::{PhotometryConfig, ZScoreWindow};
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};
use crate::processing::downsample::Downsampler;
use crate::processing::motion::{correct_motion, MotionCorrection};
use crate::processing::normalize::{z_score, BaselineNormalizer, DeltaF, ZScore};
use crate::processing::preprocess::{Preprocessed, Preprocessor};
use crate::processing::strategy::{alternate_delta_f, DeltaFUnits, NormalizationStrategy};
use crate::processing::trim::{ArtifactTrimmer, TrimmedChannels};

/// What the values of a processed signal measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    DeltaF(DeltaFUnits),
    ZScore,
}

/// Normalized trace with its time axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSignal {
    /// dF/F or z-score samples
    pub values: Vec<f64>,
    /// Seconds since acquisition start, one per value
    pub time: Vec<f64>,
    /// Strategy that produced the trace; sets the dF/F units
    pub strategy: NormalizationStrategy,
    pub kind: SignalKind,
    /// Baseline window used for z-scoring, in indices of `values`
    pub baseline_window: Option<Range<usize>>,
}

impl ProcessedSignal {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Units of a dF/F signal, `None` once z-scored
    pub fn units(&self) -> Option<DeltaFUnits> {
        match self.kind {
            SignalKind::DeltaF(units) => Some(units),
            SignalKind::ZScore => None,
        }
    }

    /// Z-score report for this dF/F signal over `window`
    pub fn z_score_report(&self, window: ZScoreWindow) -> PhotometryResult<ZScore> {
        if self.kind == SignalKind::ZScore {
            return Err(PhotometryError::invalid_parameter(
                PipelineStage::Normalization,
                "kind",
                "signal is already z-scored",
            ));
        }
        z_score(&self.values, &self.time, window.start_s, window.baseline_end_s)
    }

    /// Z-scored copy, truncated to the analysis start
    pub fn z_scored(&self, window: ZScoreWindow) -> PhotometryResult<Self> {
        let report = self.z_score_report(window)?;
        Ok(Self {
            values: report.values,
            time: report.time,
            strategy: self.strategy,
            kind: SignalKind::ZScore,
            baseline_window: Some(0..report.baseline_end_index),
        })
    }

    /// Block-averaged copy; the baseline window no longer applies
    pub fn downsample(&self, downsampler: &Downsampler) -> PhotometryResult<Self> {
        let out = downsampler.apply(&self.values, &self.time)?;
        Ok(Self {
            values: out.samples,
            time: out.time,
            strategy: self.strategy,
            kind: self.kind,
            baseline_window: None,
        })
    }

    /// Percent dF/F copy
    pub fn to_percent(&self) -> PhotometryResult<Self> {
        match self.kind {
            SignalKind::DeltaF(DeltaFUnits::Percent) => Ok(self.clone()),
            SignalKind::DeltaF(DeltaFUnits::Fraction) => Ok(Self {
                values: self.values.iter().map(|v| v * PERCENT_SCALE).collect(),
                kind: SignalKind::DeltaF(DeltaFUnits::Percent),
                ..self.clone()
            }),
            SignalKind::ZScore => Err(PhotometryError::invalid_parameter(
                PipelineStage::Normalization,
                "kind",
                "a z-score has no percent representation",
            )),
        }
    }
}

/// Intermediate buffers of the default chain
#[derive(Debug, Clone)]
pub struct StageOutputs {
    pub trimmed: TrimmedChannels,
    pub dynamic: Preprocessed,
    pub isosbestic: Preprocessed,
    pub motion: MotionCorrection,
    pub delta_f: DeltaF,
}

/// Configured photometry pipeline
#[derive(Debug, Clone)]
pub struct PhotometryPipeline {
    config: PhotometryConfig,
    trimmer: ArtifactTrimmer,
    preprocessor: Preprocessor,
    normalizer: BaselineNormalizer,
    downsampler: Downsampler,
}

impl PhotometryPipeline {
    /// Validate the configuration and build every stage
    pub fn new(config: PhotometryConfig) -> PhotometryResult<Self> {
        config.validate()?;

        Ok(Self {
            trimmer: ArtifactTrimmer::new(config.trim.policy()),
            preprocessor: Preprocessor::from_config(&config)?,
            normalizer: BaselineNormalizer::new(&config.baseline),
            downsampler: Downsampler::from_config(&config.downsample)?,
            config,
        })
    }

    pub fn config(&self) -> &PhotometryConfig {
        &self.config
    }

    pub fn strategy(&self) -> NormalizationStrategy {
        self.config.normalization.strategy
    }

    /// Process the configured channel pair of a recording
    #[instrument(skip(self, recording), fields(strategy = %self.strategy()))]
    pub fn process(&self, recording: &Recording) -> PhotometryResult<ProcessedSignal> {
        let pair = recording.channel_pair(&self.config.channels)?;
        self.process_pair(pair)
    }

    /// Process an explicit dynamic/isosbestic pair
    #[instrument(skip(self, pair), fields(samples = pair.dynamic.len(), fs = pair.sampling_frequency))]
    pub fn process_pair(&self, pair: ChannelPair<'_>) -> PhotometryResult<ProcessedSignal> {
        let strategy = self.strategy();

        let (values, time) = match strategy {
            NormalizationStrategy::Default => {
                let stages = self.run_stages(pair)?;
                (stages.delta_f.values, stages.trimmed.time)
            }
            NormalizationStrategy::Alternate => {
                let trimmed = self.trimmer.trim(pair)?;
                let result = alternate_delta_f(&trimmed.dynamic, &trimmed.isosbestic)?;
                (result.values, trimmed.time)
            }
        };

        let mut signal = ProcessedSignal {
            values,
            time,
            strategy,
            kind: SignalKind::DeltaF(strategy.units()),
            baseline_window: None,
        };

        if let Some(window) = self.config.normalization.zscore {
            signal = signal.z_scored(window)?;
        }
        if self.config.downsample.apply_to_output {
            signal = signal.downsample(&self.downsampler)?;
        }

        info!(samples = signal.len(), kind = ?signal.kind, "photometry trace processed");
        Ok(signal)
    }

    /// Run the default chain and keep every intermediate buffer
    pub fn run_stages(&self, pair: ChannelPair<'_>) -> PhotometryResult<StageOutputs> {
        let trimmed = self.trimmer.trim(pair)?;
        let fs = trimmed.sampling_frequency;

        let dynamic = self.preprocessor.preprocess(&trimmed.dynamic, fs)?;
        let isosbestic = self.preprocessor.preprocess(&trimmed.isosbestic, fs)?;

        let motion = correct_motion(&dynamic.debleached, &isosbestic.debleached)?;
        let delta_f = self
            .normalizer
            .delta_f_over_f(&motion.corrected, &dynamic.denoised, fs)?;

        Ok(StageOutputs {
            trimmed,
            dynamic,
            isosbestic,
            motion,
            delta_f,
        })
    }
}
