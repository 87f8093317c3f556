// src/processing/mod.rs
//! Signal processing pipeline for photometry traces

pub mod downsample;
pub mod filters;
pub mod motion;
pub mod normalize;
pub mod pipeline;
pub mod polynomial;
pub mod preprocess;
pub mod strategy;
pub mod trim;

pub use downsample::{BlockMode, Downsampled, Downsampler};
pub use motion::{correct_motion, MotionCorrection};
pub use normalize::{z_score, z_score_with_rate, BaselineNormalizer, DeltaF, ZScore};
pub use pipeline::{PhotometryPipeline, ProcessedSignal, SignalKind, StageOutputs};
pub use polynomial::PolynomialFit;
pub use preprocess::{debleach, Preprocessed, Preprocessor};
pub use strategy::{alternate_delta_f, AlternateBaseline, AlternateDeltaF, DeltaFUnits, NormalizationStrategy};
pub use trim::{ArtifactTrimmer, TrimPolicy, TrimmedChannels};
