// src/processing/trim.rs
//! Removal of the onset artifact from both channels

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acquisition::ChannelPair;
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};
use crate::utils::time::{first_index_after, time_axis};

/// Leading segment to discard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimPolicy {
    /// Drop every sample whose time is `<=` this many seconds
    Seconds(f64),
    /// Drop a fixed number of leading samples
    Samples(usize),
}

/// Both channels cut at the same index, with their shared time axis
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedChannels {
    pub dynamic: Vec<f64>,
    pub isosbestic: Vec<f64>,
    /// Original time of each kept sample, so it starts after the cutoff
    pub time: Vec<f64>,
    pub sampling_frequency: f64,
    /// Index of the first kept sample in the untrimmed trace
    pub start_index: usize,
}

impl TrimmedChannels {
    pub fn len(&self) -> usize {
        self.dynamic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dynamic.is_empty()
    }

    /// Borrow the trimmed traces as a channel pair
    pub fn as_pair(&self) -> PhotometryResult<ChannelPair<'_>> {
        ChannelPair::from_slices(&self.dynamic, &self.isosbestic, self.sampling_frequency)
    }
}

/// Cuts the same leading segment from both channels
#[derive(Debug, Clone, Copy)]
pub struct ArtifactTrimmer {
    policy: TrimPolicy,
}

impl ArtifactTrimmer {
    pub fn new(policy: TrimPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TrimPolicy {
        self.policy
    }

    /// Cut the onset from both channels
    ///
    /// The time axis is built from the dynamic channel and the cut index is
    /// applied to both traces, so they stay sample-aligned.
    pub fn trim(&self, pair: ChannelPair<'_>) -> PhotometryResult<TrimmedChannels> {
        let time = time_axis(pair.dynamic.len(), pair.sampling_frequency);

        let start_index = match self.policy {
            TrimPolicy::Seconds(cutoff_s) => first_index_after(&time, cutoff_s).ok_or_else(|| {
                PhotometryError::insufficient(
                    PipelineStage::Trimming,
                    format!(
                        "no samples after {} s (recording lasts {} s)",
                        cutoff_s,
                        time.last().copied().unwrap_or(0.0)
                    ),
                )
            })?,
            TrimPolicy::Samples(count) if count < pair.dynamic.len() => count,
            TrimPolicy::Samples(count) => {
                return Err(PhotometryError::insufficient(
                    PipelineStage::Trimming,
                    format!("skipping {} samples leaves none of {}", count, pair.dynamic.len()),
                ))
            }
        };

        if start_index >= pair.isosbestic.len() {
            return Err(PhotometryError::ChannelAlignment {
                stage: PipelineStage::Trimming,
                dynamic_len: pair.dynamic.len(),
                isosbestic_len: pair.isosbestic.len(),
            });
        }

        debug!(start_index, kept = pair.dynamic.len() - start_index, "onset trimmed");

        Ok(TrimmedChannels {
            dynamic: pair.dynamic[start_index..].to_vec(),
            isosbestic: pair.isosbestic[start_index..].to_vec(),
            time: time[start_index..].to_vec(),
            sampling_frequency: pair.sampling_frequency,
            start_index,
        })
    }
}
