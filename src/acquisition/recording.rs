// src/acquisition/recording.rs
//! In-memory recording handed over by the acquisition reader

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ChannelConfig;
use crate::error::{PhotometryError, PhotometryResult, PipelineStage};
use crate::utils::time::{duration_seconds, time_axis, validate_sampling_frequency};
use crate::utils::validation::ensure_non_empty;

/// Role a stream plays in motion correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelId {
    /// Indicator channel tracking the biological signal
    Dynamic,
    /// Reference channel tracking motion and bleaching only
    Isosbestic,
}

impl ChannelId {
    /// Stream name configured for this role
    pub fn stream_name<'a>(&self, channels: &'a ChannelConfig) -> &'a str {
        match self {
            ChannelId::Dynamic => &channels.dynamic,
            ChannelId::Isosbestic => &channels.isosbestic,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Dynamic => f.write_str("dynamic"),
            ChannelId::Isosbestic => f.write_str("isosbestic"),
        }
    }
}

/// One uniformly sampled stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    samples: Vec<f64>,
    sampling_frequency: f64,
}

impl Stream {
    /// Create a stream, rejecting empty data and invalid sampling frequencies
    pub fn new(samples: Vec<f64>, sampling_frequency: f64) -> PhotometryResult<Self> {
        ensure_non_empty(&samples, PipelineStage::Acquisition, "stream")?;
        validate_sampling_frequency(sampling_frequency)?;
        Ok(Self {
            samples,
            sampling_frequency,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        duration_seconds(self.samples.len(), self.sampling_frequency)
    }

    /// Time axis of this stream
    pub fn time_axis(&self) -> Vec<f64> {
        time_axis(self.samples.len(), self.sampling_frequency)
    }
}

/// Mapping from stream name to stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    streams: HashMap<String, Stream>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with_stream(mut self, name: impl Into<String>, stream: Stream) -> Self {
        self.streams.insert(name.into(), stream);
        self
    }

    /// Insert or replace a stream, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, stream: Stream) -> Option<Stream> {
        self.streams.insert(name.into(), stream)
    }

    pub fn stream(&self, name: &str) -> Option<&Stream> {
        self.streams.get(name)
    }

    pub fn stream_names(&self) -> impl Iterator<Item = &str> {
        self.streams.keys().map(String::as_str)
    }

    /// Look up the stream playing `role`
    pub fn channel(&self, role: ChannelId, channels: &ChannelConfig) -> PhotometryResult<&Stream> {
        let name = role.stream_name(channels);
        self.streams
            .get(name)
            .ok_or_else(|| PhotometryError::MissingChannel {
                name: name.to_string(),
                role: role.to_string(),
            })
    }

    /// Borrow the dynamic/isosbestic pair, checking they share a sampling frequency
    pub fn channel_pair(&self, channels: &ChannelConfig) -> PhotometryResult<ChannelPair<'_>> {
        let dynamic = self.channel(ChannelId::Dynamic, channels)?;
        let isosbestic = self.channel(ChannelId::Isosbestic, channels)?;
        ChannelPair::new(
            dynamic.samples(),
            isosbestic.samples(),
            dynamic.sampling_frequency(),
            isosbestic.sampling_frequency(),
        )
    }
}

/// Borrowed dynamic and isosbestic traces sharing one sampling frequency
#[derive(Debug, Clone, Copy)]
pub struct ChannelPair<'a> {
    /// Calcium-dependent channel
    pub dynamic: &'a [f64],
    /// Calcium-independent reference channel
    pub isosbestic: &'a [f64],
    /// Hz, shared by both traces
    pub sampling_frequency: f64,
}

impl<'a> ChannelPair<'a> {
    pub fn new(
        dynamic: &'a [f64],
        isosbestic: &'a [f64],
        dynamic_hz: f64,
        isosbestic_hz: f64,
    ) -> PhotometryResult<Self> {
        validate_sampling_frequency(dynamic_hz)?;
        validate_sampling_frequency(isosbestic_hz)?;
        if dynamic_hz != isosbestic_hz {
            return Err(PhotometryError::SamplingRateMismatch {
                dynamic_hz,
                isosbestic_hz,
            });
        }
        ensure_non_empty(dynamic, PipelineStage::Acquisition, "dynamic channel")?;
        ensure_non_empty(isosbestic, PipelineStage::Acquisition, "isosbestic channel")?;

        Ok(Self {
            dynamic,
            isosbestic,
            sampling_frequency: dynamic_hz,
        })
    }

    /// Pair two traces sampled at the same rate
    pub fn from_slices(dynamic: &'a [f64], isosbestic: &'a [f64], sampling_frequency: f64) -> PhotometryResult<Self> {
        Self::new(dynamic, isosbestic, sampling_frequency, sampling_frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> Recording {
        Recording::new()
            .with_stream("_465A", Stream::new(vec![1.0, 2.0, 3.0], 100.0).unwrap())
            .with_stream("_405A", Stream::new(vec![0.5, 0.6, 0.7], 100.0).unwrap())
    }

    #[test]
    fn test_stream_validation() {
        assert!(Stream::new(Vec::new(), 100.0).is_err());
        assert!(Stream::new(vec![1.0], 0.0).is_err());

        let stream = Stream::new(vec![1.0; 250], 100.0).unwrap();
        assert_eq!(stream.duration_seconds(), 2.5);
        assert_eq!(stream.time_axis().len(), 250);
    }

    #[test]
    fn test_channel_pair_default_names() {
        let recording = recording();
        let pair = recording.channel_pair(&ChannelConfig::default()).unwrap();
        assert_eq!(pair.dynamic, &[1.0, 2.0, 3.0]);
        assert_eq!(pair.isosbestic, &[0.5, 0.6, 0.7]);
        assert_eq!(pair.sampling_frequency, 100.0);
    }

    #[test]
    fn test_channel_names_are_configurable() {
        let recording = Recording::new()
            .with_stream("_465N", Stream::new(vec![1.0], 50.0).unwrap())
            .with_stream("_405N", Stream::new(vec![2.0], 50.0).unwrap());

        assert!(recording.channel_pair(&ChannelConfig::default()).is_err());

        let channels = ChannelConfig {
            dynamic: "_465N".to_string(),
            isosbestic: "_405N".to_string(),
        };
        assert!(recording.channel_pair(&channels).is_ok());
    }

    #[test]
    fn test_missing_channel() {
        let recording = Recording::new().with_stream("_465A", Stream::new(vec![1.0], 100.0).unwrap());

        match recording.channel_pair(&ChannelConfig::default()) {
            Err(PhotometryError::MissingChannel { name, role }) => {
                assert_eq!(name, "_405A");
                assert_eq!(role, "isosbestic");
            }
            other => panic!("Expected missing channel, got {:?}", other),
        }
    }

    #[test]
    fn test_sampling_rate_mismatch() {
        let recording = Recording::new()
            .with_stream("_465A", Stream::new(vec![1.0], 1017.25).unwrap())
            .with_stream("_405A", Stream::new(vec![1.0], 1000.0).unwrap());

        let err = recording.channel_pair(&ChannelConfig::default()).unwrap_err();
        assert!(matches!(err, PhotometryError::SamplingRateMismatch { .. }));
    }

    #[test]
    fn test_channel_id_lookup() {
        let channels = ChannelConfig::default();
        assert_eq!(ChannelId::Dynamic.stream_name(&channels), "_465A");
        assert_eq!(ChannelId::Isosbestic.stream_name(&channels), "_405A");
        assert_eq!(recording().stream_names().count(), 2);
    }
}
