//! Photometry-Core: fiber-photometry signal processing library
//!
//! Turns a pair of raw fluorescence traces (a calcium-dependent "dynamic"
//! channel and a calcium-independent "isosbestic" reference) into a
//! normalized activity trace. It provides:
//!
//! - Onset artifact trimming on a shared time axis
//! - Median and zero-phase Butterworth denoising
//! - Polynomial photobleaching removal
//! - Isosbestic regression for motion correction
//! - dF/F and z-score normalization, plus the single-step alternate method
//! - Block-average downsampling
//! - Layered TOML / environment configuration
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use photometry_core::{PhotometryConfig, PhotometryPipeline, Recording, Stream};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fs = 1017.25;
//!     let dynamic = vec![1.0; 30_000];
//!     let isosbestic = vec![0.5; 30_000];
//!
//!     let recording = Recording::new()
//!         .with_stream("_465A", Stream::new(dynamic, fs)?)
//!         .with_stream("_405A", Stream::new(isosbestic, fs)?);
//!
//!     let pipeline = PhotometryPipeline::new(PhotometryConfig::default())?;
//!     let signal = pipeline.process(&recording)?;
//!     println!("{} samples of dF/F", signal.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod acquisition;
pub mod batch;
pub mod config;
pub mod error;
pub mod processing;
pub mod utils;

// Re-export commonly used types for convenience
pub use acquisition::{ChannelId, ChannelPair, Recording, Stream};
pub use batch::process_batch;
pub use config::{ConfigLoader, PhotometryConfig, ZScoreWindow};
pub use error::{PhotometryError, PhotometryResult, PipelineStage};
pub use processing::{
    BlockMode, DeltaFUnits, NormalizationStrategy, PhotometryPipeline, ProcessedSignal, SignalKind,
    TrimPolicy,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Fiber-photometry signal processing library".to_string(),
        features: vec![
            "Artifact trimming".to_string(),
            "Zero-phase denoising".to_string(),
            "Polynomial debleaching".to_string(),
            "Isosbestic motion correction".to_string(),
            "dF/F and z-score normalization".to_string(),
            "Block-average downsampling".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "photometry-core");
    }
}
