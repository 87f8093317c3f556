// src/config/constants.rs
//! Pipeline-wide configuration constants

/// Channel naming defaults
pub mod channels {
    /// Dynamic indicator stream (465 nm excitation)
    pub const DEFAULT_DYNAMIC_CHANNEL: &str = "_465A";
    /// Isosbestic reference stream (405 nm excitation)
    pub const DEFAULT_ISOSBESTIC_CHANNEL: &str = "_405A";
}

/// Artifact trimming
pub mod trim {
    /// LED onset artifact window in seconds
    pub const DEFAULT_CUTOFF_S: f64 = 8.0;
}

/// Filter design limits and defaults
pub mod filter {
    pub const DEFAULT_MEDIAN_WIDTH: usize = 5;
    pub const DEFAULT_DENOISE_ORDER: usize = 2;
    pub const DEFAULT_DENOISE_CUTOFF_HZ: f64 = 10.0;
    pub const DEFAULT_BASELINE_ORDER: usize = 2;
    pub const DEFAULT_BASELINE_CUTOFF_HZ: f64 = 0.001;
    pub const MIN_BUTTERWORTH_ORDER: usize = 1;
    pub const MAX_BUTTERWORTH_ORDER: usize = 8;
    /// Edge padding is this many times the coefficient count
    pub const PAD_LENGTH_MULTIPLIER: usize = 3;
}

/// Polynomial debleaching
pub mod debleach {
    pub const DEFAULT_POLYNOMIAL_ORDER: usize = 4;
    pub const MAX_POLYNOMIAL_ORDER: usize = 8;
    /// Relative pivot size below which the least-squares system is singular
    pub const RANK_TOLERANCE: f64 = 1e-12;
}

/// Normalization
pub mod normalization {
    /// Scale applied by the single-step regression method
    pub const PERCENT_SCALE: f64 = 100.0;
    /// Minimum samples in a z-score baseline window
    pub const MIN_BASELINE_SAMPLES: usize = 2;
}

/// Block averaging
pub mod downsample {
    pub const DEFAULT_FACTOR: usize = 10;
}

/// Configuration file discovery and environment overrides
pub mod paths {
    pub const DEFAULT_CONFIG_FILE: &str = "photometry.toml";
    pub const LOCAL_CONFIG_FILE: &str = "config/photometry.toml";
    pub const ENV_PREFIX: &str = "PHOTOMETRY_";
    /// Separates nested table names in environment keys
    pub const ENV_SECTION_SEPARATOR: &str = "__";
}
