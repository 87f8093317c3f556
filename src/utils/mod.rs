//! Common utilities for the photometry pipeline
//!
//! - Time axes derived from sample counts
//! - Descriptive statistics and line fitting
//! - Input validation raising stage-tagged errors

pub mod stats;
pub mod time;
pub mod validation;

pub use stats::{mean, pearson, std_dev, LinearFit};
pub use time::{duration_seconds, first_index_after, time_axis, validate_sampling_frequency};
pub use validation::{ensure_aligned, ensure_min_len, ensure_non_empty, ensure_odd_window, ensure_positive};
