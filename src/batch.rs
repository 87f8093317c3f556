// src/batch.rs
//! Processing of several independent recordings

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::info;

use crate::acquisition::Recording;
use crate::error::PhotometryResult;
use crate::processing::{PhotometryPipeline, ProcessedSignal};

/// Run `pipeline` over every recording, one result per recording in input order
///
/// A failing recording does not stop the others.
pub fn process_batch(
    pipeline: &PhotometryPipeline,
    recordings: &[Recording],
) -> Vec<PhotometryResult<ProcessedSignal>> {
    #[cfg(feature = "parallel")]
    let results: Vec<_> = recordings.par_iter().map(|r| pipeline.process(r)).collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = recordings.iter().map(|r| pipeline.process(r)).collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(recordings = recordings.len(), failed, "batch processed");

    results
}
