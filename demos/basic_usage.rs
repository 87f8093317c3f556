// demos/basic_usage.rs
//! Process a synthetic two-channel recording with both strategies

use photometry_core::config::ZScoreWindow;
use photometry_core::utils::stats::{mean, pearson};
use photometry_core::{
    version_info, NormalizationStrategy, PhotometryConfig, PhotometryPipeline, Recording, Stream,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let info = version_info();
    println!("{} v{}", info.name, info.version);
    println!("=============================\n");

    let fs = 1017.25;
    let n = (90.0 * fs) as usize;
    let two_pi = 2.0 * std::f64::consts::PI;

    let mut dynamic = Vec::with_capacity(n);
    let mut isosbestic = Vec::with_capacity(n);
    let mut activity = Vec::with_capacity(n);
    for i in 0..n {
        let t = (i + 1) as f64 / fs;
        let bleach = 4.0 * (-t / 60.0).exp() + 6.0;
        let motion = 0.3 * (two_pi * 0.25 * t).sin();
        let calcium = 0.5 * (two_pi * 0.8 * t).sin().max(0.0);

        isosbestic.push(bleach + motion);
        dynamic.push(1.2 * bleach + 0.7 * motion + calcium);
        activity.push(calcium);
    }

    let recording = Recording::new()
        .with_stream("_465A", Stream::new(dynamic, fs)?)
        .with_stream("_405A", Stream::new(isosbestic, fs)?);

    // Default chain: denoise, debleach, motion-correct, divide by baseline
    let pipeline = PhotometryPipeline::new(PhotometryConfig::default())?;
    let signal = pipeline.process(&recording)?;
    let start = n - signal.len();
    println!("Default strategy");
    println!("  samples kept:          {}", signal.len());
    println!("  first sample at:       {:.3} s", signal.time[0]);
    println!("  correlation w/ signal: {:.3}", pearson(&signal.values, &activity[start..]));

    // Z-score against the first 20 s after the analysis start
    let window = ZScoreWindow {
        start_s: 10.0,
        baseline_end_s: 30.0,
    };
    let z = signal.z_score_report(window)?;
    println!("  z-score baseline:      mean {:.4}, std {:.4}, {} samples", z.mean, z.std, z.baseline_end_index);

    // Single-step alternate method in percent
    let mut config = PhotometryConfig::default();
    config.normalization.strategy = NormalizationStrategy::Alternate;
    config.downsample.apply_to_output = true;
    let alternate = PhotometryPipeline::new(config)?.process(&recording)?;
    println!("\nAlternate strategy (downsampled x10)");
    println!("  samples:               {}", alternate.len());
    println!("  mean dF/F:             {:.3} %", mean(&alternate.values));

    Ok(())
}
