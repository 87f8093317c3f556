// tests/pipeline_integration.rs
//! End-to-end behaviour of the photometry pipeline on synthetic recordings

use approx::assert_abs_diff_eq;
use photometry_core::config::ZScoreWindow;
use photometry_core::processing::{AlternateBaseline, SignalKind};
use photometry_core::utils::stats::{mean, pearson, std_dev, LinearFit};
use photometry_core::{
    process_batch, ChannelPair, DeltaFUnits, NormalizationStrategy, PhotometryConfig, PhotometryError,
    PhotometryPipeline, PipelineStage, Recording, Stream,
};

const FS: f64 = 100.0;
const SAMPLES: usize = 6000;

struct Synthetic {
    dynamic: Vec<f64>,
    isosbestic: Vec<f64>,
    biological: Vec<f64>,
    trend: Vec<f64>,
}

/// Isosbestic = slow sine + linear bleach; dynamic = half the isosbestic
/// + an independent biological signal + the same bleach
fn synthetic() -> Synthetic {
    let two_pi = 2.0 * std::f64::consts::PI;
    let mut s = Synthetic {
        dynamic: Vec::with_capacity(SAMPLES),
        isosbestic: Vec::with_capacity(SAMPLES),
        biological: Vec::with_capacity(SAMPLES),
        trend: Vec::with_capacity(SAMPLES),
    };

    for i in 0..SAMPLES {
        let t = (i + 1) as f64 / FS;
        let trend = 10.0 - 0.02 * t;
        let iso = (two_pi * 0.2 * t).sin() + trend;
        let bio = (two_pi * 0.9 * t).sin() + 0.5 * (two_pi * 1.7 * t + 0.3).sin();

        s.dynamic.push(0.5 * iso + bio + trend);
        s.isosbestic.push(iso);
        s.biological.push(bio);
        s.trend.push(trend);
    }
    s
}

fn recording(s: &Synthetic) -> Recording {
    Recording::new()
        .with_stream("_465A", Stream::new(s.dynamic.clone(), FS).unwrap())
        .with_stream("_405A", Stream::new(s.isosbestic.clone(), FS).unwrap())
}

/// Samples kept after the default 8 s trim
fn kept(values: &[f64]) -> &[f64] {
    &values[800..]
}

#[test]
fn test_recovers_biological_signal() {
    let s = synthetic();
    let pipeline = PhotometryPipeline::new(PhotometryConfig::default()).unwrap();
    let signal = pipeline.process(&recording(&s)).unwrap();

    assert_eq!(signal.len(), 5200);
    assert_eq!(signal.kind, SignalKind::DeltaF(DeltaFUnits::Fraction));

    let r_bio = pearson(&signal.values, kept(&s.biological));
    let r_trend = pearson(&signal.values, kept(&s.trend));
    assert!(r_bio > 0.95, "correlation with biological signal was {}", r_bio);
    assert!(r_trend.abs() < 0.1, "correlation with bleach trend was {}", r_trend);
}

#[test]
fn test_time_axis_matches_trimmed_samples() {
    let s = synthetic();
    let pipeline = PhotometryPipeline::new(PhotometryConfig::default()).unwrap();
    let signal = pipeline.process(&recording(&s)).unwrap();

    assert_eq!(signal.time.len(), signal.values.len());
    assert_abs_diff_eq!(signal.time[0], 8.01, epsilon = 1e-12);
    assert_abs_diff_eq!(signal.time[signal.len() - 1], 60.0, epsilon = 1e-12);
    assert!(signal.time.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_motion_corrected_is_uncorrelated_with_isosbestic() {
    let s = synthetic();
    let pair = ChannelPair::from_slices(&s.dynamic, &s.isosbestic, FS).unwrap();
    let pipeline = PhotometryPipeline::new(PhotometryConfig::default()).unwrap();
    let stages = pipeline.run_stages(pair).unwrap();

    assert!((stages.motion.fit.slope - 0.5).abs() < 0.05);

    let residual = LinearFit::fit(
        &stages.isosbestic.debleached,
        &stages.motion.corrected,
        PipelineStage::MotionCorrection,
    )
    .unwrap();
    assert_abs_diff_eq!(residual.slope, 0.0, epsilon = 1e-9);
}

#[test]
fn test_alternate_negative_slope_uses_mean() {
    let s = synthetic();
    let dynamic: Vec<f64> = s.isosbestic.iter().map(|x| 20.0 - 0.5 * x).collect();
    let pair = ChannelPair::from_slices(&dynamic, &s.isosbestic, FS).unwrap();

    let mut config = PhotometryConfig::default();
    config.normalization.strategy = NormalizationStrategy::Alternate;
    let signal = PhotometryPipeline::new(config).unwrap().process_pair(pair).unwrap();

    let y = kept(&dynamic);
    let m = mean(y);
    assert_eq!(signal.units(), Some(DeltaFUnits::Percent));
    for (v, yi) in signal.values.iter().zip(y) {
        assert_abs_diff_eq!(*v, 100.0 * (yi - m) / m, epsilon = 1e-9);
    }

    let direct = photometry_core::processing::alternate_delta_f(y, kept(&s.isosbestic)).unwrap();
    assert!(matches!(direct.baseline, AlternateBaseline::Mean { .. }));
}

#[test]
fn test_zscore_baseline_statistics() {
    let s = synthetic();
    let mut config = PhotometryConfig::default();
    config.normalization.zscore = Some(ZScoreWindow {
        start_s: 10.0,
        baseline_end_s: 30.0,
    });
    let signal = PhotometryPipeline::new(config).unwrap().process(&recording(&s)).unwrap();

    assert_eq!(signal.kind, SignalKind::ZScore);
    assert!(signal.time[0] > 10.0);
    let window = signal.baseline_window.clone().unwrap();
    assert_eq!(window, 0..2000);

    let baseline = &signal.values[window];
    assert_abs_diff_eq!(mean(baseline), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(std_dev(baseline), 1.0, epsilon = 1e-9);
}

#[test]
fn test_output_downsampling() {
    let s = synthetic();
    let mut config = PhotometryConfig::default();
    config.downsample.apply_to_output = true;
    let signal = PhotometryPipeline::new(config).unwrap().process(&recording(&s)).unwrap();

    assert_eq!(signal.len(), 520);
    assert_eq!(signal.time.len(), 520);
    assert_abs_diff_eq!(signal.time[1] - signal.time[0], 0.1, epsilon = 1e-12);
}

#[test]
fn test_sample_count_trim() {
    let s = synthetic();
    let mut config = PhotometryConfig::default();
    config.trim.skip_samples = Some(500);
    let signal = PhotometryPipeline::new(config).unwrap().process(&recording(&s)).unwrap();

    assert_eq!(signal.len(), 5500);
    assert_abs_diff_eq!(signal.time[0], 5.01, epsilon = 1e-12);
}

#[test]
fn test_custom_channel_names() {
    let s = synthetic();
    let recording = Recording::new()
        .with_stream("_465N", Stream::new(s.dynamic.clone(), FS).unwrap())
        .with_stream("_405N", Stream::new(s.isosbestic.clone(), FS).unwrap());

    let mut config = PhotometryConfig::default();
    config.channels.dynamic = "_465N".to_string();
    config.channels.isosbestic = "_405N".to_string();

    assert!(PhotometryPipeline::new(config).unwrap().process(&recording).is_ok());
}

#[test]
fn test_trim_beyond_duration() {
    let s = synthetic();
    let mut config = PhotometryConfig::default();
    config.trim.cutoff_s = 120.0;

    let err = PhotometryPipeline::new(config).unwrap().process(&recording(&s)).unwrap_err();
    assert!(matches!(err, PhotometryError::InsufficientData { .. }));
    assert_eq!(err.stage(), PipelineStage::Trimming);
}

#[test]
fn test_batch_matches_single_runs() {
    let s = synthetic();
    let pipeline = PhotometryPipeline::new(PhotometryConfig::default()).unwrap();
    let recordings = vec![recording(&s), recording(&s)];

    let single = pipeline.process(&recordings[0]).unwrap();
    for result in process_batch(&pipeline, &recordings) {
        assert_eq!(result.unwrap(), single);
    }
}
