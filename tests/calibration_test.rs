//! Calibration and classification properties

use head_tilt_control::{
    calibration::{CalibrationOutcome, Calibrator, FallbackReason, Thresholds},
    classifier::{classify, RawCommand},
    config::CalibrationConfig,
    pose_estimation::PoseSample,
};
use std::time::Instant;

fn calibrate(pitches: &[f64]) -> (Thresholds, Option<CalibrationOutcome>) {
    let mut calibrator = Calibrator::new(&CalibrationConfig::default());
    calibrator.start_calibration(Instant::now());
    for &pitch in pitches {
        calibrator.add_sample(PoseSample::from_pitch(pitch, 0.95));
    }
    let thresholds = calibrator.finish_calibration();
    (thresholds, calibrator.state().outcome())
}

#[test]
fn test_thresholds_are_mean_plus_minus_margin() {
    let cases: Vec<Vec<f64>> = vec![
        vec![4.0; 11],
        vec![-12.5; 30],
        (0..60).map(|i| if i % 2 == 0 { 17.0 } else { 19.0 }).collect(),
        (0..16).map(f64::from).collect(),
    ];

    for pitches in cases {
        let mean = pitches.iter().sum::<f64>() / pitches.len() as f64;
        let (thresholds, outcome) = calibrate(&pitches);

        assert_eq!(thresholds.neutral_pitch, mean);
        assert_eq!(thresholds.up_threshold, mean - 5.0);
        assert_eq!(thresholds.down_threshold, mean + 5.0);
        assert!(thresholds.up_threshold < thresholds.neutral_pitch);
        assert!(thresholds.neutral_pitch < thresholds.down_threshold);
        assert_eq!(
            outcome,
            Some(CalibrationOutcome::Personalized {
                samples: pitches.len()
            })
        );
    }
}

#[test]
fn test_too_few_samples_use_default_thresholds() {
    for count in 0..=10 {
        let (thresholds, outcome) = calibrate(&vec![25.0; count]);

        assert_eq!(thresholds.up_threshold, -5.0);
        assert_eq!(thresholds.neutral_pitch, 0.0);
        assert_eq!(thresholds.down_threshold, 5.0);
        assert_eq!(
            outcome,
            Some(CalibrationOutcome::Default {
                collected: count,
                reason: FallbackReason::InsufficientSamples
            })
        );
    }
}

#[test]
fn test_custom_margin() {
    let config = CalibrationConfig {
        margin: 2.5,
        ..CalibrationConfig::default()
    };
    let mut calibrator = Calibrator::new(&config);
    calibrator.start_calibration(Instant::now());
    for _ in 0..20 {
        calibrator.add_sample(PoseSample::from_pitch(1.0, 0.95));
    }
    assert_eq!(calibrator.finish_calibration(), Thresholds::around(1.0, 2.5));
}

#[test]
fn test_polarity_around_calibrated_thresholds() {
    let (thresholds, _) = calibrate(&[9.0; 20]);

    assert_eq!(classify(thresholds.up_threshold - 1.0, &thresholds), RawCommand::Down);
    assert_eq!(classify(thresholds.down_threshold + 1.0, &thresholds), RawCommand::Up);
    assert_eq!(classify(thresholds.up_threshold, &thresholds), RawCommand::Neutral);
    assert_eq!(classify(thresholds.down_threshold, &thresholds), RawCommand::Neutral);
    assert_eq!(classify(thresholds.neutral_pitch, &thresholds), RawCommand::Neutral);
}
