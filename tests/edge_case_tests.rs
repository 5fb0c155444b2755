//! Edge case tests for filters, the stabilizer, and pose estimation

use head_tilt_control::{
    classifier::RawCommand::{self, Down, Neutral, Up},
    config::PoseConfig,
    filters::create_filter,
    landmarks::LandmarkFrame,
    pose_estimation::PoseEstimator,
    stabilizer::CommandStabilizer,
    Error,
};
use nalgebra::Point2;

#[test]
fn test_filter_extreme_values() {
    let filters = vec!["none", "moving_average:5", "median:5", "exponential:0.8"];

    for filter_str in filters {
        let mut filter = create_filter(filter_str).unwrap();

        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN, f64::MAX, f64::MIN, 1e100, 0.0] {
            // Only checking that nothing panics
            let _ = filter.apply(value);
        }
    }
}

#[test]
fn test_filter_reset_behavior() {
    for filter_str in ["moving_average:3", "exponential:0.5"] {
        let mut filter = create_filter(filter_str).unwrap();

        filter.apply(10.0);
        filter.apply(15.0);
        filter.apply(20.0);
        let before_reset = filter.apply(25.0);

        filter.reset();
        let after_reset = filter.apply(25.0);

        assert!(
            (before_reset - after_reset).abs() > 1e-10,
            "Filter {} did not change output after reset",
            filter.name()
        );
        assert_eq!(after_reset, 25.0);
    }
}

#[test]
fn test_filter_convergence() {
    for filter_str in ["moving_average:10", "median:5", "exponential:0.3"] {
        let mut filter = create_filter(filter_str).unwrap();
        let target = 42.0;

        let mut last_output = 0.0;
        for _ in 0..100 {
            last_output = filter.apply(target);
        }

        assert!(
            (last_output - target).abs() < 1e-6,
            "Filter {} did not converge to target",
            filter.name()
        );
    }
}

#[test]
fn test_filter_impulse_response() {
    for filter_str in ["moving_average:5", "median:5", "exponential:0.8"] {
        let mut filter = create_filter(filter_str).unwrap();

        for _ in 0..10 {
            filter.apply(10.0);
        }
        let impulse_response = filter.apply(1000.0);
        let recovery_response = filter.apply(10.0);

        match filter.name() {
            "MedianFilter" => {
                assert_eq!(impulse_response, 10.0, "{} did not reject impulse", filter.name());
            }
            _ => {
                assert!(impulse_response > 50.0, "{} was not affected by impulse", filter.name());
            }
        }
        assert!(recovery_response <= impulse_response);
    }
}

#[test]
fn test_stabilizer_window_of_one() {
    // A single entry carries the recency weight alone
    let mut stabilizer = CommandStabilizer::new(1, 2, 2);
    assert_eq!(stabilizer.push(Up), Up);
    assert_eq!(stabilizer.push(Neutral), Neutral);
    assert_eq!(stabilizer.push(Down), Down);
    assert_eq!(stabilizer.len(), 1);

    // Without the recency bonus one frame is never enough
    let mut unweighted = CommandStabilizer::new(1, 1, 2);
    assert_eq!(unweighted.push(Up), Neutral);
}

#[test]
fn test_stabilizer_unreachable_min_votes() {
    let mut stabilizer = CommandStabilizer::new(3, 2, 100);
    for _ in 0..10 {
        assert_eq!(stabilizer.push(Up), Neutral);
    }
}

#[test]
fn test_stabilizer_isolated_spikes() {
    let mut stabilizer = CommandStabilizer::default();
    // A spike every third frame never gathers enough votes
    let pattern: Vec<RawCommand> = (0..30)
        .map(|i| match i % 6 {
            2 => Up,
            5 => Down,
            _ => Neutral,
        })
        .collect();

    for command in pattern {
        assert_eq!(stabilizer.push(command), Neutral);
    }
}

#[test]
fn test_pose_estimator_extreme_geometry() {
    let estimator = PoseEstimator::new(&PoseConfig::default());
    let frame = |nose_y: f64, chin_y: f64| LandmarkFrame {
        nose_tip: Point2::new(0.5, nose_y),
        chin: Point2::new(0.5, chin_y),
        left_eye: Point2::new(0.4, 0.4),
        right_eye: Point2::new(0.6, 0.4),
        forehead: Point2::new(0.5, 0.2),
        detector_confidence: None,
    };

    // Just above the minimum face height still works
    assert!(estimator.estimate(&frame(0.4, 0.2 + 0.011)).is_ok());
    // Just below does not
    assert!(matches!(
        estimator.estimate(&frame(0.4, 0.2 + 0.009)),
        Err(Error::DegenerateGeometry { .. })
    ));
    // Chin above the forehead (upside-down face) is still a finite pitch
    let flipped = estimator.estimate(&frame(0.4, 0.0)).unwrap();
    assert!(flipped.pitch.is_finite());
}
