use approx::assert_abs_diff_eq;
use fiducial_telemetry_calibrator::{
    CalibrationParams, CalibrationPhase, Telemetry, TelemetryCalibrator,
};
use fiducial_telemetry_core::RawPose;
use nalgebra::{Rotation3, Vector3};

fn base() -> (Rotation3<f64>, Vector3<f64>) {
    // camera looking down at the floor, slightly tilted and yawed
    let r = Rotation3::from_scaled_axis(Vector3::new(0.15, -0.1, 0.8));
    (r, Vector3::new(35.0, -20.0, 950.0))
}

/// Raw pose of a robot that moved by `(dx, dy)` and turned by `theta` from
/// the base pose.
fn moved(dx: f64, dy: f64, theta: f64) -> RawPose {
    let (rb, tb) = base();
    let r = rb * Rotation3::from_axis_angle(&Vector3::z_axis(), theta);
    RawPose::new(r.scaled_axis(), tb + rb * Vector3::new(dx, dy, 0.0))
}

fn calibrated() -> TelemetryCalibrator {
    let mut cal = TelemetryCalibrator::new(CalibrationParams::default());
    for k in 0..10 {
        assert!(cal.update(&moved(0.0, 0.0, 0.0), k as f64).is_none());
    }
    assert!(cal.is_calibrated());
    cal
}

#[test]
fn identical_samples_calibrate_after_exactly_one_window() {
    let params = CalibrationParams {
        window: 6,
        ..CalibrationParams::default()
    };
    let mut cal = TelemetryCalibrator::new(params);
    let pose = moved(0.0, 0.0, 0.0);
    for k in 0..6 {
        assert_eq!(cal.phase(), CalibrationPhase::Calibrating);
        assert_eq!(cal.samples_collected(), k);
        assert!(cal.update(&pose, k as f64).is_none());
    }
    assert_eq!(cal.phase(), CalibrationPhase::Calibrated);
    assert_eq!(cal.samples_collected(), 0);

    let t = cal.update(&pose, 6.0).expect("telemetry");
    assert_abs_diff_eq!(t.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(t.y, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(t.heading, 0.0, epsilon = 1e-9);
    assert_eq!(t.timestamp, 6.0);

    let b = cal.base_pose().expect("base");
    assert_abs_diff_eq!(b.translation, base().1, epsilon = 1e-9);
}

#[test]
fn moving_marker_never_calibrates() {
    let mut cal = TelemetryCalibrator::new(CalibrationParams::default());
    for k in 0..50 {
        // spread over any full window is exactly 3.0, not below it
        let dx = if k % 2 == 0 { 0.0 } else { 3.0 };
        let pose = RawPose::new(Vector3::zeros(), Vector3::new(dx, 0.0, 900.0));
        assert!(cal.update(&pose, k as f64).is_none());
    }
    assert!(!cal.is_calibrated());
    assert_eq!(cal.samples_collected(), 10);
}

#[test]
fn jitter_below_thresholds_is_averaged() {
    let mut cal = TelemetryCalibrator::new(CalibrationParams::default());
    let (rb, tb) = base();
    for k in 0..10 {
        let s = if k % 2 == 0 { 1.0 } else { -1.0 };
        let pose = RawPose::new(
            rb.scaled_axis() + Vector3::new(0.0, 0.0, s * 0.005),
            tb + Vector3::new(s, -s, 0.5 * s),
        );
        cal.update(&pose, k as f64);
    }
    assert!(cal.is_calibrated());
    let b = cal.base_pose().expect("base");
    assert_abs_diff_eq!(b.translation, tb, epsilon = 1e-9);
    assert_abs_diff_eq!(b.rotation, rb.scaled_axis(), epsilon = 1e-9);
}

#[test]
fn planar_motion_is_reported_in_robot_frame() {
    let mut cal = calibrated();
    let t = cal.update(&moved(120.0, -45.0, 0.4), 11.0).expect("telemetry");
    assert_abs_diff_eq!(t.x, 120.0, epsilon = 1e-6);
    assert_abs_diff_eq!(t.y, -45.0, epsilon = 1e-6);
    assert_abs_diff_eq!(t.heading, 0.4, epsilon = 1e-9);
}

#[test]
fn heading_stays_continuous_over_several_turns() {
    let mut cal = calibrated();
    let mut prev: Option<Telemetry> = None;
    for k in 0..=50 {
        let theta = 0.25 * k as f64;
        let t = cal.update(&moved(0.0, 0.0, theta), k as f64).expect("telemetry");
        assert_abs_diff_eq!(t.heading, theta, epsilon = 1e-8);
        if let Some(p) = prev {
            assert!((t.heading - p.heading).abs() < 0.3);
        }
        prev = Some(t);
    }

    // and back down below zero
    for k in (-20..50).rev() {
        let theta = 0.25 * k as f64;
        let t = cal.update(&moved(0.0, 0.0, theta), 0.0).expect("telemetry");
        assert_abs_diff_eq!(t.heading, theta, epsilon = 1e-8);
    }
}

#[test]
fn reset_starts_a_new_session() {
    let mut cal = calibrated();
    cal.reset();
    assert_eq!(cal.phase(), CalibrationPhase::Calibrating);
    assert!(cal.base_pose().is_none());
    assert!(cal.update(&moved(0.0, 0.0, 0.0), 0.0).is_none());
    assert_eq!(cal.samples_collected(), 1);
}
