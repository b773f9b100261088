mod common;

use approx::assert_abs_diff_eq;
use common::{config, dot_centers, marker_frame, render, DISTANCE, FOCAL};
use fiducial_telemetry::blobs::ColorRange;
use fiducial_telemetry::{FailureKind, Frame, Tracker};
use image::GrayImage;

fn tracker() -> Tracker {
    Tracker::from_config(&config()).expect("tracker")
}

#[test]
fn fronto_parallel_frame_tracks_every_dot() {
    let mut tracker = tracker();
    let frame = Frame::from(marker_frame());
    let out = tracker.process(&frame, 0.0).expect("tracked");

    assert_eq!(out.detections.len(), 16);
    let ordered = out
        .correspondence
        .apply(&out.detections)
        .expect("bijection");
    for (got, (x, y)) in ordered.iter().zip(dot_centers(0, 0)) {
        assert_abs_diff_eq!(got.x, x as f64, epsilon = 0.5);
        assert_abs_diff_eq!(got.y, y as f64, epsilon = 0.5);
    }

    assert!(out.pose.rotation.norm() < 0.02, "rotation {:?}", out.pose.rotation);
    assert_abs_diff_eq!(out.pose.translation.x, 0.0, epsilon = 2.0);
    assert_abs_diff_eq!(out.pose.translation.y, 0.0, epsilon = 2.0);
    assert_abs_diff_eq!(out.pose.translation.z, DISTANCE, epsilon = 6.0);
    assert!(out.telemetry.is_none());
    assert!(out.annotated.is_some());
}

#[test]
fn telemetry_starts_after_the_calibration_window() {
    let mut tracker = tracker();
    let window = tracker.calibrator().params().window;
    let still = Frame::from(marker_frame());

    for i in 0..window {
        let out = tracker.process(&still, i as f64 / 30.0).expect("tracked");
        assert!(out.telemetry.is_none(), "telemetry before calibration");
    }
    assert!(tracker.calibrator().is_calibrated());

    let out = tracker.process(&still, 1.0).expect("tracked");
    let t = out.telemetry.expect("calibrated telemetry");
    assert_abs_diff_eq!(t.x, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(t.y, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(t.heading, 0.0, epsilon = 1e-6);
    assert_eq!(t.timestamp, 1.0);

    let shifted = Frame::from(render(&dot_centers(20, 0)));
    let t = tracker
        .process(&shifted, 1.1)
        .expect("tracked")
        .telemetry
        .expect("telemetry");
    assert_abs_diff_eq!(t.x, 20.0 * DISTANCE / FOCAL, epsilon = 1.5);
    assert_abs_diff_eq!(t.y, 0.0, epsilon = 1.5);
    assert_abs_diff_eq!(t.heading, 0.0, epsilon = 0.02);
}

#[test]
fn dropped_frames_leave_the_calibration_window_alone() {
    let mut tracker = tracker();
    let still = Frame::from(marker_frame());
    tracker.process(&still, 0.0).expect("tracked");
    tracker.process(&still, 0.1).expect("tracked");
    assert_eq!(tracker.calibrator().samples_collected(), 2);

    let mut missing = dot_centers(0, 0);
    missing.pop();
    let err = tracker
        .process(&Frame::from(render(&missing)), 0.2)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::WrongPointCount);

    let gray = Frame::from(GrayImage::new(64, 48));
    let err = tracker.process(&gray, 0.3).unwrap_err();
    assert_eq!(err.kind(), FailureKind::ChannelMismatch);

    assert_eq!(tracker.calibrator().samples_collected(), 2);
}

#[test]
fn reset_restarts_calibration() {
    let mut cfg = config();
    cfg.calibration.window = 2;
    let mut tracker = Tracker::from_config(&cfg).expect("tracker");
    let still = Frame::from(marker_frame());
    for i in 0..3 {
        tracker.process(&still, i as f64).expect("tracked");
    }
    assert!(tracker.calibrator().is_calibrated());

    tracker.reset();
    assert!(!tracker.calibrator().is_calibrated());
    let out = tracker.process(&still, 3.0).expect("tracked");
    assert!(out.telemetry.is_none());
}

#[test]
fn gray_range_tracks_gray_frames() {
    let mut cfg = config();
    cfg.blobs.range = ColorRange::gray(40, 255);
    cfg.blobs.annotate = false;
    let mut tracker = Tracker::from_config(&cfg).expect("tracker");

    let rgb = marker_frame();
    let gray = image::DynamicImage::ImageRgb8(rgb).into_luma8();
    let out = tracker.process(&Frame::from(gray), 0.0).expect("tracked");
    assert_eq!(out.detections.len(), 16);
    assert!(out.annotated.is_none());
}
