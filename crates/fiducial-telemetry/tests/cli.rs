mod common;

use assert_cmd::Command;
use common::{config, dot_centers, marker_frame, render};
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn bin() -> Command {
    Command::cargo_bin("fiducial-telemetry").expect("binary")
}

fn write_config(dir: &Path, window: usize) -> PathBuf {
    let mut cfg = config();
    cfg.calibration.window = window;
    let path = dir.join("tracker.json");
    std::fs::write(&path, cfg.to_json_pretty().expect("json")).expect("write config");
    path
}

fn write_frames(dir: &Path, count: usize) -> Vec<PathBuf> {
    let img = marker_frame();
    (0..count)
        .map(|i| {
            let path = dir.join(format!("still_{i:02}.png"));
            img.save(&path).expect("write frame");
            path
        })
        .collect()
}

#[test]
fn track_prints_telemetry_lines_after_calibration() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = write_config(dir.path(), 3);
    let frames = write_frames(dir.path(), 5);

    let out = bin()
        .arg("track")
        .arg("--config")
        .arg(&cfg)
        .args(&frames)
        .assert()
        .success()
        .stdout(predicate::str::contains("[Tel] X:"))
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text.lines().filter(|l| l.starts_with("[Tel]")).count(), 2);
}

#[test]
fn track_json_reports_failures_and_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = write_config(dir.path(), 10);
    let mut frames = write_frames(dir.path(), 2);
    let mut missing = dot_centers(0, 0);
    missing.truncate(12);
    let broken = dir.path().join("broken.png");
    render(&missing).save(&broken).expect("write frame");
    frames.push(broken);

    let out = bin()
        .args(["track", "--json", "--config"])
        .arg(&cfg)
        .args(&frames)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0]["telemetry"].is_null());
    assert!(lines[0]["failure"].is_null());
    assert_eq!(lines[2]["failure"], "wrong_point_count");

    let summary = &lines[3]["summary"];
    assert_eq!(summary["frames"], 3);
    assert_eq!(summary["tracked"], 2);
    assert_eq!(summary["calibrated"], false);
    assert_eq!(summary["failures"]["wrong_point_count"], 1);
}

#[test]
fn track_writes_annotated_frames() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg = write_config(dir.path(), 10);
    let frames = write_frames(dir.path(), 1);
    let annotated = dir.path().join("annotated");

    bin()
        .arg("track")
        .arg("--config")
        .arg(&cfg)
        .arg("--annotate-dir")
        .arg(&annotated)
        .args(&frames)
        .assert()
        .success();
    assert!(annotated.join("frame_00000.png").is_file());
}

#[test]
fn track_rejects_missing_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = write_frames(dir.path(), 1);
    bin()
        .arg("track")
        .arg("--config")
        .arg(dir.path().join("nope.json"))
        .args(&frames)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn tune_writes_planes_and_mask() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frames = write_frames(dir.path(), 1);
    let out_dir = dir.path().join("tune");

    bin()
        .arg("tune")
        .arg("--out-dir")
        .arg(&out_dir)
        .arg(&frames[0])
        .assert()
        .success();
    for name in ["h.png", "s.png", "v.png", "mask.png"] {
        assert!(out_dir.join(name).is_file(), "{name} missing");
    }
    let mask = image::open(out_dir.join("mask.png"))
        .expect("mask")
        .into_luma8();
    let (x, y) = dot_centers(0, 0)[0];
    assert_eq!(mask.get_pixel(x as u32, y as u32).0[0], 255);
    assert_eq!(mask.get_pixel(5, 5).0[0], 0);
}

#[test]
fn layout_prints_sixteen_points() {
    let out = bin()
        .args(["layout", "--radius", "50"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let layout: serde_json::Value = serde_json::from_slice(&out).expect("json");
    let points = layout["points"].as_array().expect("points");
    assert_eq!(points.len(), 16);
    assert_eq!(points[0], serde_json::json!([0.0, 0.0]));
}
