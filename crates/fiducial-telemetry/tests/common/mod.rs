#![allow(dead_code)]

use fiducial_telemetry::core::CameraCalibration;
use fiducial_telemetry::pattern::ReferenceLayout;
use fiducial_telemetry::TrackerConfig;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;
pub const FOCAL: f64 = 600.0;
pub const DISTANCE: f64 = 600.0;
pub const DOT: Rgb<u8> = Rgb([220, 20, 20]);
pub const BACKGROUND: Rgb<u8> = Rgb([10, 10, 10]);

pub fn calibration() -> CameraCalibration {
    CameraCalibration {
        matrix: [
            [FOCAL, 0.0, WIDTH as f64 / 2.0],
            [0.0, FOCAL, HEIGHT as f64 / 2.0],
            [0.0, 0.0, 1.0],
        ],
        distortion: Vec::new(),
    }
}

pub fn config() -> TrackerConfig {
    TrackerConfig::new(calibration())
}

/// Pixel position of every layout point for a fronto-parallel marker at
/// `DISTANCE`, shifted by `(dx, dy)` pixels.
pub fn dot_centers(dx: i32, dy: i32) -> Vec<(i32, i32)> {
    let scale = FOCAL / DISTANCE;
    ReferenceLayout::default()
        .points()
        .iter()
        .map(|p| {
            (
                (WIDTH as f64 / 2.0 + scale * p.x).round() as i32 + dx,
                (HEIGHT as f64 / 2.0 + scale * p.y).round() as i32 + dy,
            )
        })
        .collect()
}

pub fn render(centers: &[(i32, i32)]) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    for &c in centers {
        draw_filled_circle_mut(&mut img, c, 6, DOT);
    }
    img
}

pub fn marker_frame() -> RgbImage {
    render(&dot_centers(0, 0))
}
