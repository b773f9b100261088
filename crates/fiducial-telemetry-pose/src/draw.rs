use crate::{PoseEstimate, PoseEstimator};
use fiducial_telemetry_core::{Point2, Point3};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

const AXIS_COLORS: [Rgb<u8>; 3] = [Rgb([0, 255, 0]), Rgb([0, 150, 0]), Rgb([0, 50, 0])];
const HALF_WIDTH: i32 = 2;

fn thick_line(img: &mut RgbImage, a: Point2, b: Point2, color: Rgb<u8>) {
    let d = b - a;
    let len = d.norm();
    if !len.is_finite() || len < 1e-9 {
        return;
    }
    let n = nalgebra::Vector2::new(-d.y, d.x) / len;
    for k in -HALF_WIDTH..=HALF_WIDTH {
        let o = n * k as f64;
        draw_line_segment_mut(
            img,
            ((a.x + o.x) as f32, (a.y + o.y) as f32),
            ((b.x + o.x) as f32, (b.y + o.y) as f32),
            color,
        );
    }
}

/// Draw the marker x/y/z axes at the estimated pose.
///
/// Axes have length `axis_length * coord_scale` marker units. Axes whose end
/// points do not project are skipped.
pub fn draw_axes(img: &mut RgbImage, estimator: &PoseEstimator, estimate: &PoseEstimate) {
    let p = estimator.params();
    let len = p.axis_length * p.coord_scale;
    let pts = [
        Point3::origin(),
        Point3::new(len, 0.0, 0.0),
        Point3::new(0.0, len, 0.0),
        Point3::new(0.0, 0.0, len),
    ];
    let proj = estimator.project(&estimate.camera_pose, &pts);
    let Some(origin) = proj[0] else {
        return;
    };
    for (end, color) in proj[1..].iter().zip(AXIS_COLORS) {
        if let Some(end) = end {
            thick_line(img, origin, *end, color);
        }
    }
}
