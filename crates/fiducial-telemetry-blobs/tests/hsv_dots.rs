use fiducial_telemetry_blobs::{to_hsv, BlobDetector, BlobParams, ColorRange, Frame};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

fn scene() -> RgbImage {
    let mut img = RgbImage::from_pixel(160, 120, Rgb([40, 60, 40]));
    // red dots are the marker, blue ones are clutter
    for c in [(20, 20), (80, 60), (140, 100), (20, 100)] {
        draw_filled_circle_mut(&mut img, c, 5, Rgb([220, 20, 20]));
    }
    for c in [(140, 20), (80, 20)] {
        draw_filled_circle_mut(&mut img, c, 5, Rgb([20, 20, 220]));
    }
    img
}

#[test]
fn only_dots_in_range_are_found() {
    let frame = Frame::Rgb(scene());
    let detector = BlobDetector::new(BlobParams::new(ColorRange::hsv(
        [0, 120, 70],
        [10, 255, 255],
    )));
    let det = detector.find(&frame).expect("find");

    let mut pts: Vec<(i64, i64)> = det
        .points()
        .iter()
        .map(|p| (p.x.round() as i64, p.y.round() as i64))
        .collect();
    pts.sort_unstable();
    assert_eq!(pts, vec![(20, 20), (20, 100), (80, 60), (140, 100)]);
    assert_eq!(det.mask.dimensions(), (160, 120));
}

#[test]
fn hsv_planes_expose_hue() {
    let hsv = to_hsv(&scene());
    assert_eq!(hsv.get_pixel(20, 20).0[0], 0);
    assert_eq!(hsv.get_pixel(140, 20).0[0], 120);
}
