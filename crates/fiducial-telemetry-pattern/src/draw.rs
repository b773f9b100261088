//! Overlay of a correspondence on a frame.

use crate::{Correspondence, ReferenceLayout};
use ab_glyph::{FontRef, PxScale};
use fiducial_telemetry_core::Point2;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};

const HULL_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const RADIAL_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
const ORIGIN_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_SCALE: f32 = 14.0;
/// Label offset from its dot: right of it and above.
const LABEL_OFFSET: f64 = 3.0;

fn px(p: Point2) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

/// Draw the matched hull ring in slot order, the center-to-radial spokes, a
/// dot on hull slot 1 and each dot's layout slot number.
///
/// Nothing is drawn if `correspondence` does not fit `detections`.
pub fn draw_correspondence(
    img: &mut RgbImage,
    detections: &[Point2],
    correspondence: &Correspondence,
    layout: &ReferenceLayout,
) {
    let Some(ordered) = correspondence.apply(detections) else {
        return;
    };
    if ordered.len() != layout.len() {
        return;
    }

    let hull: Vec<usize> = layout.hull_indices().collect();
    for (k, &a) in hull.iter().enumerate() {
        let b = hull[(k + 1) % hull.len()];
        draw_line_segment_mut(img, px(ordered[a]), px(ordered[b]), HULL_COLOR);
    }
    let center = ordered[layout.center_index()];
    for r in layout.radial_indices() {
        draw_line_segment_mut(img, px(center), px(ordered[r]), RADIAL_COLOR);
    }
    if let Some(&first) = hull.first() {
        let p = ordered[first];
        draw_filled_circle_mut(
            img,
            (p.x.round() as i32, p.y.round() as i32),
            3,
            ORIGIN_COLOR,
        );
    }
    draw_slot_labels(img, &ordered);
}

fn draw_slot_labels(img: &mut RgbImage, ordered: &[Point2]) {
    let font = match FontRef::try_from_slice(ttf_firacode::REGULAR as &[u8]) {
        Ok(font) => font,
        Err(e) => {
            log::warn!("label font unavailable: {e}");
            return;
        }
    };
    let scale = PxScale::from(LABEL_SCALE);
    for (slot, p) in ordered.iter().enumerate() {
        // text is anchored at its top-left corner
        let x = (p.x + LABEL_OFFSET).round() as i32;
        let y = (p.y - LABEL_OFFSET - f64::from(LABEL_SCALE)).round() as i32;
        draw_text_mut(img, LABEL_COLOR, x, y, scale, &font, &slot.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_in_pixels(layout: &ReferenceLayout) -> Vec<Point2> {
        layout
            .points()
            .iter()
            .map(|p| Point2::new(p.x + 320.0, p.y + 240.0))
            .collect()
    }

    fn is_label_pixel(px: &Rgb<u8>) -> bool {
        let [r, g, b] = px.0;
        r == g && g == b && r > 100
    }

    #[test]
    fn slot_numbers_are_written_next_to_dots() {
        let layout = ReferenceLayout::default();
        let detections = layout_in_pixels(&layout);
        let identity = Correspondence::new((0..layout.len()).collect());
        let mut img = RgbImage::new(640, 480);
        draw_correspondence(&mut img, &detections, &identity, &layout);

        // "0" sits up and to the right of the center dot at (320, 240)
        let lit = (323..340)
            .flat_map(|x| (218..240).map(move |y| (x, y)))
            .filter(|&(x, y)| is_label_pixel(img.get_pixel(x, y)))
            .count();
        assert!(lit > 5, "only {lit} label pixels near the center");
    }

    #[test]
    fn mismatched_correspondence_draws_nothing() {
        let layout = ReferenceLayout::default();
        let detections = layout_in_pixels(&layout);
        let short = Correspondence::new(vec![0, 1, 2]);
        let mut img = RgbImage::new(640, 480);
        draw_correspondence(&mut img, &detections, &short, &layout);
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
