//! HSV conversion and color ranges.
//!
//! HSV follows the common 8-bit convention: hue is degrees / 2 in `[0, 180)`,
//! saturation and value are in `[0, 255]`.

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

/// Convert one RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut h = if diff <= 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    let mut h8 = (h / 2.0).round() as u16;
    if h8 >= 180 {
        h8 -= 180;
    }
    [h8 as u8, s.round() as u8, v as u8]
}

/// Convert a whole RGB image to HSV. The result reuses the RGB buffer layout
/// with channels `(H, S, V)`.
pub fn to_hsv(img: &RgbImage) -> RgbImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        px.0 = rgb_to_hsv(px.0);
    }
    out
}

/// Split a 3-channel image into one gray image per channel.
///
/// Used for picking range limits by eye: run it on [`to_hsv`] output to get
/// the H, S and V planes.
pub fn split_channels(img: &RgbImage) -> [GrayImage; 3] {
    let (w, h) = img.dimensions();
    let plane = |c: usize| GrayImage::from_fn(w, h, |x, y| Luma([img.get_pixel(x, y).0[c]]));
    [plane(0), plane(1), plane(2)]
}

/// Inclusive per-channel range used to segment marker dots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "snake_case")]
pub enum ColorRange {
    /// Threshold directly on a single-channel frame.
    Gray { low: u8, high: u8 },
    /// Threshold in HSV space on a color frame.
    Hsv { low: [u8; 3], high: [u8; 3] },
}

impl ColorRange {
    pub fn gray(low: u8, high: u8) -> Self {
        Self::Gray { low, high }
    }

    pub fn hsv(low: [u8; 3], high: [u8; 3]) -> Self {
        Self::Hsv { low, high }
    }

    /// Number of channels the range constrains.
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray { .. } => 1,
            Self::Hsv { .. } => 3,
        }
    }

    #[inline]
    pub fn contains_gray(&self, v: u8) -> bool {
        match *self {
            Self::Gray { low, high } => low <= v && v <= high,
            Self::Hsv { .. } => false,
        }
    }

    #[inline]
    pub fn contains_hsv(&self, px: [u8; 3]) -> bool {
        match *self {
            Self::Hsv { low, high } => (0..3).all(|c| low[c] <= px[c] && px[c] <= high[c]),
            Self::Gray { .. } => false,
        }
    }
}

impl Default for ColorRange {
    /// Saturated red, low end of the hue circle.
    fn default() -> Self {
        Self::hsv([0, 120, 70], [10, 255, 255])
    }
}
