use crate::color::{rgb_to_hsv, ColorRange};
use crate::frame::Frame;
use fiducial_telemetry_core::{polygon_moments, Point2};
use image::{GrayImage, Luma, Pixel, Rgb, RgbImage};
use imageproc::contours::find_contours;
use imageproc::drawing::draw_hollow_circle_mut;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

const MASK_ON: u8 = 255;
const BLOB_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CENTROID_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const CENTROID_RADIUS: i32 = 5;

/// Errors returned by [`BlobDetector::find`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("color range has {range} channel(s) but the frame has {frame}")]
    ChannelMismatch { range: usize, frame: usize },
}

fn default_annotate() -> bool {
    true
}

/// Blob detector configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobParams {
    pub range: ColorRange,
    /// Render the annotated copy of the frame.
    #[serde(default = "default_annotate")]
    pub annotate: bool,
    /// Report zero-area contours as `(0, 0)` instead of dropping them.
    #[serde(default)]
    pub keep_degenerate: bool,
}

impl BlobParams {
    pub fn new(range: ColorRange) -> Self {
        Self {
            range,
            annotate: true,
            keep_degenerate: false,
        }
    }
}

impl Default for BlobParams {
    fn default() -> Self {
        Self::new(ColorRange::default())
    }
}

/// One connected region of the mask.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    pub centroid: Point2,
    /// Area of the outer contour polygon, in pixels.
    pub area: f64,
}

/// Output of a blob detection run.
#[derive(Clone, Debug)]
pub struct BlobDetection {
    /// Blobs in contour extraction order. This order is not stable across
    /// frames.
    pub blobs: Vec<Blob>,
    /// Binary mask, 255 inside the color range.
    pub mask: GrayImage,
    /// Frame copy with filled blobs and centroid circles, when requested.
    pub annotated: Option<RgbImage>,
}

impl BlobDetection {
    pub fn points(&self) -> Vec<Point2> {
        self.blobs.iter().map(|b| b.centroid).collect()
    }
}

/// Finds dots of a configured color. Holds configuration only.
#[derive(Clone, Debug)]
pub struct BlobDetector {
    params: BlobParams,
}

impl BlobDetector {
    pub fn new(params: BlobParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &BlobParams {
        &self.params
    }

    /// Threshold `frame` against the configured range.
    ///
    /// A gray range applied to a color frame thresholds its luma.
    pub fn mask(&self, frame: &Frame) -> Result<GrayImage, BlobError> {
        let range = &self.params.range;
        match (frame, range) {
            (Frame::Gray(img), ColorRange::Gray { .. }) => Ok(GrayImage::from_fn(
                img.width(),
                img.height(),
                |x, y| mask_value(range.contains_gray(img.get_pixel(x, y).0[0])),
            )),
            (Frame::Rgb(img), ColorRange::Gray { .. }) => Ok(GrayImage::from_fn(
                img.width(),
                img.height(),
                |x, y| mask_value(range.contains_gray(img.get_pixel(x, y).to_luma().0[0])),
            )),
            (Frame::Rgb(img), ColorRange::Hsv { .. }) => Ok(GrayImage::from_fn(
                img.width(),
                img.height(),
                |x, y| mask_value(range.contains_hsv(rgb_to_hsv(img.get_pixel(x, y).0))),
            )),
            _ => Err(BlobError::ChannelMismatch {
                range: range.channels(),
                frame: frame.channels(),
            }),
        }
    }

    /// Detect blobs in `frame`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, frame),
            fields(width = frame.width(), height = frame.height())
        )
    )]
    pub fn find(&self, frame: &Frame) -> Result<BlobDetection, BlobError> {
        let mask = self.mask(frame)?;

        let mut blobs = Vec::new();
        for contour in find_contours::<i32>(&mask) {
            if contour.parent.is_some() {
                continue;
            }
            let moments = polygon_moments(
                contour
                    .points
                    .iter()
                    .map(|p| Point2::new(p.x as f64, p.y as f64)),
            );
            match moments.centroid() {
                Some(centroid) => blobs.push(Blob {
                    centroid,
                    area: moments.m00,
                }),
                None if self.params.keep_degenerate => blobs.push(Blob {
                    centroid: Point2::origin(),
                    area: 0.0,
                }),
                None => {}
            }
        }
        log::debug!("found {} blobs", blobs.len());

        let annotated = self
            .params
            .annotate
            .then(|| annotate(frame, &mask, &blobs));

        Ok(BlobDetection {
            blobs,
            mask,
            annotated,
        })
    }
}

#[inline]
fn mask_value(inside: bool) -> Luma<u8> {
    Luma([if inside { MASK_ON } else { 0 }])
}

fn annotate(frame: &Frame, mask: &GrayImage, blobs: &[Blob]) -> RgbImage {
    let mut out = frame.to_rgb();
    for (x, y, m) in mask.enumerate_pixels() {
        if m.0[0] == MASK_ON {
            out.put_pixel(x, y, BLOB_COLOR);
        }
    }
    for b in blobs {
        let c = (b.centroid.x.round() as i32, b.centroid.y.round() as i32);
        draw_hollow_circle_mut(&mut out, c, CENTROID_RADIUS, CENTROID_COLOR);
    }
    out
}
