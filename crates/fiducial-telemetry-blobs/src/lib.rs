//! Color-range blob extraction.
//!
//! A frame is thresholded against a [`ColorRange`] (gray or HSV), external
//! contours of the resulting mask are traced and each region is reduced to
//! the area centroid of its contour polygon.
//!
//! ```no_run
//! use fiducial_telemetry_blobs::{BlobDetector, BlobParams, ColorRange, Frame};
//!
//! let img = image::open("frame.png").unwrap();
//! let frame = Frame::from_dynamic(img);
//! let detector = BlobDetector::new(BlobParams::new(ColorRange::hsv([0, 120, 70], [10, 255, 255])));
//! let detection = detector.find(&frame).unwrap();
//! println!("{} dots", detection.points().len());
//! ```

mod color;
mod detector;
mod frame;

pub use color::{rgb_to_hsv, split_channels, to_hsv, ColorRange};
pub use detector::{Blob, BlobDetection, BlobDetector, BlobError, BlobParams};
pub use frame::Frame;
