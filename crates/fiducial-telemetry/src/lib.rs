//! Fiducial marker tracking for robot ground-truth telemetry.
//!
//! A frame goes through four stages:
//!
//! 1. [`blobs::BlobDetector`] finds the colored dots,
//! 2. [`pattern::PatternMatcher`] works out which dot is which marker point,
//! 3. [`pose::PoseEstimator`] solves the marker pose,
//! 4. [`calibrator::TelemetryCalibrator`] turns poses into robot-relative
//!    `(x, y, heading)` once the marker has settled.
//!
//! [`Tracker`] wires the stages together from a [`TrackerConfig`].
//!
//! ```no_run
//! use fiducial_telemetry::{Frame, Tracker, TrackerConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrackerConfig::load("tracker.json")?;
//! let mut tracker = Tracker::from_config(&config)?;
//! let frame = Frame::from_dynamic(image::open("frame.png")?);
//! match tracker.process(&frame, 0.0) {
//!     Ok(out) => {
//!         if let Some(t) = out.telemetry {
//!             println!("{t}");
//!         }
//!     }
//!     Err(e) => eprintln!("frame dropped ({:?}): {e}", e.kind()),
//! }
//! # Ok(())
//! # }
//! ```

pub use fiducial_telemetry_blobs as blobs;
pub use fiducial_telemetry_calibrator as calibrator;
pub use fiducial_telemetry_core as core;
pub use fiducial_telemetry_pattern as pattern;
pub use fiducial_telemetry_pose as pose;

pub use fiducial_telemetry_blobs::Frame;
pub use fiducial_telemetry_calibrator::Telemetry;
pub use fiducial_telemetry_core::{Point2, RawPose};

mod config;
mod error;
mod tracker;

pub use config::{ConfigError, TrackerConfig};
pub use error::{FailureKind, TrackError};
pub use tracker::{FrameOutput, Tracker};
