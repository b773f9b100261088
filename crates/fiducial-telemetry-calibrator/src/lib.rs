//! Raw pose → robot telemetry.
//!
//! [`TelemetryCalibrator`] waits until the marker has been still for a full
//! window, takes the mean of that window as the zero pose and from then on
//! reports planar position and an unwrapped heading relative to it.

mod calibrator;
mod params;
mod telemetry;
mod unwrap;

pub use calibrator::{CalibrationPhase, TelemetryCalibrator};
pub use params::CalibrationParams;
pub use telemetry::Telemetry;
pub use unwrap::RotationUnwrapper;
