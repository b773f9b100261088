//! Marker pose from matched detections.
//!
//! The marker is planar (`z = 0`), so minimal samples are solved through a
//! plane-to-image homography in normalized camera coordinates. The best
//! RANSAC consensus is refit and polished with Levenberg–Marquardt.

mod draw;
mod error;
mod estimator;
mod params;
mod planar;

pub use draw::draw_axes;
pub use error::PoseError;
pub use estimator::{PoseEstimate, PoseEstimator};
pub use params::PoseParams;
pub use planar::{pose_from_homography, refine_pose};
