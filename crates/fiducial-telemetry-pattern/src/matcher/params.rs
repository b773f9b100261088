use serde::{Deserialize, Serialize};

/// Configuration for [`PatternMatcher`](super::PatternMatcher).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchParams {
    /// Search radius for the center and radial partners, in scaled
    /// undistorted units.
    pub proximity_radius: f64,
    /// Normalized camera coordinates are multiplied by this before any
    /// structural reasoning.
    pub undistort_scale: f64,
    /// RANSAC inlier threshold of the validating homography, in layout units.
    pub reprojection_threshold: f64,
    pub ransac_max_iters: usize,
    pub ransac_seed: u64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            proximity_radius: 50.0,
            undistort_scale: 1000.0,
            reprojection_threshold: 50.0,
            ransac_max_iters: 2000,
            ransac_seed: 0x5EED_F1DC,
        }
    }
}
