use serde::{Deserialize, Serialize};

/// Configuration for [`PoseEstimator`](crate::PoseEstimator).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseParams {
    /// Output translation is multiplied by this factor.
    pub coord_scale: f64,
    pub ransac_iterations: usize,
    /// Inlier threshold on the pixel reprojection error.
    pub reprojection_error_px: f64,
    /// Minimal consensus size accepted as a solution.
    pub min_inliers: usize,
    pub seed: u64,
    /// Levenberg–Marquardt iterations on the final consensus set.
    pub refine_iterations: usize,
    /// Length of the drawn axes, in marker units before `coord_scale`.
    pub axis_length: f64,
}

impl Default for PoseParams {
    fn default() -> Self {
        Self {
            coord_scale: 1.0,
            ransac_iterations: 100,
            reprojection_error_px: 8.0,
            min_inliers: 4,
            seed: 0x90_5E,
            refine_iterations: 20,
            axis_length: 30.0,
        }
    }
}
