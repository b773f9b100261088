/// Errors returned by [`PoseEstimator`](crate::PoseEstimator).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PoseError {
    #[error("marker model needs at least 4 points, got {got}")]
    TooFewPoints { got: usize },
    #[error("marker model point {index} is not on the z = 0 plane")]
    NonPlanarObject { index: usize },
    #[error("expected {expected} image points, got {got}")]
    WrongPointCount { expected: usize, got: usize },
    #[error("image point {index} could not be undistorted")]
    UndistortFailed { index: usize },
    #[error("PnP solve failed ({inliers} inliers)")]
    SolveFailed { inliers: usize },
}
