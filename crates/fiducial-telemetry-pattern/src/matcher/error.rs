use serde::{Deserialize, Serialize};

/// Reasons a frame's detections could not be matched. Each variant is
/// fatal for the frame only.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("expected {expected} points, got {got}")]
    WrongPointCount { expected: usize, got: usize },
    #[error("point {index} could not be undistorted")]
    UndistortFailed { index: usize },
    #[error("convex hull has {got} points, expected {expected}")]
    HullSizeMismatch { expected: usize, got: usize },
    #[error("no point within {radius} of the hull center")]
    CenterNotFound { radius: f64 },
    #[error("found {got} interior points, expected {expected}")]
    RestPointCountMismatch { expected: usize, got: usize },
    #[error("interior point {point} does not point at a hull point")]
    RelationshipNotFound { point: usize },
    #[error("cannot locate the lonely hull point")]
    OrientationAmbiguous,
    #[error("no interior point paired with radial slot {slot}")]
    RadialSlotUnpaired { slot: usize },
    #[error("homography fit failed")]
    HomographyFailed,
    #[error("{outliers} point(s) exceed the reprojection threshold (first: {first})")]
    ReprojectionExceeded { outliers: usize, first: usize },
}

/// Data-free tag of a [`MatchError`], for counting failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchErrorKind {
    WrongPointCount,
    UndistortFailed,
    HullSizeMismatch,
    CenterNotFound,
    RestPointCountMismatch,
    RelationshipNotFound,
    OrientationAmbiguous,
    RadialSlotUnpaired,
    HomographyFailed,
    ReprojectionExceeded,
}

impl MatchError {
    pub fn kind(&self) -> MatchErrorKind {
        match self {
            Self::WrongPointCount { .. } => MatchErrorKind::WrongPointCount,
            Self::UndistortFailed { .. } => MatchErrorKind::UndistortFailed,
            Self::HullSizeMismatch { .. } => MatchErrorKind::HullSizeMismatch,
            Self::CenterNotFound { .. } => MatchErrorKind::CenterNotFound,
            Self::RestPointCountMismatch { .. } => MatchErrorKind::RestPointCountMismatch,
            Self::RelationshipNotFound { .. } => MatchErrorKind::RelationshipNotFound,
            Self::OrientationAmbiguous => MatchErrorKind::OrientationAmbiguous,
            Self::RadialSlotUnpaired { .. } => MatchErrorKind::RadialSlotUnpaired,
            Self::HomographyFailed => MatchErrorKind::HomographyFailed,
            Self::ReprojectionExceeded { .. } => MatchErrorKind::ReprojectionExceeded,
        }
    }
}
