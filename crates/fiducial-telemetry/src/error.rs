use fiducial_telemetry_blobs::BlobError;
use fiducial_telemetry_pattern::{MatchError, MatchErrorKind};
use fiducial_telemetry_pose::PoseError;
use serde::{Deserialize, Serialize};

/// Per-frame tracking failure. The session continues with the next frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    #[error("blob detection: {0}")]
    Blobs(#[from] BlobError),
    #[error("pattern matching: {0}")]
    Match(#[from] MatchError),
    #[error("pose estimation: {0}")]
    Pose(#[from] PoseError),
}

/// Data-free failure tag, suitable as a statistics key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ChannelMismatch,
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
    PoseSolveFailed,
}

impl From<MatchErrorKind> for FailureKind {
    fn from(kind: MatchErrorKind) -> Self {
        match kind {
            MatchErrorKind::WrongPointCount => Self::WrongPointCount,
            MatchErrorKind::UndistortFailed => Self::UndistortFailed,
            MatchErrorKind::HullSizeMismatch => Self::HullSizeMismatch,
            MatchErrorKind::CenterNotFound => Self::CenterNotFound,
            MatchErrorKind::RestPointCountMismatch => Self::RestPointCountMismatch,
            MatchErrorKind::RelationshipNotFound => Self::RelationshipNotFound,
            MatchErrorKind::OrientationAmbiguous => Self::OrientationAmbiguous,
            MatchErrorKind::RadialSlotUnpaired => Self::RadialSlotUnpaired,
            MatchErrorKind::HomographyFailed => Self::HomographyFailed,
            MatchErrorKind::ReprojectionExceeded => Self::ReprojectionExceeded,
        }
    }
}

impl TrackError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Blobs(BlobError::ChannelMismatch { .. }) => FailureKind::ChannelMismatch,
            Self::Match(e) => e.kind().into(),
            Self::Pose(PoseError::WrongPointCount { .. }) => FailureKind::WrongPointCount,
            Self::Pose(PoseError::UndistortFailed { .. }) => FailureKind::UndistortFailed,
            Self::Pose(_) => FailureKind::PoseSolveFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn kinds_aggregate_across_stages() {
        let errors = [
            TrackError::from(MatchError::HullSizeMismatch {
                expected: 12,
                got: 11,
            }),
            TrackError::from(MatchError::HullSizeMismatch {
                expected: 12,
                got: 13,
            }),
            TrackError::from(PoseError::SolveFailed { inliers: 2 }),
            TrackError::from(BlobError::ChannelMismatch { range: 3, frame: 1 }),
        ];
        let mut stats: HashMap<FailureKind, usize> = HashMap::new();
        for e in &errors {
            *stats.entry(e.kind()).or_default() += 1;
        }
        assert_eq!(stats[&FailureKind::HullSizeMismatch], 2);
        assert_eq!(stats[&FailureKind::PoseSolveFailed], 1);
        assert_eq!(stats[&FailureKind::ChannelMismatch], 1);
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&FailureKind::ReprojectionExceeded).expect("json");
        assert_eq!(json, "\"reprojection_exceeded\"");
    }
}
