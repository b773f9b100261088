use fiducial_telemetry_blobs::BlobParams;
use fiducial_telemetry_calibrator::CalibrationParams;
use fiducial_telemetry_core::{CameraCalibration, CameraError};
use fiducial_telemetry_pattern::{MatchParams, ReferenceLayout};
use fiducial_telemetry_pose::{PoseError, PoseParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while loading a configuration or building a tracker.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid camera calibration: {0}")]
    Camera(#[from] CameraError),
    #[error("invalid marker model: {0}")]
    Model(#[from] PoseError),
}

/// Whole-pipeline configuration, loaded from JSON.
///
/// Only `camera` is required:
///
/// ```json
/// {
///   "camera": { "matrix": [[600, 0, 320], [0, 600, 240], [0, 0, 1]], "distortion": [] },
///   "blobs": { "range": { "space": "hsv", "low": [0, 120, 70], "high": [10, 255, 255] } },
///   "calibration": { "window": 10 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub camera: CameraCalibration,
    #[serde(default)]
    pub layout: ReferenceLayout,
    #[serde(default)]
    pub blobs: BlobParams,
    #[serde(default)]
    pub matcher: MatchParams,
    #[serde(default)]
    pub pose: PoseParams,
    #[serde(default)]
    pub calibration: CalibrationParams,
}

impl TrackerConfig {
    pub fn new(camera: CameraCalibration) -> Self {
        Self {
            camera,
            layout: ReferenceLayout::default(),
            blobs: BlobParams::default(),
            matcher: MatchParams::default(),
            pose: PoseParams::default(),
            calibration: CalibrationParams::default(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_json_str(&text)?;
        if cfg.calibration.window == 0 {
            log::warn!("calibration window of 0 is treated as 1");
        }
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
