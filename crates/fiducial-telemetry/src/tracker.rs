use crate::{ConfigError, TrackError, TrackerConfig};
use fiducial_telemetry_blobs::{BlobDetector, Frame};
use fiducial_telemetry_calibrator::{Telemetry, TelemetryCalibrator};
use fiducial_telemetry_core::{CameraModel, Point2, RawPose};
use fiducial_telemetry_pattern::{draw_correspondence, Correspondence, MatchError, PatternMatcher};
use fiducial_telemetry_pose::{draw_axes, PoseEstimator};
use image::RgbImage;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Everything one successfully tracked frame produced.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Blob centroids in detection order.
    pub detections: Vec<Point2>,
    pub correspondence: Correspondence,
    /// Marker pose in camera coordinates, translation scaled by `coord_scale`.
    pub pose: RawPose,
    /// `None` until the calibrator has settled.
    pub telemetry: Option<Telemetry>,
    pub annotated: Option<RgbImage>,
}

/// Full per-frame pipeline: blobs, matching, pose, telemetry.
///
/// A failing frame leaves the calibrator untouched, so a tracking session
/// survives dropped frames.
#[derive(Clone, Debug)]
pub struct Tracker {
    blobs: BlobDetector,
    matcher: PatternMatcher,
    pose: PoseEstimator,
    calibrator: TelemetryCalibrator,
}

impl Tracker {
    pub fn new(
        blobs: BlobDetector,
        matcher: PatternMatcher,
        pose: PoseEstimator,
        calibrator: TelemetryCalibrator,
    ) -> Self {
        Self {
            blobs,
            matcher,
            pose,
            calibrator,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self, ConfigError> {
        let camera = CameraModel::try_from(&config.camera)?;
        let layout = config.layout.clone();
        let object = layout.points3d();
        let matcher = PatternMatcher::new(layout, camera, config.matcher);
        let pose = PoseEstimator::new(object, camera, config.pose)?;
        log::debug!(
            "tracker ready: {} marker points, fx={:.1}",
            matcher.layout().len(),
            camera.intrinsics().fx
        );
        Ok(Self::new(
            BlobDetector::new(config.blobs.clone()),
            matcher,
            pose,
            TelemetryCalibrator::new(config.calibration),
        ))
    }

    #[inline]
    pub fn blob_detector(&self) -> &BlobDetector {
        &self.blobs
    }

    #[inline]
    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    #[inline]
    pub fn pose_estimator(&self) -> &PoseEstimator {
        &self.pose
    }

    #[inline]
    pub fn calibrator(&self) -> &TelemetryCalibrator {
        &self.calibrator
    }

    /// Drop the calibration and start collecting a new window.
    pub fn reset(&mut self) {
        self.calibrator.reset();
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, frame), fields(w = frame.width(), h = frame.height()))
    )]
    pub fn process(&mut self, frame: &Frame, timestamp: f64) -> Result<FrameOutput, TrackError> {
        let detection = self.blobs.find(frame)?;
        let detections = detection.points();

        let matched = self.matcher.match_points(&detections)?;
        let ordered = matched
            .correspondence
            .apply(&detections)
            .ok_or(MatchError::WrongPointCount {
                expected: self.matcher.layout().len(),
                got: detections.len(),
            })?;

        let estimate = self.pose.estimate(&ordered)?;
        log::trace!(
            "pose t=({:.2}, {:.2}, {:.2}) rms={:.3}px inliers={}",
            estimate.pose.translation.x,
            estimate.pose.translation.y,
            estimate.pose.translation.z,
            estimate.rms_px,
            estimate.num_inliers()
        );

        let was_calibrated = self.calibrator.is_calibrated();
        let telemetry = self.calibrator.update(&estimate.pose, timestamp);
        if !was_calibrated && self.calibrator.is_calibrated() {
            log::info!("calibrated at t={timestamp:.3}s");
        }

        let annotated = detection.annotated.map(|mut img| {
            draw_correspondence(
                &mut img,
                &detections,
                &matched.correspondence,
                self.matcher.layout(),
            );
            draw_axes(&mut img, &self.pose, &estimate);
            img
        });

        Ok(FrameOutput {
            detections,
            correspondence: matched.correspondence,
            pose: estimate.pose,
            telemetry,
            annotated,
        })
    }
}
