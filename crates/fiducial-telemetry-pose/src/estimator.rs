use crate::planar::{pose_from_homography, refine_pose};
use crate::{PoseError, PoseParams};
use fiducial_telemetry_core::{
    estimate_homography, homography_from_4pt, sample_indices, CameraModel, Point2, Point3, RawPose,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(feature = "tracing")]
use tracing::instrument;

const PLANE_EPS: f64 = 1e-9;

/// Result of a successful pose solve.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseEstimate {
    /// Pose with the translation multiplied by `coord_scale`.
    pub pose: RawPose,
    /// Pose in marker units, as used for projection.
    pub camera_pose: RawPose,
    pub inlier_mask: Vec<bool>,
    /// RMS pixel reprojection error over the inliers.
    pub rms_px: f64,
}

impl PoseEstimate {
    pub fn num_inliers(&self) -> usize {
        self.inlier_mask.iter().filter(|&&m| m).count()
    }
}

/// RANSAC PnP for a planar marker with fixed model points.
#[derive(Clone, Debug)]
pub struct PoseEstimator {
    object: Vec<Point3>,
    camera: CameraModel,
    params: PoseParams,
}

impl PoseEstimator {
    /// `object` are the marker points in marker coordinates; all must lie on
    /// `z = 0`.
    pub fn new(
        object: Vec<Point3>,
        camera: CameraModel,
        params: PoseParams,
    ) -> Result<Self, PoseError> {
        if object.len() < 4 {
            return Err(PoseError::TooFewPoints { got: object.len() });
        }
        if let Some(index) = object.iter().position(|p| p.z.abs() > PLANE_EPS) {
            return Err(PoseError::NonPlanarObject { index });
        }
        Ok(Self {
            object,
            camera,
            params,
        })
    }

    #[inline]
    pub fn params(&self) -> &PoseParams {
        &self.params
    }

    #[inline]
    pub fn camera(&self) -> &CameraModel {
        &self.camera
    }

    #[inline]
    pub fn object_points(&self) -> &[Point3] {
        &self.object
    }

    /// Project marker-frame points through `pose` (marker units).
    pub fn project(&self, pose: &RawPose, pts: &[Point3]) -> Vec<Option<Point2>> {
        pts.iter()
            .map(|p| self.camera.project(&pose.transform_point(p)))
            .collect()
    }

    fn errors_px(&self, pose: &RawPose, image: &[Point2]) -> Vec<f64> {
        self.project(pose, &self.object)
            .into_iter()
            .zip(image)
            .map(|(p, d)| p.map_or(f64::INFINITY, |p| (p - d).norm()))
            .collect()
    }

    /// Solve the pose from image points given in model order.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, image), fields(num_points = image.len()))
    )]
    pub fn estimate(&self, image: &[Point2]) -> Result<PoseEstimate, PoseError> {
        let n = self.object.len();
        if image.len() != n {
            return Err(PoseError::WrongPointCount {
                expected: n,
                got: image.len(),
            });
        }

        let normalized: Vec<Point2> = image
            .iter()
            .enumerate()
            .map(|(index, &p)| {
                self.camera
                    .undistort_normalized(p)
                    .ok_or(PoseError::UndistortFailed { index })
            })
            .collect::<Result<_, _>>()?;
        let plane: Vec<Point2> = self.object.iter().map(|p| Point2::new(p.x, p.y)).collect();
        let threshold = self.params.reprojection_error_px;

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut best: Option<(usize, Vec<bool>)> = None;
        for _ in 0..self.params.ransac_iterations.max(1) {
            let s = sample_indices(&mut rng, n, 4);
            let src = [plane[s[0]], plane[s[1]], plane[s[2]], plane[s[3]]];
            let dst = [
                normalized[s[0]],
                normalized[s[1]],
                normalized[s[2]],
                normalized[s[3]],
            ];
            let Some(pose) = homography_from_4pt(&src, &dst).and_then(|h| pose_from_homography(&h))
            else {
                continue;
            };

            let mask: Vec<bool> = self
                .errors_px(&pose, image)
                .into_iter()
                .map(|e| e <= threshold)
                .collect();
            let count = mask.iter().filter(|&&m| m).count();
            if best.as_ref().is_none_or(|(c, _)| count > *c) {
                best = Some((count, mask));
                if count == n {
                    break;
                }
            }
        }

        let min_inliers = self.params.min_inliers.max(4);
        let (count, mask) = best.unwrap_or((0, vec![false; n]));
        if count < min_inliers {
            log::debug!("pnp consensus too small: {count} < {min_inliers}");
            return Err(PoseError::SolveFailed { inliers: count });
        }

        let pick = |v: &[Point2]| -> Vec<Point2> {
            v.iter()
                .zip(&mask)
                .filter_map(|(p, &m)| m.then_some(*p))
                .collect()
        };
        let in_plane = pick(&plane);
        let in_norm = pick(&normalized);
        let in_object: Vec<Point3> = self
            .object
            .iter()
            .zip(&mask)
            .filter_map(|(p, &m)| m.then_some(*p))
            .collect();

        let init = estimate_homography(&in_plane, &in_norm)
            .and_then(|h| pose_from_homography(&h))
            .ok_or(PoseError::SolveFailed { inliers: count })?;
        let camera_pose = refine_pose(&in_object, &in_norm, &init, self.params.refine_iterations);

        let errors = self.errors_px(&camera_pose, image);
        let inlier_mask: Vec<bool> = errors.iter().map(|&e| e <= threshold).collect();
        let (sq, used) = errors
            .iter()
            .zip(&inlier_mask)
            .filter(|(_, &m)| m)
            .fold((0.0, 0usize), |(s, k), (e, _)| (s + e * e, k + 1));
        if used < min_inliers {
            return Err(PoseError::SolveFailed { inliers: used });
        }
        let rms_px = (sq / used as f64).sqrt();

        let pose = RawPose::new(
            camera_pose.rotation,
            camera_pose.translation * self.params.coord_scale,
        );
        Ok(PoseEstimate {
            pose,
            camera_pose,
            inlier_mask,
            rms_px,
        })
    }
}
