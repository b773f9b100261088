use super::{Correspondence, MatchError, MatchParams, MatchResult};
use crate::layout::{ReferenceLayout, LONELY_OFFSET, RADIAL_PREDICTION_SCALE};
use fiducial_telemetry_core::{
    convex_hull_indices, find_in_proximity, fit_homography_ransac, polygon_centroid, CameraModel,
    Point2, RansacParams,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Structural matcher for one marker layout and camera.
///
/// Holds configuration only; `match_points` takes `&self`.
#[derive(Clone, Debug)]
pub struct PatternMatcher {
    layout: ReferenceLayout,
    camera: CameraModel,
    params: MatchParams,
}

impl PatternMatcher {
    pub fn new(layout: ReferenceLayout, camera: CameraModel, params: MatchParams) -> Self {
        Self {
            layout,
            camera,
            params,
        }
    }

    #[inline]
    pub fn layout(&self) -> &ReferenceLayout {
        &self.layout
    }

    #[inline]
    pub fn camera(&self) -> &CameraModel {
        &self.camera
    }

    #[inline]
    pub fn params(&self) -> &MatchParams {
        &self.params
    }

    /// Match unordered detections to the layout.
    ///
    /// Every check fails fast; no partial correspondence is returned.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, points), fields(num_points = points.len()))
    )]
    pub fn match_points(&self, points: &[Point2]) -> Result<MatchResult, MatchError> {
        let n = self.layout.len();
        if points.len() != n {
            return Err(MatchError::WrongPointCount {
                expected: n,
                got: points.len(),
            });
        }

        let pts = self.undistort(points)?;
        let radius = self.params.proximity_radius;

        let hull = convex_hull_indices(&pts);
        let hull_len = self.layout.hull_len();
        if hull.len() != hull_len {
            return Err(MatchError::HullSizeMismatch {
                expected: hull_len,
                got: hull.len(),
            });
        }

        let hull_pts: Vec<Point2> = hull.iter().map(|&i| pts[i]).collect();
        let center = polygon_centroid(&hull_pts)
            .and_then(|c| find_in_proximity(&pts, c, radius))
            .ok_or(MatchError::CenterNotFound { radius })?;

        let mut on_hull = vec![false; n];
        for &i in &hull {
            on_hull[i] = true;
        }
        let rest: Vec<usize> = (0..n).filter(|&i| i != center && !on_hull[i]).collect();
        let expected_rest = n - 1 - hull_len;
        if rest.len() != expected_rest {
            return Err(MatchError::RestPointCountMismatch {
                expected: expected_rest,
                got: rest.len(),
            });
        }

        // hull position each rest point points at
        let mut pairs = Vec::with_capacity(rest.len());
        for &r in &rest {
            let prediction = pts[center] + (pts[r] - pts[center]) * RADIAL_PREDICTION_SCALE;
            let pos = find_in_proximity(&pts, prediction, radius)
                .and_then(|hit| hull.iter().position(|&h| h == hit))
                .ok_or(MatchError::RelationshipNotFound { point: r })?;
            pairs.push(pos);
        }

        let lonely = pairs
            .iter()
            .take(3)
            .map(|&p| (p + hull_len - LONELY_OFFSET) % hull_len)
            .find(|candidate| !pairs.contains(candidate))
            .ok_or(MatchError::OrientationAmbiguous)?;

        let start = (lonely + hull_len / 2) % hull_len;

        let mut map = Vec::with_capacity(n);
        map.push(center);
        map.extend((0..hull_len).map(|k| hull[(start + k) % hull_len]));
        for (slot, &canonical) in self.layout.radial_slots().iter().enumerate() {
            let pos = (canonical + start) % hull_len;
            let j = pairs
                .iter()
                .position(|&p| p == pos)
                .ok_or(MatchError::RadialSlotUnpaired { slot })?;
            map.push(rest[j]);
        }

        let src: Vec<Point2> = map.iter().map(|&i| points[i]).collect();
        let ransac = RansacParams {
            threshold: self.params.reprojection_threshold,
            max_iters: self.params.ransac_max_iters,
            seed: self.params.ransac_seed,
            ..RansacParams::default()
        };
        let fit = fit_homography_ransac(&src, self.layout.points(), &ransac)
            .ok_or(MatchError::HomographyFailed)?;
        let outliers: Vec<usize> = fit.outliers().collect();
        if let Some(&first) = outliers.first() {
            return Err(MatchError::ReprojectionExceeded {
                outliers: outliers.len(),
                first,
            });
        }

        log::trace!("matched {} points, lonely hull position {}", n, lonely);
        Ok(MatchResult {
            correspondence: Correspondence::new(map),
            homography: fit.homography,
            reprojection_errors: fit.errors,
        })
    }

    fn undistort(&self, points: &[Point2]) -> Result<Vec<Point2>, MatchError> {
        let scale = self.params.undistort_scale;
        points
            .iter()
            .enumerate()
            .map(|(index, &p)| {
                self.camera
                    .undistort_normalized(p)
                    .map(|u| Point2::from(u.coords * scale))
                    .ok_or(MatchError::UndistortFailed { index })
            })
            .collect()
    }
}
