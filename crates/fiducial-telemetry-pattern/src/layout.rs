//! Marker reference layout.
//!
//! Default marker, image axes (y down), radius `R`:
//!
//! ```text
//!              4
//!        3           5
//!    2         15        6
//!
//!  1     14    0          7
//!
//!    12        13       8
//!        11          9
//!              10
//! ```
//!
//! Point 0 is the center, 1..=12 the hull ring, 13..=15 the radial points
//! halfway between the center and hull points 10, 1 and 4.

use fiducial_telemetry_core::{convex_hull_indices, Point2, Point3};
use serde::{Deserialize, Serialize};

/// Number of interior radial points.
pub const RADIAL_POINTS: usize = 3;
/// A radial point predicts its hull partner at `center + 2 (r - center)`.
pub const RADIAL_PREDICTION_SCALE: f64 = 2.0;
/// Hull steps taken backward from a paired hull point to find the anchor.
pub const LONELY_OFFSET: usize = 3;

const MIN_HULL_POINTS: usize = 2 * LONELY_OFFSET;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout needs at least {min} points, got {got}")]
    TooFewPoints { min: usize, got: usize },
    #[error("layout contains non-finite coordinates")]
    NonFinite,
    #[error("points 1..={hull_len} are not the counter-clockwise convex hull of the layout")]
    HullOrder { hull_len: usize },
    #[error("radial points do not pair with distinct hull points")]
    RadialSlotsAmbiguous,
    #[error("radial pairing does not single out hull point 1 as the orientation origin")]
    OrientationAmbiguous,
}

/// Ordered marker geometry: center, hull ring, radial points. Immutable once
/// built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutSpec", into = "LayoutSpec")]
pub struct ReferenceLayout {
    points: Vec<Point2>,
    hull_len: usize,
    radial_slots: [usize; RADIAL_POINTS],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct LayoutSpec {
    points: Vec<[f64; 2]>,
}

impl TryFrom<LayoutSpec> for ReferenceLayout {
    type Error = LayoutError;

    fn try_from(spec: LayoutSpec) -> Result<Self, Self::Error> {
        Self::from_points(spec.points.into_iter().map(|[x, y]| Point2::new(x, y)).collect())
    }
}

impl From<ReferenceLayout> for LayoutSpec {
    fn from(layout: ReferenceLayout) -> Self {
        Self {
            points: layout.points.iter().map(|p| [p.x, p.y]).collect(),
        }
    }
}

fn ring_points(radius: f64) -> Vec<Point2> {
    let hull = |k: usize| {
        let phi = ((k - 1) as f64 * 30.0).to_radians();
        Point2::new(-radius * phi.cos(), -radius * phi.sin())
    };
    let half = |k: usize| Point2::from(hull(k).coords * 0.5);

    let mut pts = Vec::with_capacity(16);
    pts.push(Point2::origin());
    pts.extend((1..=12).map(hull));
    pts.extend([half(10), half(1), half(4)]);
    pts
}

impl ReferenceLayout {
    /// Validate an ordered layout: `points[0]` is the center, then the hull
    /// ring, then [`RADIAL_POINTS`] radial points.
    ///
    /// The hull must be numbered counter-clockwise (positive signed area)
    /// and the radial pairing must determine the hull orientation no matter
    /// in which order the radial points are visited.
    pub fn from_points(points: Vec<Point2>) -> Result<Self, LayoutError> {
        let min = 1 + MIN_HULL_POINTS + RADIAL_POINTS;
        if points.len() < min {
            return Err(LayoutError::TooFewPoints {
                min,
                got: points.len(),
            });
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(LayoutError::NonFinite);
        }

        let hull_len = points.len() - 1 - RADIAL_POINTS;
        let hull = convex_hull_indices(&points);
        let in_order = hull.len() == hull_len
            && hull.iter().position(|&i| i == 1).is_some_and(|s| {
                (0..hull_len).all(|k| hull[(s + k) % hull_len] == 1 + k)
            });
        if !in_order {
            return Err(LayoutError::HullOrder { hull_len });
        }

        let center = points[0];
        let mut radial_slots = [0; RADIAL_POINTS];
        for (slot, r) in radial_slots.iter_mut().zip(&points[1 + hull_len..]) {
            let prediction = center + (*r - center) * RADIAL_PREDICTION_SCALE;
            *slot = (0..hull_len)
                .min_by(|&a, &b| {
                    let da = (points[1 + a] - prediction).norm();
                    let db = (points[1 + b] - prediction).norm();
                    da.total_cmp(&db)
                })
                .ok_or(LayoutError::RadialSlotsAmbiguous)?;
        }
        for i in 0..RADIAL_POINTS {
            if radial_slots[i + 1..].contains(&radial_slots[i]) {
                return Err(LayoutError::RadialSlotsAmbiguous);
            }
        }

        // Every anchor the matcher may pick must rotate back onto hull slot 0.
        let anchors: Vec<usize> = radial_slots
            .iter()
            .map(|&s| (s + hull_len - LONELY_OFFSET) % hull_len)
            .filter(|c| !radial_slots.contains(c))
            .collect();
        if anchors.is_empty() || anchors.iter().any(|&a| (a + hull_len / 2) % hull_len != 0) {
            return Err(LayoutError::OrientationAmbiguous);
        }

        Ok(Self {
            points,
            hull_len,
            radial_slots,
        })
    }

    /// The default 16-point ring marker with hull radius `radius`.
    pub fn ring_marker(radius: f64) -> Result<Self, LayoutError> {
        Self::from_points(ring_points(radius))
    }

    /// Total number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn hull_len(&self) -> usize {
        self.hull_len
    }

    /// Index of the center point.
    #[inline]
    pub fn center_index(&self) -> usize {
        0
    }

    /// Layout indices of the hull ring, in order.
    pub fn hull_indices(&self) -> std::ops::Range<usize> {
        1..1 + self.hull_len
    }

    /// Layout indices of the radial points.
    pub fn radial_indices(&self) -> std::ops::Range<usize> {
        1 + self.hull_len..self.points.len()
    }

    /// For each radial point, the hull position (0-based within the ring) it
    /// points at.
    #[inline]
    pub fn radial_slots(&self) -> &[usize; RADIAL_POINTS] {
        &self.radial_slots
    }

    /// Planar footprint of the marker.
    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// The footprint lifted to the `z = 0` plane.
    pub fn points3d(&self) -> Vec<Point3> {
        self.points.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect()
    }
}

impl Default for ReferenceLayout {
    fn default() -> Self {
        Self {
            points: ring_points(100.0),
            hull_len: 12,
            radial_slots: [9, 0, 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn default_layout_validates_to_itself() {
        let def = ReferenceLayout::default();
        let built = ReferenceLayout::ring_marker(100.0).expect("valid");
        assert_eq!(built, def);
        assert_eq!(def.len(), 16);
        assert_eq!(def.radial_slots(), &[9, 0, 3]);
        assert_eq!(def.hull_indices(), 1..13);
        assert_eq!(def.radial_indices(), 13..16);
    }

    #[test]
    fn default_geometry_matches_diagram() {
        let pts = ReferenceLayout::default().points().to_vec();
        // 1 west, 4 top (y down), 7 east, 10 bottom
        assert_abs_diff_eq!(pts[1].x, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[4].y, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[7].x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[10].y, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[13].y, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[14].x, -50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pts[15].y, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn lonely_anchor_is_three_steps_behind_the_unpaired_slot() {
        assert_eq!(LONELY_OFFSET, 3);
        let slots = ReferenceLayout::default().radial_slots().to_owned();
        let anchors: Vec<usize> = slots
            .iter()
            .map(|&s| (s + 12 - LONELY_OFFSET) % 12)
            .filter(|c| !slots.contains(c))
            .collect();
        // hull slot 6 is point 7; the canonical start opposite it is point 1
        assert_eq!(anchors, vec![6]);
        assert_eq!((anchors[0] + 6) % 12, 0);
    }

    #[test]
    fn clockwise_numbering_is_rejected() {
        let mut pts = ReferenceLayout::default().points().to_vec();
        pts[1..13].reverse();
        assert_eq!(
            ReferenceLayout::from_points(pts),
            Err(LayoutError::HullOrder { hull_len: 12 })
        );
    }

    #[test]
    fn symmetric_radials_are_rejected() {
        // radials toward hull points 1, 4, 7, 10 would need 4 slots; three
        // evenly spread ones leave no unique anchor
        let mut pts = ReferenceLayout::default().points().to_vec();
        let half = |k: usize| Point2::from(pts[k].coords * 0.5);
        let (a, b, c) = (half(1), half(5), half(9));
        pts[13] = a;
        pts[14] = b;
        pts[15] = c;
        assert_eq!(
            ReferenceLayout::from_points(pts),
            Err(LayoutError::OrientationAmbiguous)
        );
    }

    #[test]
    fn json_round_trip_validates() {
        let json = serde_json::to_string(&ReferenceLayout::default()).expect("serialize");
        let back: ReferenceLayout = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.radial_slots(), &[9, 0, 3]);

        let bad = r#"{ "points": [[0, 0], [1, 0], [0, 1]] }"#;
        assert!(serde_json::from_str::<ReferenceLayout>(bad).is_err());
    }
}
