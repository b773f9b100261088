use fiducial_telemetry_core::{Homography, Point2};
use serde::{Deserialize, Serialize};

/// Layout slot → detection index. Always a bijection onto the detections.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Correspondence(Vec<usize>);

impl Correspondence {
    pub(crate) fn new(map: Vec<usize>) -> Self {
        Self(map)
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Detection index matched to layout slot `slot`.
    #[inline]
    pub fn detection(&self, slot: usize) -> Option<usize> {
        self.0.get(slot).copied()
    }

    /// Reorder `detections` into layout order.
    ///
    /// Returns `None` if `detections` is not the set this map was built for.
    pub fn apply(&self, detections: &[Point2]) -> Option<Vec<Point2>> {
        if detections.len() != self.0.len() {
            return None;
        }
        self.0.iter().map(|&i| detections.get(i).copied()).collect()
    }
}

/// Output of a successful match.
#[derive(Clone, Debug)]
pub struct MatchResult {
    pub correspondence: Correspondence,
    /// Homography from raw detections (in slot order) to the layout
    /// footprint. Informational.
    pub homography: Homography,
    /// Transfer error of each slot under `homography`, in layout units.
    pub reprojection_errors: Vec<f64>,
}
