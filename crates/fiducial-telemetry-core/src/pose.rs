use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::Point3;

/// Marker pose in camera coordinates for one frame.
///
/// `rotation` is an axis-angle (Rodrigues) vector, `translation` is expressed
/// in marker layout units times the configured coordinate scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawPose {
    pub rotation: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl RawPose {
    pub fn new(rotation: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        Rotation3::from_scaled_axis(self.rotation)
    }

    /// Map a marker-frame point into camera coordinates.
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        self.rotation_matrix() * p + self.translation
    }
}
