//! Pinhole camera intrinsics and the OpenCV radial-tangential distortion model.
//!
//! The camera is calibrated elsewhere; this module only consumes the result
//! (a 3x3 camera matrix plus 4, 5 or 8 distortion coefficients) and provides
//! the two mappings the tracking pipeline needs: pixel -> undistorted
//! normalized coordinates and camera-frame point -> distorted pixel.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::{Point2, Point3};

/// Errors raised when building a [`CameraModel`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("invalid camera intrinsics (fx={fx}, fy={fy}, cx={cx}, cy={cy})")]
    InvalidIntrinsics { fx: f64, fy: f64, cx: f64, cy: f64 },
    #[error("unsupported number of distortion coefficients: {0} (expected 0, 4, 5 or 8)")]
    UnsupportedDistortion(usize),
    #[error("distortion coefficients must be finite")]
    NonFiniteDistortion,
}

/// Pinhole camera intrinsics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Intrinsics {
    /// Focal length in x (pixels).
    pub fx: f64,
    /// Focal length in y (pixels).
    pub fy: f64,
    /// Principal point x (pixels).
    pub cx: f64,
    /// Principal point y (pixels).
    pub cy: f64,
}

impl Intrinsics {
    /// Read intrinsics from an OpenCV-style camera matrix (row-major).
    pub fn from_matrix(m: [[f64; 3]; 3]) -> Self {
        Self {
            fx: m[0][0],
            fy: m[1][1],
            cx: m[0][2],
            cy: m[1][2],
        }
    }

    pub fn to_matrix(self) -> [[f64; 3]; 3] {
        [
            [self.fx, 0.0, self.cx],
            [0.0, self.fy, self.cy],
            [0.0, 0.0, 1.0],
        ]
    }

    /// The camera matrix `K` as an nalgebra matrix.
    pub fn k(self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    /// Returns `true` when all values are finite and focal lengths are non-zero.
    pub fn is_valid(self) -> bool {
        self.fx.is_finite()
            && self.fy.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.fx.abs() > 1e-12
            && self.fy.abs() > 1e-12
    }

    #[inline]
    pub fn pixel_to_normalized(self, p: Point2) -> Point2 {
        Point2::new((p.x - self.cx) / self.fx, (p.y - self.cy) / self.fy)
    }

    #[inline]
    pub fn normalized_to_pixel(self, n: Point2) -> Point2 {
        Point2::new(self.fx * n.x + self.cx, self.fy * n.y + self.cy)
    }
}

/// OpenCV distortion coefficients `(k1, k2, p1, p2[, k3[, k4, k5, k6]])`.
///
/// `k4..k6` are the denominator of the rational model and stay zero for the
/// usual 4/5 coefficient calibrations.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Distortion {
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
    #[serde(default)]
    pub k4: f64,
    #[serde(default)]
    pub k5: f64,
    #[serde(default)]
    pub k6: f64,
}

impl Distortion {
    /// Build from an OpenCV coefficient vector.
    pub fn from_coeffs(coeffs: &[f64]) -> Result<Self, CameraError> {
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(CameraError::NonFiniteDistortion);
        }
        let mut d = Self::default();
        match coeffs.len() {
            0 => {}
            4 | 5 | 8 => {
                d.k1 = coeffs[0];
                d.k2 = coeffs[1];
                d.p1 = coeffs[2];
                d.p2 = coeffs[3];
                if coeffs.len() >= 5 {
                    d.k3 = coeffs[4];
                }
                if coeffs.len() == 8 {
                    d.k4 = coeffs[5];
                    d.k5 = coeffs[6];
                    d.k6 = coeffs[7];
                }
            }
            n => return Err(CameraError::UnsupportedDistortion(n)),
        }
        Ok(d)
    }

    pub fn to_coeffs(self) -> Vec<f64> {
        if self.k4 != 0.0 || self.k5 != 0.0 || self.k6 != 0.0 {
            vec![
                self.k1, self.k2, self.p1, self.p2, self.k3, self.k4, self.k5, self.k6,
            ]
        } else {
            vec![self.k1, self.k2, self.p1, self.p2, self.k3]
        }
    }

    pub fn is_zero(self) -> bool {
        self == Self::default()
    }

    /// Radial gain at squared radius `r2` (`None` if the rational model degenerates).
    #[inline]
    fn radial(self, r2: f64) -> Option<f64> {
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        let num = 1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;
        let den = 1.0 + self.k4 * r2 + self.k5 * r4 + self.k6 * r6;
        if den.abs() < 1e-12 {
            return None;
        }
        let g = num / den;
        g.is_finite().then_some(g)
    }

    #[inline]
    fn tangential(self, x: f64, y: f64, r2: f64) -> (f64, f64) {
        (
            2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x),
            self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y,
        )
    }

    /// Apply distortion to normalized coordinates.
    pub fn distort(self, n: Point2) -> Option<Point2> {
        let r2 = n.x * n.x + n.y * n.y;
        let g = self.radial(r2)?;
        let (dx, dy) = self.tangential(n.x, n.y, r2);
        Some(Point2::new(n.x * g + dx, n.y * g + dy))
    }
}

/// Distortion inversion settings used by iterative undistortion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UndistortConfig {
    /// Maximum fixed-point iterations.
    pub max_iters: usize,
    /// Stop when the coordinate update norm is below this threshold.
    pub eps: f64,
}

impl Default for UndistortConfig {
    fn default() -> Self {
        Self {
            max_iters: 20,
            eps: 1e-12,
        }
    }
}

/// Complete camera model (intrinsics + distortion).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraModel {
    intrinsics: Intrinsics,
    distortion: Distortion,
}

impl CameraModel {
    pub fn new(intrinsics: Intrinsics, distortion: Distortion) -> Result<Self, CameraError> {
        if !intrinsics.is_valid() {
            return Err(CameraError::InvalidIntrinsics {
                fx: intrinsics.fx,
                fy: intrinsics.fy,
                cx: intrinsics.cx,
                cy: intrinsics.cy,
            });
        }
        Ok(Self {
            intrinsics,
            distortion,
        })
    }

    /// Distortion-free pinhole camera.
    pub fn pinhole(intrinsics: Intrinsics) -> Result<Self, CameraError> {
        Self::new(intrinsics, Distortion::default())
    }

    #[inline]
    pub fn intrinsics(&self) -> Intrinsics {
        self.intrinsics
    }

    #[inline]
    pub fn distortion(&self) -> Distortion {
        self.distortion
    }

    /// Map a distorted pixel to undistorted normalized coordinates.
    pub fn undistort_normalized(&self, pixel: Point2) -> Option<Point2> {
        self.undistort_normalized_with(pixel, UndistortConfig::default())
    }

    /// Like [`CameraModel::undistort_normalized`] with explicit iteration settings.
    pub fn undistort_normalized_with(&self, pixel: Point2, cfg: UndistortConfig) -> Option<Point2> {
        let xd = self.intrinsics.pixel_to_normalized(pixel);
        if self.distortion.is_zero() {
            return Some(xd);
        }

        let mut x = xd.x;
        let mut y = xd.y;
        for _ in 0..cfg.max_iters.max(1) {
            let r2 = x * x + y * y;
            let g = self.distortion.radial(r2)?;
            if g.abs() < 1e-12 {
                return None;
            }
            let (dx, dy) = self.distortion.tangential(x, y, r2);
            let x_next = (xd.x - dx) / g;
            let y_next = (xd.y - dy) / g;
            if !x_next.is_finite() || !y_next.is_finite() {
                return None;
            }

            let step = ((x_next - x).powi(2) + (y_next - y).powi(2)).sqrt();
            x = x_next;
            y = y_next;
            if step <= cfg.eps.max(0.0) {
                break;
            }
        }
        Some(Point2::new(x, y))
    }

    /// Map a distorted pixel to an undistorted pixel (same intrinsics).
    pub fn undistort_pixel(&self, pixel: Point2) -> Option<Point2> {
        self.undistort_normalized(pixel)
            .map(|n| self.intrinsics.normalized_to_pixel(n))
    }

    /// Distort undistorted normalized coordinates into an image pixel.
    pub fn normalized_to_pixel(&self, n: Point2) -> Option<Point2> {
        let d = self.distortion.distort(n)?;
        let p = self.intrinsics.normalized_to_pixel(d);
        (p.x.is_finite() && p.y.is_finite()).then_some(p)
    }

    /// Project a point given in camera coordinates. Points behind the camera
    /// (or on the image plane) have no projection.
    pub fn project(&self, p: &Point3) -> Option<Point2> {
        if p.z <= 1e-12 {
            return None;
        }
        self.normalized_to_pixel(Point2::new(p.x / p.z, p.y / p.z))
    }

    /// Serializable calibration artifact for this model.
    pub fn to_calibration(&self) -> CameraCalibration {
        CameraCalibration {
            matrix: self.intrinsics.to_matrix(),
            distortion: self.distortion.to_coeffs(),
        }
    }
}

/// Camera calibration artifact as produced by an OpenCV-style calibration
/// (`mtx` + `dist`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraCalibration {
    /// Row-major 3x3 camera matrix.
    pub matrix: [[f64; 3]; 3],
    /// Distortion coefficients, OpenCV order.
    #[serde(default)]
    pub distortion: Vec<f64>,
}

impl TryFrom<&CameraCalibration> for CameraModel {
    type Error = CameraError;

    fn try_from(cal: &CameraCalibration) -> Result<Self, Self::Error> {
        CameraModel::new(
            Intrinsics::from_matrix(cal.matrix),
            Distortion::from_coeffs(&cal.distortion)?,
        )
    }
}
