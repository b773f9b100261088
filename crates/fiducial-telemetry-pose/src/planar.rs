//! Planar pose primitives.

use fiducial_telemetry_core::{Homography, Point2, Point3, RawPose};
use nalgebra::{Matrix3, Matrix6, Rotation3, Vector3, Vector6};

/// Decompose a plane-to-normalized-image homography `H ~ [r1 r2 t]` into a
/// pose with the marker in front of the camera.
///
/// The rotation is projected onto SO(3) with an SVD.
pub fn pose_from_homography(h: &Homography) -> Option<RawPose> {
    let h1 = h.h.column(0).into_owned();
    let h2 = h.h.column(1).into_owned();
    let h3 = h.h.column(2).into_owned();

    let norm = h1.norm() + h2.norm();
    if !norm.is_finite() || norm <= 1e-12 {
        return None;
    }
    let mut lambda = 2.0 / norm;
    if h3.z * lambda < 0.0 {
        lambda = -lambda;
    }

    let r1 = h1 * lambda;
    let r2 = h2 * lambda;
    let r3 = r1.cross(&r2);
    let approx = Matrix3::from_columns(&[r1, r2, r3]);

    let svd = approx.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        r = u * Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0)) * v_t;
    }

    let rotation = Rotation3::from_matrix_unchecked(r).scaled_axis();
    let translation = h3 * lambda;
    rotation
        .iter()
        .chain(translation.iter())
        .all(|v| v.is_finite())
        .then(|| RawPose::new(rotation, translation))
}

fn residuals(object: &[Point3], normalized: &[Point2], p: &Vector6<f64>) -> Option<Vec<f64>> {
    let rot = Rotation3::from_scaled_axis(Vector3::new(p[0], p[1], p[2]));
    let t = Vector3::new(p[3], p[4], p[5]);
    let mut out = Vec::with_capacity(2 * object.len());
    for (o, u) in object.iter().zip(normalized) {
        let c = rot * o.coords + t;
        if c.z <= 1e-12 {
            return None;
        }
        out.push(c.x / c.z - u.x);
        out.push(c.y / c.z - u.y);
    }
    Some(out)
}

fn sum_sq(r: &[f64]) -> f64 {
    r.iter().map(|v| v * v).sum()
}

/// Levenberg–Marquardt refinement of `init` on the normalized reprojection
/// error. Returns `init` unchanged if no step improves the cost.
pub fn refine_pose(
    object: &[Point3],
    normalized: &[Point2],
    init: &RawPose,
    max_iters: usize,
) -> RawPose {
    let mut p = Vector6::new(
        init.rotation.x,
        init.rotation.y,
        init.rotation.z,
        init.translation.x,
        init.translation.y,
        init.translation.z,
    );
    let Some(mut res) = residuals(object, normalized, &p) else {
        return *init;
    };
    let mut cost = sum_sq(&res);
    let mut mu = 1e-3;

    for _ in 0..max_iters {
        if cost <= 1e-24 {
            break;
        }

        // forward-difference Jacobian
        let mut jac = vec![Vector6::<f64>::zeros(); res.len()];
        for k in 0..6 {
            let step = 1e-7 * p[k].abs().max(1.0);
            let mut q = p;
            q[k] += step;
            let Some(rq) = residuals(object, normalized, &q) else {
                return pose_of(&p);
            };
            for (row, (a, b)) in jac.iter_mut().zip(rq.iter().zip(&res)) {
                row[k] = (a - b) / step;
            }
        }

        let mut jtj = Matrix6::<f64>::zeros();
        let mut jtr = Vector6::<f64>::zeros();
        for (row, &r) in jac.iter().zip(&res) {
            jtj += row * row.transpose();
            jtr += row * r;
        }

        let mut improved = false;
        while mu < 1e10 {
            let mut a = jtj;
            for i in 0..6 {
                a[(i, i)] += mu * (jtj[(i, i)] + 1e-12);
            }
            let Some(delta) = a.lu().solve(&(-jtr)) else {
                mu *= 10.0;
                continue;
            };
            let cand = p + delta;
            match residuals(object, normalized, &cand) {
                Some(rc) if sum_sq(&rc) < cost => {
                    p = cand;
                    cost = sum_sq(&rc);
                    res = rc;
                    mu = (mu * 0.1).max(1e-12);
                    improved = delta.norm() > 1e-14;
                    break;
                }
                _ => mu *= 10.0,
            }
        }
        if !improved {
            break;
        }
    }

    pose_of(&p)
}

fn pose_of(p: &Vector6<f64>) -> RawPose {
    RawPose::new(Vector3::new(p[0], p[1], p[2]), Vector3::new(p[3], p[4], p[5]))
}
