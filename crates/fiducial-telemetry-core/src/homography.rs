use nalgebra::{DMatrix, Matrix3, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

use crate::{sample_indices, Point2};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    #[inline]
    pub fn apply(&self, p: Point2) -> Point2 {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0] / v[2], v[1] / v[2])
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Euclidean transfer error `|H * src - dst|`.
    #[inline]
    pub fn transfer_error(&self, src: Point2, dst: Point2) -> f64 {
        let p = self.apply(src);
        let e = (p - dst).norm();
        if e.is_finite() {
            e
        } else {
            f64::INFINITY
        }
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points(pts: &[Point2]) -> (Vec<Point2>, Matrix3<f64>) {
    // Hartley normalization: translate to centroid, scale so mean distance = sqrt(2)
    let n = pts.len() as f64;
    let (mut cx, mut cy) = (0.0, 0.0);
    for p in pts {
        cx += p.x;
        cy += p.y;
    }
    cx /= n;
    cy /= n;

    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    let t = hartley_normalization(cx, cy, mean_dist);
    let out = pts
        .iter()
        .map(|p| {
            let v = t * Vector3::new(p.x, p.y, 1.0);
            Point2::new(v[0], v[1])
        })
        .collect();
    (out, t)
}

fn normalize_homography(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 || !s.is_finite() {
        return None;
    }
    Some(h / s)
}

fn denormalize_homography(
    hn: Matrix3<f64>,
    t_src: Matrix3<f64>,
    t_dst: Matrix3<f64>,
) -> Option<Matrix3<f64>> {
    let t_dst_inv = t_dst.try_inverse()?;
    Some(t_dst_inv * hn * t_src)
}

/// Estimate H such that `dst ~ H * src` from 4 or more correspondences (DLT).
pub fn estimate_homography(src: &[Point2], dst: &[Point2]) -> Option<Homography> {
    if src.len() != dst.len() || src.len() < 4 {
        return None;
    }

    if src.len() == 4 {
        let s: &[Point2; 4] = src.try_into().ok()?;
        let d: &[Point2; 4] = dst.try_into().ok()?;
        return homography_from_4pt(s, d);
    }

    let (r, tr) = normalize_points(src);
    let (i, ti) = normalize_points(dst);

    // Build A (2N x 9)
    let n = src.len();
    let mut a = DMatrix::<f64>::zeros(2 * n, 9);

    for k in 0..n {
        let x = r[k].x;
        let y = r[k].y;
        let u = i[k].x;
        let v = i[k].y;

        // [ -x -y -1   0  0  0   u*x u*y u ]
        a[(2 * k, 0)] = -x;
        a[(2 * k, 1)] = -y;
        a[(2 * k, 2)] = -1.0;
        a[(2 * k, 6)] = u * x;
        a[(2 * k, 7)] = u * y;
        a[(2 * k, 8)] = u;

        // [ 0  0  0  -x -y -1   v*x v*y v ]
        a[(2 * k + 1, 3)] = -x;
        a[(2 * k + 1, 4)] = -y;
        a[(2 * k + 1, 5)] = -1.0;
        a[(2 * k + 1, 6)] = v * x;
        a[(2 * k + 1, 7)] = v * y;
        a[(2 * k + 1, 8)] = v;
    }

    // Solve Ah = 0 -> h is the right singular vector with the smallest
    // singular value. nalgebra's thin SVD of a 2N x 9 matrix keeps all nine.
    let svd = a.svd(false, true);
    let vt = svd.v_t?;
    let (min_idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    let h = vt.row(min_idx);

    let hn =
        Matrix3::<f64>::from_row_slice(&[h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]]);

    // Denormalize: H = Ti^{-1} * Hn * Tr
    let h_den = denormalize_homography(hn, tr, ti)?;
    let h_den = normalize_homography(h_den)?;

    Some(Homography::new(h_den))
}

/// Compute H such that `dst ~ H * src` from exactly 4 correspondences.
///
/// Point order must be consistent between `src` and `dst`. Returns `None`
/// for degenerate (e.g. three collinear) configurations.
pub fn homography_from_4pt(src: &[Point2; 4], dst: &[Point2; 4]) -> Option<Homography> {
    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1
    // h11 x + h12 y + h13 - u h31 x - u h32 y = u
    // h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let (src_n, t_src) = normalize_points(src);
    let (dst_n, t_dst) = normalize_points(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let x = src_n[k].x;
        let y = src_n[k].y;
        let u = dst_n[k].x;
        let v = dst_n[k].y;

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h_den = denormalize_homography(hn, t_src, t_dst)?;
    let h_den = normalize_homography(h_den)?;

    Some(Homography::new(h_den))
}

/// Settings for [`fit_homography_ransac`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RansacParams {
    /// Maximum transfer error (in `dst` units) for a correspondence to count as inlier.
    pub threshold: f64,
    pub max_iters: usize,
    /// Stop early once this fraction of correspondences are inliers.
    pub stop_inlier_ratio: f64,
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            max_iters: 2000,
            stop_inlier_ratio: 0.995,
            seed: 0x5EED_F1DC,
        }
    }
}

/// Result of a robust homography fit.
#[derive(Clone, Debug, PartialEq)]
pub struct HomographyFit {
    pub homography: Homography,
    /// `true` for correspondences within the threshold of the final model.
    pub inlier_mask: Vec<bool>,
    /// Transfer error of every correspondence under the final model.
    pub errors: Vec<f64>,
}

impl HomographyFit {
    pub fn num_inliers(&self) -> usize {
        self.inlier_mask.iter().filter(|&&m| m).count()
    }

    pub fn outliers(&self) -> impl Iterator<Item = usize> + '_ {
        self.inlier_mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| (!m).then_some(i))
    }
}

fn score(h: &Homography, src: &[Point2], dst: &[Point2], threshold: f64) -> (Vec<f64>, Vec<bool>) {
    let errors: Vec<f64> = src
        .iter()
        .zip(dst)
        .map(|(&s, &d)| h.transfer_error(s, d))
        .collect();
    let mask = errors.iter().map(|&e| e <= threshold).collect();
    (errors, mask)
}

/// Robust homography `dst ~ H * src` with 4-point RANSAC, refit on the best
/// consensus set. The returned mask is evaluated on the refit model.
pub fn fit_homography_ransac(
    src: &[Point2],
    dst: &[Point2],
    params: &RansacParams,
) -> Option<HomographyFit> {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let n = src.len();
    if n != dst.len() || n < 4 {
        return None;
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<(usize, Vec<bool>)> = None;

    for _ in 0..params.max_iters.max(1) {
        let sample = sample_indices(&mut rng, n, 4);
        let s = [src[sample[0]], src[sample[1]], src[sample[2]], src[sample[3]]];
        let d = [dst[sample[0]], dst[sample[1]], dst[sample[2]], dst[sample[3]]];
        let Some(h) = homography_from_4pt(&s, &d) else {
            continue;
        };

        let (_, mask) = score(&h, src, dst, params.threshold);
        let count = mask.iter().filter(|&&m| m).count();
        if best.as_ref().is_none_or(|(c, _)| count > *c) {
            let done = count as f64 >= params.stop_inlier_ratio * n as f64;
            best = Some((count, mask));
            if done {
                break;
            }
        }
    }

    let (count, mask) = best?;
    if count < 4 {
        return None;
    }

    let (in_src, in_dst): (Vec<Point2>, Vec<Point2>) = src
        .iter()
        .zip(dst)
        .zip(&mask)
        .filter(|(_, &m)| m)
        .map(|((&s, &d), _)| (s, d))
        .unzip();
    let homography = estimate_homography(&in_src, &in_dst)?;
    let (errors, inlier_mask) = score(&homography, src, dst, params.threshold);

    Some(HomographyFit {
        homography,
        inlier_mask,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point2, b: Point2, tol: f64) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    fn ground_truth() -> Homography {
        Homography::new(Matrix3::new(
            1.0, 0.2, 12.0, //
            -0.1, 0.9, 6.0, //
            0.0006, 0.0004, 1.0,
        ))
    }

    fn grid() -> Vec<Point2> {
        (0..4)
            .flat_map(|y| (0..4).map(move |x| Point2::new(x as f64 * 40.0, y as f64 * 50.0)))
            .collect()
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.2, 0.1, 5.0, //
            -0.05, 0.9, 3.0, //
            0.001, 0.0005, 1.0,
        ));
        let inv = h.inverse().expect("invertible");

        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(50.0, -20.0),
            Point2::new(320.0, 200.0),
        ] {
            assert_close(inv.apply(h.apply(p)), p, 1e-9);
        }
    }

    #[test]
    fn four_point_specialization_recovers_h() {
        let gt = ground_truth();
        let rect = [
            Point2::new(0.0, 0.0),
            Point2::new(180.0, 0.0),
            Point2::new(180.0, 130.0),
            Point2::new(0.0, 130.0),
        ];
        let dst = rect.map(|p| gt.apply(p));
        let recovered = homography_from_4pt(&rect, &dst).expect("recoverable");

        for p in [Point2::new(60.0, 40.0), Point2::new(150.0, 120.0)] {
            assert_close(recovered.apply(p), gt.apply(p), 1e-6);
        }
    }

    #[test]
    fn dlt_handles_overdetermined_case() {
        let gt = ground_truth();
        let src = grid();
        let dst: Vec<Point2> = src.iter().map(|&p| gt.apply(p)).collect();

        let estimated = estimate_homography(&src, &dst).expect("estimate");
        for p in [Point2::new(60.0, 40.0), Point2::new(80.0, 100.0)] {
            assert_close(estimated.apply(p), gt.apply(p), 1e-6);
        }
    }

    #[test]
    fn mismatched_input_lengths_fail() {
        let src = [Point2::new(0.0, 0.0); 4];
        let dst = [Point2::new(1.0, 1.0); 3];
        assert!(estimate_homography(&src, &dst).is_none());
    }

    #[test]
    fn ransac_flags_a_gross_outlier() {
        let gt = ground_truth();
        let src = grid();
        let mut dst: Vec<Point2> = src.iter().map(|&p| gt.apply(p)).collect();
        dst[5].x += 80.0;

        let params = RansacParams {
            threshold: 2.0,
            ..RansacParams::default()
        };
        let fit = fit_homography_ransac(&src, &dst, &params).expect("fit");
        assert_eq!(fit.outliers().collect::<Vec<_>>(), vec![5]);
        assert_eq!(fit.num_inliers(), 15);
        assert_close(fit.homography.apply(src[0]), gt.apply(src[0]), 1e-6);
    }
}
