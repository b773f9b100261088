//! Small planar geometry helpers shared by the blob detector and the matcher.

use crate::Point2;

/// Spatial moments of a closed polygon (Green's theorem).
///
/// `m00` is the unsigned area; `m10`/`m01` carry the matching sign so that
/// `m10 / m00` is the centroid regardless of the polygon winding.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    /// Area centroid, or `None` for a degenerate (zero area) polygon.
    pub fn centroid(&self) -> Option<Point2> {
        if self.m00.abs() <= f64::EPSILON {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Moments of the polygon traced by `pts` (closing edge implied).
pub fn polygon_moments<I>(pts: I) -> PolygonMoments
where
    I: IntoIterator<Item = Point2>,
    I::IntoIter: Clone,
{
    let it = pts.into_iter();
    let first = it.clone().next();
    let Some(first) = first else {
        return PolygonMoments::default();
    };

    let mut a = 0.0;
    let mut mx = 0.0;
    let mut my = 0.0;
    let mut prev: Option<Point2> = None;
    for p in it.chain(std::iter::once(first)) {
        if let Some(q) = prev {
            let cross = q.x * p.y - p.x * q.y;
            a += cross;
            mx += (q.x + p.x) * cross;
            my += (q.y + p.y) * cross;
        }
        prev = Some(p);
    }

    let sign = if a < 0.0 { -1.0 } else { 1.0 };
    PolygonMoments {
        m00: sign * a / 2.0,
        m10: sign * mx / 6.0,
        m01: sign * my / 6.0,
    }
}

/// Area centroid of a polygon; falls back to the vertex mean when the polygon
/// has no area.
pub fn polygon_centroid(pts: &[Point2]) -> Option<Point2> {
    if pts.is_empty() {
        return None;
    }
    polygon_moments(pts.iter().copied())
        .centroid()
        .or_else(|| {
            let n = pts.len() as f64;
            let (sx, sy) = pts.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            Some(Point2::new(sx / n, sy / n))
        })
}

fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Indices of the convex hull vertices of `pts`, counter-clockwise in the
/// x-right / y-up convention (positive signed area).
///
/// Collinear points on hull edges are not reported. The hull starts at the
/// point with the smallest `x` (smallest `y` on ties).
pub fn convex_hull_indices(pts: &[Point2]) -> Vec<usize> {
    let n = pts.len();
    if n < 3 {
        return (0..n).collect();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        pts[a]
            .x
            .total_cmp(&pts[b].x)
            .then_with(|| pts[a].y.total_cmp(&pts[b].y))
    });

    // Andrew's monotone chain.
    let mut hull: Vec<usize> = Vec::with_capacity(2 * n);
    for &i in &order {
        while hull.len() >= 2
            && cross(pts[hull[hull.len() - 2]], pts[hull[hull.len() - 1]], pts[i]) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(pts[hull[hull.len() - 2]], pts[hull[hull.len() - 1]], pts[i]) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }
    hull.pop();
    hull
}

/// Index of the point nearest to `target` within `max_dist` (inclusive).
///
/// Ties keep the lowest index.
pub fn find_in_proximity(pts: &[Point2], target: Point2, max_dist: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in pts.iter().enumerate() {
        let d = (p - target).norm();
        if d > max_dist {
            continue;
        }
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}
