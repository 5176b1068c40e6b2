// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry helpers shared by the scoring, ordering and rectification
// stages. All functions are pure and operate on `f64` pixel coordinates.

use imageproc::point::Point;
use scanwerk_core::Point2;

/// Edges shorter than this are treated as zero-length.
pub const EPSILON: f64 = 1e-9;

/// Convert an integer contour point into pixel space.
pub fn to_point2(p: Point<i32>) -> Point2 {
    Point2::new(p.x as f64, p.y as f64)
}

/// Cross product of (b - a) x (c - a). Positive for a clockwise turn in
/// image coordinates (y down), negative for counter-clockwise.
pub fn cross(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Area of a simple polygon via the shoelace formula. The vertices must be
/// in boundary order (either direction).
pub fn shoelace_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area.abs() / 2.0
}

/// Mean of the given points.
pub fn centroid(points: &[Point2]) -> Point2 {
    if points.is_empty() {
        return Point2::default();
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point2::new(sx / n, sy / n)
}

/// Convex hull by Andrew's monotone chain. Collinear points are dropped.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    let mut pts: Vec<Point2> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point2> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Side lengths `(along, across)` of the minimum-area bounding rectangle,
/// found by testing every hull edge as a rectangle side.
///
/// Returns `None` when the points span no area.
pub fn min_area_rect(points: &[Point2]) -> Option<(f64, f64)> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return None;
    }

    let n = hull.len();
    let mut best: Option<(f64, f64, f64)> = None;

    for i in 0..n {
        let j = (i + 1) % n;
        let (ex, ey) = (hull[j].x - hull[i].x, hull[j].y - hull[i].y);
        let len = ex.hypot(ey);
        if len < EPSILON {
            continue;
        }
        let (ux, uy) = (ex / len, ey / len);

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for p in &hull {
            let u = p.x * ux + p.y * uy;
            let v = -p.x * uy + p.y * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let (w, h) = (max_u - min_u, max_v - min_v);
        let area = w * h;
        if best.is_none_or(|(_, _, a)| area < a) {
            best = Some((w, h, area));
        }
    }

    best.and_then(|(w, h, area)| (area > EPSILON).then_some((w, h)))
}

/// Interior angle in degrees at each vertex of a closed polygon, using the
/// dot product of the two edge vectors leaving the vertex.
///
/// Returns `None` if any edge has zero length.
pub fn interior_angles(points: &[Point2; 4]) -> Option<[f64; 4]> {
    let mut angles = [0.0; 4];
    for i in 0..4 {
        let prev = points[(i + 3) % 4];
        let cur = points[i];
        let next = points[(i + 1) % 4];

        let (ax, ay) = (prev.x - cur.x, prev.y - cur.y);
        let (bx, by) = (next.x - cur.x, next.y - cur.y);
        let la = ax.hypot(ay);
        let lb = bx.hypot(by);
        if la < EPSILON || lb < EPSILON {
            return None;
        }
        let cos = ((ax * bx + ay * by) / (la * lb)).clamp(-1.0, 1.0);
        angles[i] = cos.acos().to_degrees();
    }
    Some(angles)
}

/// True if the polygon, read in order, turns the same way at every vertex
/// and no turn is degenerate.
pub fn is_convex(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f64;
    for i in 0..n {
        let turn = cross(&points[i], &points[(i + 1) % n], &points[(i + 2) % n]);
        if turn.abs() < EPSILON {
            return false;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    true
}
