// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering and inward refinement.

use scanwerk_core::Point2;

use crate::geometry::{centroid, EPSILON};

/// Order four points as `[top-left, top-right, bottom-right, bottom-left]`.
///
/// The sum/difference rule is used first: min(x+y) is top-left, max(x+y)
/// bottom-right, max(x-y) top-right, min(x-y) bottom-left. Near 45 degrees of
/// rotation that rule can pick the same point twice; in that case the points
/// are sorted by polar angle around their centroid instead (clockwise on
/// screen) and rotated so the min(x+y) point comes first.
///
/// Inputs with fewer than four distinct points are returned unchanged.
pub fn order_corners(points: &[Point2; 4]) -> [Point2; 4] {
    if distinct_count(points) < 4 {
        return *points;
    }

    let by = |key: &dyn Fn(&Point2) -> f64, pick_max: bool| -> usize {
        let mut best = 0;
        for i in 1..4 {
            let (k, kb) = (key(&points[i]), key(&points[best]));
            if (pick_max && k > kb) || (!pick_max && k < kb) {
                best = i;
            }
        }
        best
    };
    let sum = |p: &Point2| p.x + p.y;
    let diff = |p: &Point2| p.x - p.y;

    let tl = by(&sum, false);
    let br = by(&sum, true);
    let tr = by(&diff, true);
    let bl = by(&diff, false);

    let picks = [tl, tr, br, bl];
    let unique = (0..4).all(|i| (i + 1..4).all(|j| picks[i] != picks[j]));
    if unique {
        return [points[tl], points[tr], points[br], points[bl]];
    }

    let mut sorted = sort_by_angle(points);
    let start = (0..4)
        .min_by(|&a, &b| sum(&sorted[a]).total_cmp(&sum(&sorted[b])))
        .unwrap_or(0);
    sorted.rotate_left(start);
    sorted
}

/// Points sorted by polar angle around their centroid. With y pointing down
/// this is a clockwise walk on screen.
pub fn sort_by_angle(points: &[Point2; 4]) -> [Point2; 4] {
    let c = centroid(points);
    let mut sorted = *points;
    sorted.sort_by(|a, b| {
        let ta = (a.y - c.y).atan2(a.x - c.x);
        let tb = (b.y - c.y).atan2(b.x - c.x);
        ta.total_cmp(&tb)
    });
    sorted
}

/// Pull every corner `inset` pixels toward the centroid along the line
/// joining them, never past the centroid itself. Counters edge detectors
/// firing on the shadow just outside the page.
///
/// Inputs with fewer than four distinct points are returned unchanged.
pub fn refine_corners(points: &[Point2; 4], inset: f64) -> [Point2; 4] {
    if distinct_count(points) < 4 || inset <= 0.0 {
        return *points;
    }
    let c = centroid(points);
    points.map(|p| {
        let (dx, dy) = (c.x - p.x, c.y - p.y);
        let dist = dx.hypot(dy);
        if dist < EPSILON {
            return p;
        }
        let step = inset.min(dist) / dist;
        Point2::new(p.x + dx * step, p.y + dy * step)
    })
}

fn distinct_count(points: &[Point2; 4]) -> usize {
    let mut count = 0;
    for i in 0..4 {
        if (0..i).all(|j| points[j].distance(&points[i]) > EPSILON) {
            count += 1;
        }
    }
    count
}
