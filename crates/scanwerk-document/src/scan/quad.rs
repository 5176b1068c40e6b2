// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral filter: reduce raw contours to 4-vertex candidates.

use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use scanwerk_core::{DetectorConfig, Point2};
use tracing::debug;

use crate::geometry::to_point2;
use crate::scan::edges::{EdgeMethod, RawContour};

/// A possible document boundary: exactly four points in boundary order.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub points: [Point2; 4],
    pub method: EdgeMethod,
    /// Douglas-Peucker tolerance (fraction of perimeter) that produced it.
    pub tolerance: f64,
    /// Area of the raw contour the candidate was simplified from.
    pub contour_area: f64,
}

/// Turn raw contours into 4-vertex candidates.
///
/// Contours outside `(min_contour_area, max_contour_area_ratio * image_area)`
/// are skipped. Each remaining contour is simplified at every configured
/// tolerance and every exactly-4-vertex result is kept, so one contour may
/// yield several (often identical) candidates.
pub fn quadrilaterals(
    contours: &[RawContour],
    image_width: u32,
    image_height: u32,
    config: &DetectorConfig,
) -> Vec<Candidate> {
    let image_area = image_width as f64 * image_height as f64;
    let max_area = image_area * config.max_contour_area_ratio;
    let mut candidates = Vec::new();

    for contour in contours {
        if contour.area <= config.min_contour_area || contour.area >= max_area {
            continue;
        }
        let perimeter = arc_length(&contour.points, true);
        if perimeter <= 0.0 {
            continue;
        }

        for &tolerance in &config.approx_tolerances {
            let approx = approximate_closed(&contour.points, tolerance * perimeter);
            if approx.len() != 4 {
                continue;
            }
            let points = [
                to_point2(approx[0]),
                to_point2(approx[1]),
                to_point2(approx[2]),
                to_point2(approx[3]),
            ];
            candidates.push(Candidate {
                points,
                method: contour.method,
                tolerance,
                contour_area: contour.area,
            });
        }
    }

    debug!(
        contours = contours.len(),
        candidates = candidates.len(),
        "Quadrilateral filter complete"
    );
    candidates
}

/// Drop candidates whose corners all lie within `max_distance` of an earlier
/// candidate's corners (compared as sets, so vertex order and starting point
/// do not matter). The earliest candidate of each cluster survives.
pub fn dedup_candidates(candidates: Vec<Candidate>, max_distance: f64) -> Vec<Candidate> {
    if max_distance <= 0.0 {
        return candidates;
    }
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for cand in candidates {
        let duplicate = kept
            .iter()
            .any(|k| same_corners(&k.points, &cand.points, max_distance));
        if !duplicate {
            kept.push(cand);
        }
    }
    kept
}

fn same_corners(a: &[Point2; 4], b: &[Point2; 4], max_distance: f64) -> bool {
    a.iter()
        .all(|p| b.iter().any(|q| p.distance(q) <= max_distance))
        && b.iter()
            .all(|q| a.iter().any(|p| p.distance(q) <= max_distance))
}

/// Douglas-Peucker simplification of a closed border.
///
/// The border is split at the point farthest from its first point and each
/// half is simplified as an open chain, so the result does not depend on the
/// (nearly coincident) first and last border pixels.
pub fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 || !(epsilon > 0.0) {
        return points.to_vec();
    }

    let start = points[0];
    let far = points
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let (dx, dy) = ((p.x - start.x) as i64, (p.y - start.y) as i64);
            dx * dx + dy * dy
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    if far == 0 {
        return vec![start];
    }

    let first = approximate_polygon_dp(&points[..=far], epsilon, false);

    let mut second_half: Vec<Point<i32>> = points[far..].to_vec();
    second_half.push(start);
    let second = approximate_polygon_dp(&second_half, epsilon, false);

    // `first` ends at points[far]; `second` starts there and ends at `start`.
    let mut out = first;
    if second.len() > 2 {
        out.extend_from_slice(&second[1..second.len() - 1]);
    }
    out
}
