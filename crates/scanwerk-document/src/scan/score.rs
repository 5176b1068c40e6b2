// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric scorer. Five independent sub-scores (margin to frame edge,
// corner rectangularity, aspect ratio, area ratio, convex-hull solidity) are
// summed into one acceptance score. All thresholds come from `ScoringConfig`.

use scanwerk_core::{Point2, ScoringConfig};
use serde::Serialize;

use crate::geometry::{convex_hull, interior_angles, min_area_rect, shoelace_area, EPSILON};
use crate::scan::quad::Candidate;

/// Per-candidate score with the measurements that produced it.
///
/// Fields are private so `total` can only ever be the sum of the five
/// sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    margin: f64,
    rectangularity: f64,
    aspect: f64,
    area: f64,
    solidity: f64,
    total: f64,
    measurements: Measurements,
}

/// Raw measurements behind a `ScoreBreakdown`. `None` marks a measurement
/// that could not be taken because the geometry was degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurements {
    pub polygon_area: f64,
    pub area_ratio: f64,
    pub min_margin_fraction: f64,
    pub mean_angle_error_deg: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub solidity: Option<f64>,
}

impl ScoreBreakdown {
    pub fn new(
        margin: f64,
        rectangularity: f64,
        aspect: f64,
        area: f64,
        solidity: f64,
        measurements: Measurements,
    ) -> Self {
        Self {
            margin,
            rectangularity,
            aspect,
            area,
            solidity,
            total: margin + rectangularity + aspect + area + solidity,
            measurements,
        }
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn rectangularity(&self) -> f64 {
        self.rectangularity
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn solidity(&self) -> f64 {
        self.solidity
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn measurements(&self) -> &Measurements {
        &self.measurements
    }
}

/// Score one candidate against an image of the given size.
pub fn score_candidate(
    candidate: &Candidate,
    image_width: u32,
    image_height: u32,
    cfg: &ScoringConfig,
) -> ScoreBreakdown {
    let pts = &candidate.points;
    let (w, h) = (image_width.max(1) as f64, image_height.max(1) as f64);

    let min_margin = min_margin_fraction(pts, w, h);
    let margin = margin_score(min_margin, cfg);

    let angle_error = mean_angle_error(pts);
    let rectangularity = angle_error.map_or(0.0, |e| rectangularity_score(e, cfg));

    let aspect_ratio = min_area_rect(pts).and_then(|(a, b)| {
        let (long, short) = (a.max(b), a.min(b));
        (short > EPSILON).then(|| long / short)
    });
    let aspect = aspect_ratio.map_or(0.0, |r| aspect_score(r, cfg));

    let polygon_area = shoelace_area(pts);
    let area_ratio = polygon_area / (w * h);
    let area = area_score(area_ratio, cfg);

    let hull_area = shoelace_area(&convex_hull(pts));
    let solidity_ratio = (hull_area > EPSILON).then(|| polygon_area / hull_area);
    let solidity = solidity_ratio.map_or(0.0, |s| solidity_score(s, cfg));

    ScoreBreakdown::new(
        margin,
        rectangularity,
        aspect,
        area,
        solidity,
        Measurements {
            polygon_area,
            area_ratio,
            min_margin_fraction: min_margin,
            mean_angle_error_deg: angle_error,
            aspect_ratio,
            solidity: solidity_ratio,
        },
    )
}

/// Smallest distance from the candidate to any frame edge, as a fraction of
/// the image dimension along that axis.
pub fn min_margin_fraction(pts: &[Point2; 4], width: f64, height: f64) -> f64 {
    let min_x = pts.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let max_x = pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = pts.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

    let left = min_x / width;
    let right = (width - max_x) / width;
    let top = min_y / height;
    let bottom = (height - max_y) / height;
    left.min(right).min(top).min(bottom).max(0.0)
}

/// Mean absolute deviation of the four interior angles from 90 degrees.
pub fn mean_angle_error(pts: &[Point2; 4]) -> Option<f64> {
    interior_angles(pts).map(|angles| angles.iter().map(|a| (a - 90.0).abs()).sum::<f64>() / 4.0)
}

pub fn margin_score(min_margin: f64, cfg: &ScoringConfig) -> f64 {
    if min_margin < cfg.margin_critical {
        cfg.margin_critical_score
    } else if min_margin < cfg.margin_tight {
        cfg.margin_tight_score
    } else if min_margin < cfg.margin_narrow {
        cfg.margin_narrow_score
    } else {
        cfg.margin_ok_score
    }
}

pub fn rectangularity_score(mean_error_deg: f64, cfg: &ScoringConfig) -> f64 {
    if mean_error_deg < cfg.angle_excellent {
        cfg.angle_excellent_score
    } else if mean_error_deg < cfg.angle_good {
        cfg.angle_good_score
    } else if mean_error_deg < cfg.angle_fair {
        cfg.angle_fair_score
    } else {
        cfg.angle_poor_score
    }
}

pub fn aspect_score(ratio: f64, cfg: &ScoringConfig) -> f64 {
    let within = |(lo, hi): (f64, f64)| ratio >= lo && ratio <= hi;
    if within(cfg.aspect_a4) {
        cfg.aspect_a4_score
    } else if within(cfg.aspect_paper) {
        cfg.aspect_paper_score
    } else if within(cfg.aspect_document) {
        cfg.aspect_document_score
    } else {
        cfg.aspect_other_score
    }
}

pub fn area_score(ratio: f64, cfg: &ScoringConfig) -> f64 {
    let (lo, hi) = cfg.area_typical;
    if ratio >= lo && ratio <= hi {
        cfg.area_typical_score
    } else if ratio > cfg.area_borderline_high {
        cfg.area_too_large_score
    } else if (ratio >= cfg.area_borderline_low && ratio < lo) || ratio > hi {
        cfg.area_borderline_score
    } else {
        cfg.area_too_small_score
    }
}

pub fn solidity_score(solidity: f64, cfg: &ScoringConfig) -> f64 {
    if solidity > cfg.solidity_clean {
        cfg.solidity_clean_score
    } else if solidity > cfg.solidity_fair {
        cfg.solidity_fair_score
    } else {
        cfg.solidity_poor_score
    }
}

/// Index of the highest total. The first candidate wins ties.
pub fn best_index(scores: &[ScoreBreakdown]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, score) in scores.iter().enumerate() {
        if best.is_none_or(|b| score.total() > scores[b].total()) {
            best = Some(i);
        }
    }
    best
}
