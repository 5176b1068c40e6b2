// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration. Every threshold and weight the pipeline uses lives
// here so that retuning never touches the scoring logic.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};

/// Settings for the edge/contour passes, the quadrilateral filter and corner
/// refinement.
/// Largest accepted Gaussian sigma; the blur kernel grows linearly with it.
pub const MAX_BLUR_SIGMA: f32 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Gaussian sigma applied before edge detection (1.4 matches a 7x7 kernel).
    pub blur_sigma: f32,
    /// Canny (low, high) threshold pairs, tried in order.
    pub canny_thresholds: Vec<(f32, f32)>,
    /// Dilation radius (L-infinity) applied to each Canny map.
    pub dilate_radius: u8,
    /// Erosion radius applied after dilation.
    pub erode_radius: u8,
    /// Run the adaptive-threshold pass in addition to Canny.
    pub use_adaptive: bool,
    /// Half-width of the local mean window for adaptive thresholding.
    pub adaptive_block_radius: u32,
    /// A pixel is foreground when it is this much darker than its local mean.
    pub adaptive_offset: i32,
    /// Morphological close radius applied to the adaptive map.
    pub close_radius: u8,
    /// Contours at or below this area (px^2) are discarded as specks.
    pub min_contour_area: f64,
    /// Contours at or above this fraction of the image are discarded.
    pub max_contour_area_ratio: f64,
    /// Douglas-Peucker tolerances as fractions of the contour perimeter.
    pub approx_tolerances: Vec<f64>,
    /// Candidates whose corners all lie within this distance of an earlier
    /// candidate are dropped. Zero disables suppression.
    pub dedup_distance_px: f64,
    /// How far each accepted corner is pulled toward the centroid.
    pub refine_inset_px: f64,
    /// Keep per-candidate score breakdowns in the detection report.
    pub collect_diagnostics: bool,
    /// Candidate scoring policy.
    pub scoring: ScoringConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.4,
            canny_thresholds: vec![(45.0, 125.0), (55.0, 160.0), (70.0, 200.0)],
            dilate_radius: 2,
            erode_radius: 1,
            use_adaptive: true,
            adaptive_block_radius: 5,
            adaptive_offset: 2,
            close_radius: 1,
            min_contour_area: 1000.0,
            max_contour_area_ratio: 0.75,
            approx_tolerances: vec![0.015, 0.02, 0.025, 0.03, 0.038],
            dedup_distance_px: 3.0,
            refine_inset_px: 12.0,
            collect_diagnostics: false,
            scoring: ScoringConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.canny_thresholds.is_empty() && !self.use_adaptive {
            return Err(ScanwerkError::Config(
                "no edge pass enabled: canny_thresholds is empty and use_adaptive is false".into(),
            ));
        }
        if let Some((low, high)) = self
            .canny_thresholds
            .iter()
            .find(|(low, high)| !(*low >= 0.0 && low <= high))
        {
            return Err(ScanwerkError::Config(format!(
                "canny threshold pair ({low}, {high}) must satisfy 0 <= low <= high"
            )));
        }
        if self.approx_tolerances.is_empty() {
            return Err(ScanwerkError::Config("approx_tolerances is empty".into()));
        }
        if let Some(tol) = self.approx_tolerances.iter().find(|t| !(**t > 0.0)) {
            return Err(ScanwerkError::Config(format!(
                "approximation tolerance {tol} must be positive"
            )));
        }
        if !(self.max_contour_area_ratio > 0.0 && self.max_contour_area_ratio <= 1.0) {
            return Err(ScanwerkError::Config(format!(
                "max_contour_area_ratio {} must be in (0, 1]",
                self.max_contour_area_ratio
            )));
        }
        if !(self.blur_sigma > 0.0 && self.blur_sigma <= MAX_BLUR_SIGMA) {
            return Err(ScanwerkError::Config(format!(
                "blur_sigma {} must be in (0, {MAX_BLUR_SIGMA}]",
                self.blur_sigma
            )));
        }
        if self.min_contour_area < 0.0 || self.refine_inset_px < 0.0 || self.dedup_distance_px < 0.0 {
            return Err(ScanwerkError::Config(
                "min_contour_area, refine_inset_px and dedup_distance_px must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Thresholds and weights of the five-term candidate score.
///
/// Ladders are checked top to bottom; the first matching rung wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Total score a candidate must strictly exceed to be accepted.
    pub acceptance_threshold: f64,

    // -- Margin to frame edge (fraction of the image dimension) --
    pub margin_critical: f64,
    pub margin_critical_score: f64,
    pub margin_tight: f64,
    pub margin_tight_score: f64,
    pub margin_narrow: f64,
    pub margin_narrow_score: f64,
    pub margin_ok_score: f64,

    // -- Mean absolute corner-angle error in degrees --
    pub angle_excellent: f64,
    pub angle_excellent_score: f64,
    pub angle_good: f64,
    pub angle_good_score: f64,
    pub angle_fair: f64,
    pub angle_fair_score: f64,
    pub angle_poor_score: f64,

    // -- Long side / short side of the minimum-area rectangle --
    pub aspect_a4: (f64, f64),
    pub aspect_a4_score: f64,
    pub aspect_paper: (f64, f64),
    pub aspect_paper_score: f64,
    pub aspect_document: (f64, f64),
    pub aspect_document_score: f64,
    pub aspect_other_score: f64,

    // -- Candidate area / image area --
    pub area_typical: (f64, f64),
    pub area_typical_score: f64,
    pub area_borderline_low: f64,
    pub area_borderline_high: f64,
    pub area_borderline_score: f64,
    pub area_too_large_score: f64,
    pub area_too_small_score: f64,

    // -- Candidate area / convex hull area --
    pub solidity_clean: f64,
    pub solidity_clean_score: f64,
    pub solidity_fair: f64,
    pub solidity_fair_score: f64,
    pub solidity_poor_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 50.0,

            margin_critical: 0.04,
            margin_critical_score: -600.0,
            margin_tight: 0.06,
            margin_tight_score: -300.0,
            margin_narrow: 0.12,
            margin_narrow_score: -50.0,
            margin_ok_score: 100.0,

            angle_excellent: 8.0,
            angle_excellent_score: 100.0,
            angle_good: 12.0,
            angle_good_score: 60.0,
            angle_fair: 18.0,
            angle_fair_score: 20.0,
            angle_poor_score: -100.0,

            aspect_a4: (1.35, 1.48),
            aspect_a4_score: 80.0,
            aspect_paper: (1.25, 1.55),
            aspect_paper_score: 50.0,
            aspect_document: (1.2, 2.5),
            aspect_document_score: 20.0,
            aspect_other_score: -80.0,

            area_typical: (0.10, 0.70),
            area_typical_score: 100.0,
            area_borderline_low: 0.08,
            area_borderline_high: 0.80,
            area_borderline_score: 30.0,
            area_too_large_score: -400.0,
            area_too_small_score: -100.0,

            solidity_clean: 0.96,
            solidity_clean_score: 50.0,
            solidity_fair: 0.90,
            solidity_fair_score: 20.0,
            solidity_poor_score: -60.0,
        }
    }
}
