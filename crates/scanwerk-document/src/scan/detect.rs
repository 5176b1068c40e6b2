// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection: edge passes, quadrilateral filter, scoring,
// corner ordering/refinement, and packaging into a `DetectionResult`.

use image::DynamicImage;
use scanwerk_core::{DetectionResult, DetectorConfig, Result};
use tracing::{debug, info, instrument, warn};

use crate::geometry::is_convex;
use crate::scan::corners::{order_corners, refine_corners};
use crate::scan::edges::{edge_maps, smooth, trace_contours};
use crate::scan::quad::{dedup_candidates, quadrilaterals};
use crate::scan::rectify::rectify;
use crate::scan::report::{
    CandidateDiagnostics, DetectionOutcome, DetectionReport, MAX_REPORTED_CANDIDATES,
    PassDiagnostics,
};
use crate::scan::score::{best_index, score_candidate, ScoreBreakdown};

/// Finds the page in a photograph.
///
/// Holds only read-only configuration, so one detector can be shared across
/// threads; every call is independent of every other.
///
/// ```ignore
/// let detector = DocumentDetector::new(DetectorConfig::default());
/// let result = detector.detect(&photo);
/// if let Some(corners) = result.ordered_pixel_corners() {
///     let page = scanwerk_document::rectify(&photo, &corners)?;
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentDetector {
    config: DetectorConfig,
}

impl DocumentDetector {
    /// Build a detector without checking the configuration. A configuration
    /// that fails [`DetectorConfig::validate`] makes every call report
    /// `InvalidConfig` instead of running the pipeline.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Build a detector, rejecting a configuration that does not validate.
    pub fn try_new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect the document boundary. Never fails: unusable frames, unusable
    /// settings and frames without an acceptable page all come back as
    /// `success: false`.
    pub fn detect(&self, image: &DynamicImage) -> DetectionResult {
        self.detect_with_report(image).0
    }

    /// Detect, and rectify the page if one was found.
    ///
    /// The rectified image is `None` whenever detection failed, or in the
    /// (unexpected) case that the accepted corners cannot be warped.
    pub fn detect_and_rectify(&self, image: &DynamicImage) -> (DetectionResult, Option<DynamicImage>) {
        let result = self.detect(image);
        let page = result.ordered_pixel_corners().and_then(|corners| {
            rectify(image, &corners)
                .inspect_err(|err| warn!(error = %err, "Rectification of accepted corners failed"))
                .ok()
        });
        (result, page)
    }

    /// Detect the document boundary and return per-call diagnostics.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn detect_with_report(&self, image: &DynamicImage) -> (DetectionResult, DetectionReport) {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            warn!("Empty frame passed to detector");
            return (
                DetectionResult::invalid_input("image has zero size"),
                DetectionReport::new(DetectionOutcome::InvalidInput),
            );
        }
        let config = &self.config;
        if let Err(err) = config.validate() {
            warn!(error = %err, "Detector configuration rejected");
            return (
                DetectionResult::invalid_config(&err.to_string()),
                DetectionReport::new(DetectionOutcome::InvalidConfig),
            );
        }
        let mut report = DetectionReport::new(DetectionOutcome::NoCandidateFound);

        // Stage 1: edge maps and contours.
        let gray = image.to_luma8();
        let blurred = smooth(&gray, config);
        let mut contours = Vec::new();
        for (method, map) in edge_maps(&blurred, config) {
            let traced = trace_contours(method, &map);
            report.passes.push(PassDiagnostics {
                method,
                contours: traced.len(),
            });
            contours.extend(traced);
        }

        // Stage 2: 4-vertex candidates.
        let candidates = quadrilaterals(&contours, width, height, config);
        report.candidates_found = candidates.len();
        let candidates = dedup_candidates(candidates, config.dedup_distance_px);
        report.candidates_scored = candidates.len();

        if candidates.is_empty() {
            info!(contours = contours.len(), "No quadrilateral candidates");
            return (DetectionResult::not_detected(), report);
        }

        // Stage 3: score and keep the best (first wins ties).
        let scores: Vec<ScoreBreakdown> = candidates
            .iter()
            .map(|c| score_candidate(c, width, height, &config.scoring))
            .collect();
        let Some(best) = best_index(&scores) else {
            return (DetectionResult::not_detected(), report);
        };
        let winner = &candidates[best];
        let winner_score = scores[best];
        report.best_score = Some(winner_score.total());

        if config.collect_diagnostics {
            let mut ranked: Vec<usize> = (0..candidates.len()).collect();
            ranked.sort_by(|&a, &b| scores[b].total().total_cmp(&scores[a].total()));
            report.candidates = ranked
                .into_iter()
                .take(MAX_REPORTED_CANDIDATES)
                .map(|i| CandidateDiagnostics::new(&candidates[i], scores[i]))
                .collect();
        }

        debug!(
            method = %winner.method,
            tolerance = winner.tolerance,
            margin = winner_score.margin(),
            rectangularity = winner_score.rectangularity(),
            aspect = winner_score.aspect(),
            area = winner_score.area(),
            solidity = winner_score.solidity(),
            "Best candidate"
        );

        if winner_score.total() <= config.scoring.acceptance_threshold {
            info!(
                best_score = winner_score.total(),
                threshold = config.scoring.acceptance_threshold,
                candidates = candidates.len(),
                "Best candidate below acceptance threshold"
            );
            report.outcome = DetectionOutcome::BelowAcceptanceThreshold;
            return (DetectionResult::not_detected(), report);
        }

        // Stage 4: canonical order, then pull corners off the shadow fringe.
        let ordered = order_corners(&winner.points);
        let refined = refine_corners(&ordered, config.refine_inset_px);
        if !is_convex(&refined) {
            warn!(corners = ?refined, "Accepted candidate is not convex after ordering");
            report.outcome = DetectionOutcome::BelowAcceptanceThreshold;
            return (DetectionResult::not_detected(), report);
        }

        // Stage 5: package.
        let contour_area = winner_score.measurements().polygon_area;
        let result = DetectionResult::success(refined, width, height, contour_area);
        report.outcome = DetectionOutcome::Accepted;
        info!(
            score = winner_score.total(),
            coverage = result.coverage.unwrap_or_default(),
            method = %winner.method,
            "Document detected"
        );
        (result, report)
    }
}

/// Detect the document boundary with the default configuration.
pub fn detect_document_boundary(image: &DynamicImage) -> DetectionResult {
    DocumentDetector::default().detect(image)
}
