// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-call detection diagnostics. The public result deliberately hides why a
// detection failed; the report keeps that detail for debugging and tuning.

use scanwerk_core::Point2;
use serde::Serialize;

use crate::scan::edges::EdgeMethod;
use crate::scan::quad::Candidate;
use crate::scan::score::ScoreBreakdown;

/// At most this many scored candidates are kept in a report.
pub const MAX_REPORTED_CANDIDATES: usize = 16;

/// Why a detection call ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionOutcome {
    Accepted,
    InvalidInput,
    /// The detector's configuration failed validation; nothing was run.
    InvalidConfig,
    /// No contour survived the area and vertex filters.
    NoCandidateFound,
    /// Candidates existed but none scored above the acceptance threshold.
    BelowAcceptanceThreshold,
}

/// Contours found by one edge pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassDiagnostics {
    pub method: EdgeMethod,
    pub contours: usize,
}

/// A scored candidate, kept when diagnostics are enabled.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateDiagnostics {
    pub method: EdgeMethod,
    pub tolerance: f64,
    pub points: [Point2; 4],
    pub contour_area: f64,
    pub score: ScoreBreakdown,
}

impl CandidateDiagnostics {
    pub fn new(candidate: &Candidate, score: ScoreBreakdown) -> Self {
        Self {
            method: candidate.method,
            tolerance: candidate.tolerance,
            points: candidate.points,
            contour_area: candidate.contour_area,
            score,
        }
    }
}

/// Diagnostics for one detection call.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub outcome: DetectionOutcome,
    pub passes: Vec<PassDiagnostics>,
    /// 4-vertex candidates before near-duplicate suppression.
    pub candidates_found: usize,
    /// Candidates actually scored.
    pub candidates_scored: usize,
    pub best_score: Option<f64>,
    /// Highest-scoring candidates first; empty unless diagnostics are on.
    pub candidates: Vec<CandidateDiagnostics>,
}

impl DetectionReport {
    pub fn new(outcome: DetectionOutcome) -> Self {
        Self {
            outcome,
            passes: Vec::new(),
            candidates_found: 0,
            candidates_scored: 0,
            best_score: None,
            candidates: Vec::new(),
        }
    }

    /// Total contours across every pass.
    pub fn contours_found(&self) -> usize {
        self.passes.iter().map(|p| p.contours).sum()
    }
}
