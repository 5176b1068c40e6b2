// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Finds the page in a photograph and flattens it.
//
// Provides the detection pipeline (edge/contour passes, quadrilateral
// filtering, five-term geometric scoring, corner ordering and refinement),
// four-point perspective rectification, and a small image I/O wrapper.

pub mod geometry;
pub mod image;
pub mod scan;

// Re-export the primary entry points so callers can use
// `scanwerk_document::detect_document_boundary` etc.
pub use image::processor::ImageProcessor;
pub use scan::detect::{DocumentDetector, detect_document_boundary};
pub use scan::rectify::rectify;
pub use scan::report::{DetectionOutcome, DetectionReport};
