// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — leaf to root: edge/contour extraction, quadrilateral
// filter, geometric scoring, corner ordering/refinement, perspective
// rectification and result packaging.

pub mod corners;
pub mod detect;
pub mod edges;
pub mod quad;
pub mod rectify;
pub mod report;
pub mod score;

pub use detect::DocumentDetector;
