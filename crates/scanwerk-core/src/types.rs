// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for document detection results.

use serde::{Deserialize, Serialize};

/// Message attached to every successful detection.
pub const MSG_DETECTED: &str = "Document detected";

/// Message attached when no candidate was found or none was good enough.
pub const MSG_NOT_DETECTED: &str = "No document detected";

/// Prefix of the message attached to failures caused by unusable input.
pub const MSG_INVALID_PREFIX: &str = "Invalid image";

/// Prefix of the message attached when the detector settings are unusable.
pub const MSG_INVALID_CONFIG_PREFIX: &str = "Invalid configuration";

/// A point in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Canonical names of the four ordered document corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerName {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CornerName {
    /// All corners in output order.
    pub const ORDER: [CornerName; 4] = [
        CornerName::TopLeft,
        CornerName::TopRight,
        CornerName::BottomRight,
        CornerName::BottomLeft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
        }
    }
}

impl std::fmt::Display for CornerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A corner expressed both as a 0-100 percentage of the image size (for UI
/// overlays that do not know the pixel dimensions) and in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentCorner {
    pub id: u8,
    pub name: CornerName,
    /// Percentage of image width, in [0, 100].
    pub x: f64,
    /// Percentage of image height, in [0, 100].
    pub y: f64,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

/// Outcome of one detection call. Built once and never mutated afterwards.
///
/// Serialises to the JSON shape the upload API returns: on failure only
/// `success`, `message` and an empty `corners` list are emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub success: bool,
    pub message: String,
    pub corners: Vec<PercentCorner>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pixel_corners: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contour_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_area: Option<f64>,
    /// Percentage of the image covered by the document, in [0, 100].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
}

impl DetectionResult {
    /// A failed detection with the given message and no corners.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            corners: Vec::new(),
            pixel_corners: Vec::new(),
            contour_area: None,
            image_area: None,
            coverage: None,
        }
    }

    /// The standard "nothing usable in this frame" failure.
    pub fn not_detected() -> Self {
        Self::failure(MSG_NOT_DETECTED)
    }

    /// A failure for an input frame that cannot be processed at all.
    pub fn invalid_input(reason: &str) -> Self {
        Self::failure(format!("{MSG_INVALID_PREFIX}: {reason}"))
    }

    /// A failure caused by detector settings that do not validate.
    pub fn invalid_config(reason: &str) -> Self {
        Self::failure(format!("{MSG_INVALID_CONFIG_PREFIX}: {reason}"))
    }

    /// A successful detection.
    ///
    /// `corners` must already be ordered top-left, top-right, bottom-right,
    /// bottom-left. Percentages and coverage are derived here and clamped to
    /// [0, 100].
    pub fn success(corners: [Point2; 4], width: u32, height: u32, contour_area: f64) -> Self {
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        let image_area = width as f64 * height as f64;

        let percent = corners
            .iter()
            .zip(CornerName::ORDER)
            .enumerate()
            .map(|(id, (p, name))| PercentCorner {
                id: id as u8,
                name,
                x: (p.x / w * 100.0).clamp(0.0, 100.0),
                y: (p.y / h * 100.0).clamp(0.0, 100.0),
                pixel_x: p.x,
                pixel_y: p.y,
            })
            .collect();

        let coverage = if image_area > 0.0 {
            (contour_area / image_area * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Self {
            success: true,
            message: MSG_DETECTED.into(),
            corners: percent,
            pixel_corners: corners.iter().map(|p| [p.x, p.y]).collect(),
            contour_area: Some(contour_area),
            image_area: Some(image_area),
            coverage: Some(coverage),
        }
    }

    /// The ordered pixel corners, if the detection succeeded.
    pub fn ordered_pixel_corners(&self) -> Option<[Point2; 4]> {
        if !self.success || self.pixel_corners.len() != 4 {
            return None;
        }
        let mut out = [Point2::default(); 4];
        for (slot, [x, y]) in out.iter_mut().zip(&self.pixel_corners) {
            *slot = Point2::new(*x, *y);
        }
        Some(out)
    }
}
