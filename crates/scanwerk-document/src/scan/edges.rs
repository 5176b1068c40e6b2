// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge and contour extraction. Several independent edge maps are built from
// the same blurred intensity image (Canny at a few threshold pairs, plus an
// adaptive local threshold) and every closed border in every map becomes a
// raw contour.

use std::fmt;

use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::integral_image::{integral_image, sum_image_pixels};
use imageproc::morphology::{close, dilate, erode};
use imageproc::point::Point;
use scanwerk_core::DetectorConfig;
use serde::Serialize;
use tracing::debug;

use crate::geometry::{shoelace_area, to_point2};

/// Which pass produced an edge map (and so a contour or candidate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeMethod {
    Canny { low: f32, high: f32 },
    Adaptive,
}

impl fmt::Display for EdgeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canny { low, high } => write!(f, "canny({low}/{high})"),
            Self::Adaptive => f.write_str("adaptive"),
        }
    }
}

/// A closed border traced from one edge map.
#[derive(Debug, Clone)]
pub struct RawContour {
    pub method: EdgeMethod,
    pub points: Vec<Point<i32>>,
    /// Enclosed area in px^2 (shoelace over the border pixels).
    pub area: f64,
}

/// Smooth the intensity image once; every pass works from this copy.
pub fn smooth(gray: &GrayImage, config: &DetectorConfig) -> GrayImage {
    gaussian_blur_f32(gray, config.blur_sigma)
}

/// Build every configured edge map from a blurred intensity image.
pub fn edge_maps(blurred: &GrayImage, config: &DetectorConfig) -> Vec<(EdgeMethod, GrayImage)> {
    let mut maps = Vec::with_capacity(config.canny_thresholds.len() + 1);

    for &(low, high) in &config.canny_thresholds {
        let edges = canny(blurred, low, high);
        // Thicken to bridge small gaps in the page border, then thin back so
        // neighbouring unrelated edges stay apart.
        let mut map = edges;
        if config.dilate_radius > 0 {
            map = dilate(&map, Norm::LInf, config.dilate_radius);
        }
        if config.erode_radius > 0 {
            map = erode(&map, Norm::LInf, config.erode_radius);
        }
        maps.push((EdgeMethod::Canny { low, high }, map));
    }

    if config.use_adaptive {
        let mut map = adaptive_threshold_inv(
            blurred,
            config.adaptive_block_radius,
            config.adaptive_offset,
        );
        if config.close_radius > 0 {
            map = close(&map, Norm::LInf, config.close_radius);
        }
        maps.push((EdgeMethod::Adaptive, map));
    }

    maps
}

/// Trace every border (outer borders and holes, at every nesting depth) in
/// an edge map.
pub fn trace_contours(method: EdgeMethod, map: &GrayImage) -> Vec<RawContour> {
    let contours = find_contours::<i32>(map);
    let traced: Vec<RawContour> = contours
        .into_iter()
        .filter(|c| c.points.len() >= 4)
        .map(|c| {
            let pts: Vec<_> = c.points.iter().copied().map(to_point2).collect();
            RawContour {
                method,
                area: shoelace_area(&pts),
                points: c.points,
            }
        })
        .collect();
    debug!(method = %method, contours = traced.len(), "Traced edge map");
    traced
}

/// Local-mean threshold, inverted: a pixel becomes foreground (255) when it
/// is more than `offset` darker than the mean of its
/// `(2 * block_radius + 1)^2` neighbourhood.
///
/// Catches low-contrast page borders the gradient passes miss.
pub fn adaptive_threshold_inv(gray: &GrayImage, block_radius: u32, offset: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }
    let integral = integral_image::<_, u64>(gray);

    GrayImage::from_fn(width, height, |x, y| {
        let (left, top) = (x.saturating_sub(block_radius), y.saturating_sub(block_radius));
        let right = x.saturating_add(block_radius).min(width - 1);
        let bottom = y.saturating_add(block_radius).min(height - 1);
        let count = (right - left + 1) as f64 * (bottom - top + 1) as f64;
        let sum = sum_image_pixels(&integral, left, top, right, bottom)[0] as f64;

        let threshold = sum / count - offset as f64;
        if (gray.get_pixel(x, y)[0] as f64) < threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}
