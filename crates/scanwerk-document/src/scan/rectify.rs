// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: warp an ordered quadrilateral onto an upright
// rectangle sized from the quadrilateral's own edge lengths.

use image::{DynamicImage, Luma, Pixel, Rgb, Rgba};
use imageproc::definitions::Image;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into_with};
use scanwerk_core::{Point2, Result, ScanwerkError};
use tracing::{debug, instrument, warn};

/// The rectified page may cover at most this many times the source area.
/// Corners far outside the frame would otherwise request an unbounded
/// allocation.
pub const MAX_OUTPUT_AREA_FACTOR: f64 = 4.0;

/// How far inside the last row/column a border sample is pulled so bilinear
/// interpolation still has a right/bottom neighbour.
const EDGE_SNAP: f32 = 1e-3;

/// Output size `(width, height)` for a quad ordered TL, TR, BR, BL: the
/// longer of each pair of opposite edges, so the page keeps its own aspect
/// ratio.
pub fn output_size(corners: &[Point2; 4]) -> (f64, f64) {
    let [tl, tr, br, bl] = corners;
    let width = tl.distance(tr).max(bl.distance(br));
    let height = tl.distance(bl).max(tr.distance(br));
    (width, height)
}

/// Warp the region bounded by `corners` (ordered top-left, top-right,
/// bottom-right, bottom-left) into a new axis-aligned image.
///
/// Corners are pixel-centre coordinates: a quad through the centres of the
/// four corner pixels of a `w x h` image yields a `w x h` copy of it. The
/// source is never modified. Grayscale and RGB sources keep their pixel
/// layout; anything else is warped as RGBA. Pixels that map outside the
/// source are filled with white.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rectify(image: &DynamicImage, corners: &[Point2; 4]) -> Result<DynamicImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ScanwerkError::InvalidInput("image has zero size".into()));
    }
    if corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ScanwerkError::DegenerateGeometry(
            "corner coordinates must be finite".into(),
        ));
    }

    let (w, h) = output_size(corners);
    if w < 1.0 || h < 1.0 {
        return Err(ScanwerkError::DegenerateGeometry(format!(
            "quadrilateral collapses to {w:.1} x {h:.1} px"
        )));
    }
    let (span_w, span_h) = (w.round(), h.round());
    let source_area = image.width() as f64 * image.height() as f64;
    if (span_w + 1.0) * (span_h + 1.0) > MAX_OUTPUT_AREA_FACTOR * source_area {
        warn!(?corners, "Corners reach far outside the source image");
        return Err(ScanwerkError::DegenerateGeometry(format!(
            "a {w:.0} x {h:.0} px page cannot come from a {} x {} px image",
            image.width(),
            image.height()
        )));
    }
    let (out_w, out_h) = (span_w as u32 + 1, span_h as u32 + 1);

    // Output pixel centres map back onto source pixel centres.
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),
        (span_w as f32, 0.0),
        (span_w as f32, span_h as f32),
        (0.0, span_h as f32),
    ];
    let src = corners.map(|p| (p.x as f32, p.y as f32));

    let projection = Projection::from_control_points(dest, src).ok_or_else(|| {
        warn!(?corners, "Failed to compute projective transform");
        ScanwerkError::DegenerateGeometry("corners do not define a projective transform".into())
    })?;

    let warped = match image {
        DynamicImage::ImageLuma8(gray) => {
            DynamicImage::ImageLuma8(warp(gray, projection, out_w, out_h, Luma([255u8])))
        }
        DynamicImage::ImageRgb8(rgb) => {
            DynamicImage::ImageRgb8(warp(rgb, projection, out_w, out_h, Rgb([255u8, 255, 255])))
        }
        other => DynamicImage::ImageRgba8(warp(
            &other.to_rgba8(),
            projection,
            out_w,
            out_h,
            Rgba([255u8, 255, 255, 255]),
        )),
    };

    debug!(out_w, out_h, "Perspective rectification applied");
    Ok(warped)
}

fn warp<P>(source: &Image<P>, output_to_source: Projection, out_w: u32, out_h: u32, fill: P) -> Image<P>
where
    P: Pixel<Subpixel = u8> + Send + Sync,
{
    let (src_w, src_h) = source.dimensions();
    let mut out = Image::<P>::new(out_w, out_h);
    warp_into_with(
        source,
        |x, y| {
            let (sx, sy) = output_to_source * (x, y);
            (snap_to_edge(sx, src_w), snap_to_edge(sy, src_h))
        },
        Interpolation::Bilinear,
        fill,
        &mut out,
    );
    out
}

/// Pull a coordinate within half a pixel of the source border onto the
/// sampleable range `[0, len - 1)`. Anything further out is left alone and
/// picks up the fill colour.
fn snap_to_edge(v: f32, len: u32) -> f32 {
    let last = len as f32 - 1.0;
    if (-0.5..0.0).contains(&v) {
        0.0
    } else if v > last - EDGE_SNAP && v <= last + 0.5 {
        (last - EDGE_SNAP).max(0.0)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage, RgbaImage};

    #[test]
    fn output_size_uses_longest_opposite_edges() {
        let quad = [
            Point2::new(10.0, 10.0),
            Point2::new(110.0, 10.0),
            Point2::new(130.0, 210.0),
            Point2::new(0.0, 200.0),
        ];
        let (w, h) = output_size(&quad);
        assert!((w - quad[3].distance(&quad[2])).abs() < 1e-9);
        assert!((h - quad[1].distance(&quad[2])).abs() < 1e-9);
    }

    #[test]
    fn rectify_keeps_layout_and_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 80, Rgb([10, 200, 30])));
        let quad = [
            Point2::new(10.0, 10.0),
            Point2::new(70.0, 10.0),
            Point2::new(70.0, 50.0),
            Point2::new(10.0, 50.0),
        ];
        let out = rectify(&img, &quad).unwrap();
        assert!(matches!(out, DynamicImage::ImageRgb8(_)));
        assert_eq!((out.width(), out.height()), (61, 41));
        let Rgb(px) = *out.to_rgb8().get_pixel(30, 20);
        for (got, want) in px.iter().zip([10u8, 200, 30]) {
            assert!(got.abs_diff(want) <= 1, "{px:?}");
        }
    }

    #[test]
    fn rgba_sources_are_warped_as_rgba() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([1, 2, 3, 255])));
        let quad = [
            Point2::new(5.0, 5.0),
            Point2::new(35.0, 5.0),
            Point2::new(35.0, 35.0),
            Point2::new(5.0, 35.0),
        ];
        assert!(matches!(rectify(&img, &quad).unwrap(), DynamicImage::ImageRgba8(_)));
    }

    #[test]
    fn collapsed_quad_is_degenerate() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(50, 50));
        let p = Point2::new(10.0, 10.0);
        assert!(matches!(
            rectify(&img, &[p, p, p, p]),
            Err(ScanwerkError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn corners_far_outside_the_frame_are_refused() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
        let huge = [
            Point2::new(0.0, 0.0),
            Point2::new(1e7, 0.0),
            Point2::new(1e7, 1e7),
            Point2::new(0.0, 1e7),
        ];
        assert!(matches!(
            rectify(&img, &huge),
            Err(ScanwerkError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn output_up_to_the_area_limit_is_allowed() {
        // 19 x 19 output from a 10 x 10 source: 3.61x the area.
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(10, 10, Luma([9u8])));
        let quad = [
            Point2::new(-4.0, -4.0),
            Point2::new(14.0, -4.0),
            Point2::new(14.0, 14.0),
            Point2::new(-4.0, 14.0),
        ];
        let out = rectify(&img, &quad).unwrap();
        assert_eq!((out.width(), out.height()), (19, 19));
        // Outside the source: fill colour.
        assert_eq!(out.to_luma8().get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn border_samples_snap_onto_the_last_pixel() {
        assert_eq!(snap_to_edge(-0.2, 10), 0.0);
        assert_eq!(snap_to_edge(9.0, 10), 9.0 - EDGE_SNAP);
        assert_eq!(snap_to_edge(4.5, 10), 4.5);
        assert_eq!(snap_to_edge(-3.0, 10), -3.0);
        assert_eq!(snap_to_edge(11.0, 10), 11.0);
    }

    #[test]
    fn non_finite_corner_is_degenerate() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(50, 50));
        let mut quad = [Point2::new(1.0, 1.0); 4];
        quad[2] = Point2::new(f64::NAN, 3.0);
        assert!(matches!(
            rectify(&img, &quad),
            Err(ScanwerkError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn empty_image_is_invalid_input() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let quad = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!(matches!(rectify(&img, &quad), Err(ScanwerkError::InvalidInput(_))));
    }
}
