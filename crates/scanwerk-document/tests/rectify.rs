// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification against synthetic sources.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

use scanwerk_core::{Point2, ScanwerkError};
use scanwerk_document::{DocumentDetector, ImageProcessor, rectify};

/// A smooth gradient, so bilinear sampling at integer positions is exact and
/// any misplacement shows up as a value change.
fn gradient(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
        Rgb([(x * 255 / w) as u8, (y * 255 / h) as u8, 128])
    }))
}

fn full_frame(w: u32, h: u32) -> [Point2; 4] {
    // Centres of the four corner pixels.
    let (r, b) = ((w - 1) as f64, (h - 1) as f64);
    [
        Point2::new(0.0, 0.0),
        Point2::new(r, 0.0),
        Point2::new(r, b),
        Point2::new(0.0, b),
    ]
}

#[test]
fn full_frame_corners_reproduce_the_source() {
    let src = gradient(120, 90);
    let out = rectify(&src, &full_frame(120, 90)).unwrap();
    assert_eq!((out.width(), out.height()), (120, 90));

    let (src, out) = (src.to_rgb8(), out.to_rgb8());
    for (x, y, a) in src.enumerate_pixels() {
        let b = out.get_pixel(x, y);
        for c in 0..3 {
            assert!(a[c].abs_diff(b[c]) <= 1, "({x}, {y}): {a:?} vs {b:?}");
        }
    }
}

#[test]
fn corners_far_outside_the_source_fail_without_allocating() {
    let src = DynamicImage::ImageLuma8(GrayImage::new(10, 10));
    let runaway = [
        Point2::new(0.0, 0.0),
        Point2::new(1e7, 0.0),
        Point2::new(1e7, 1e7),
        Point2::new(0.0, 1e7),
    ];
    assert!(matches!(
        rectify(&src, &runaway),
        Err(ScanwerkError::DegenerateGeometry(_))
    ));
}

#[test]
fn rectification_is_deterministic_and_leaves_source_untouched() {
    let src = gradient(200, 160);
    let before = src.clone();
    let quad = [
        Point2::new(30.0, 20.0),
        Point2::new(170.0, 35.0),
        Point2::new(160.0, 140.0),
        Point2::new(25.0, 130.0),
    ];
    let first = rectify(&src, &quad).unwrap();
    let second = rectify(&src, &quad).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(src.as_bytes(), before.as_bytes());
}

#[test]
fn skewed_page_comes_out_upright_and_white() {
    // A white trapezoid on black: after rectification the interior is white.
    let mut img = GrayImage::from_pixel(300, 300, Luma([0u8]));
    let quad = [
        Point2::new(60.0, 50.0),
        Point2::new(240.0, 70.0),
        Point2::new(250.0, 260.0),
        Point2::new(40.0, 240.0),
    ];
    let poly: Vec<imageproc::point::Point<i32>> = quad
        .iter()
        .map(|p| imageproc::point::Point::new(p.x as i32, p.y as i32))
        .collect();
    imageproc::drawing::draw_polygon_mut(&mut img, &poly, Luma([255u8]));

    let out = rectify(&DynamicImage::ImageLuma8(img), &quad).unwrap().to_luma8();
    let (w, h) = out.dimensions();
    for y in (h / 10..h * 9 / 10).step_by(7) {
        for x in (w / 10..w * 9 / 10).step_by(7) {
            assert!(out.get_pixel(x, y)[0] >= 254, "({x}, {y})");
        }
    }
}

#[test]
fn self_intersecting_corners_are_rejected_or_warped_without_panic() {
    let src = gradient(100, 100);
    let bowtie = [
        Point2::new(10.0, 10.0),
        Point2::new(90.0, 90.0),
        Point2::new(90.0, 10.0),
        Point2::new(10.0, 90.0),
    ];
    match rectify(&src, &bowtie) {
        Ok(out) => assert!(out.width() > 0 && out.height() > 0),
        Err(err) => assert!(matches!(err, ScanwerkError::DegenerateGeometry(_))),
    }
}

#[test]
fn detected_page_survives_encode_round_trip() {
    let mut img = GrayImage::from_pixel(400, 520, Luma([40u8]));
    for y in 120..400 {
        for x in 100..300 {
            img.put_pixel(x, y, Luma([235u8]));
        }
    }
    let bytes = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img))
        .to_png_bytes()
        .unwrap();
    let frame = ImageProcessor::from_bytes(&bytes).unwrap().into_dynamic();

    let (result, page) = DocumentDetector::default().detect_and_rectify(&frame);
    assert!(result.success, "{}", result.message);
    let page = page.unwrap().to_luma8();
    let (w, h) = page.dimensions();
    assert!(w < h, "page should stay portrait: {w} x {h}");
    assert!(page.get_pixel(w / 2, h / 2)[0] > 200);
}
