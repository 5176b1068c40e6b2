// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanwerk-document crate: boundary detection on
// synthetic frames, with and without a page present, and rectification.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use scanwerk_core::Point2;
use scanwerk_document::{detect_document_boundary, rectify};

/// Dark table with a light page covering the middle of the frame.
fn page_frame(width: u32, height: u32) -> DynamicImage {
    let mut img = GrayImage::from_pixel(width, height, Luma([40u8]));
    for y in height / 5..height * 4 / 5 {
        for x in width / 5..width * 4 / 5 {
            img.put_pixel(x, y, Luma([235u8]));
        }
    }
    DynamicImage::ImageLuma8(img)
}

fn bench_detection(c: &mut Criterion) {
    let page = page_frame(480, 640);
    c.bench_function("detect_document_boundary (480x640, page)", |b| {
        b.iter(|| black_box(detect_document_boundary(black_box(&page))));
    });

    // No edges at all: the early-exit path hit by blank preview frames.
    let flat = DynamicImage::ImageLuma8(GrayImage::from_pixel(480, 640, Luma([128u8])));
    c.bench_function("detect_document_boundary (480x640, flat)", |b| {
        b.iter(|| black_box(detect_document_boundary(black_box(&flat))));
    });
}

fn bench_rectify(c: &mut Criterion) {
    let page = page_frame(480, 640);
    let corners = [
        Point2::new(100.0, 130.0),
        Point2::new(380.0, 125.0),
        Point2::new(390.0, 510.0),
        Point2::new(90.0, 515.0),
    ];
    c.bench_function("rectify (480x640)", |b| {
        b.iter(|| black_box(rectify(black_box(&page), &corners)));
    });
}

criterion_group!(benches, bench_detection, bench_rectify);
criterion_main!(benches);
