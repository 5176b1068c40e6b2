// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, downscale for detection, encode. Operates on
// in-memory images using the `image` crate.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use scanwerk_core::{Result, ScanwerkError};
use tracing::{debug, info, instrument};

/// A single in-memory frame on its way into (or out of) the detector.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// can be chained:
///
/// ```ignore
/// let frame = ImageProcessor::open("photo.jpg")?.fit_within(1600);
/// let result = detector.detect(frame.as_dynamic());
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            ScanwerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| ScanwerkError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self { image: img })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Downscale so the longer side is at most `max_dim`, preserving aspect
    /// ratio. Images already within bounds (and `max_dim == 0`) pass through
    /// untouched; this never upscales.
    #[instrument(skip(self), fields(max_dim))]
    pub fn fit_within(self, max_dim: u32) -> Self {
        let (w, h) = (self.image.width(), self.image.height());
        if max_dim == 0 || (w <= max_dim && h <= max_dim) {
            return self;
        }
        info!(from_w = w, from_h = h, max_dim, "Downscaling image");
        let resized = self.image.resize(max_dim, max_dim, FilterType::Triangle);
        debug!(new_w = resized.width(), new_h = resized.height(), "Resize complete");
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Write the image to a file. The format is inferred from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            ScanwerkError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| ScanwerkError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn frame(w: u32, h: u32) -> ImageProcessor {
        ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            w,
            h,
            Luma([128u8]),
        )))
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        let small = frame(400, 200).fit_within(100);
        assert_eq!((small.width(), small.height()), (100, 50));
    }

    #[test]
    fn fit_within_never_upscales() {
        let same = frame(80, 60).fit_within(100);
        assert_eq!((same.width(), same.height()), (80, 60));
        let unbounded = frame(80, 60).fit_within(0);
        assert_eq!((unbounded.width(), unbounded.height()), (80, 60));
    }

    #[test]
    fn png_bytes_decode_back() {
        let bytes = frame(12, 9).to_png_bytes().unwrap();
        let decoded = ImageProcessor::from_bytes(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 9));
    }

    #[test]
    fn save_then_open_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        frame(30, 40).save(&path).unwrap();
        let reopened = ImageProcessor::open(&path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (30, 40));
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"not an image"),
            Err(ScanwerkError::ImageError(_))
        ));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        assert!(matches!(
            ImageProcessor::open("/nonexistent/scanwerk/photo.png"),
            Err(ScanwerkError::ImageError(_))
        ));
    }
}
