// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Post-scan enhancement: denoising, adaptive binarization, and scan-to-PDF
// conversion for rectified document images.

use std::path::Path;

use flatscan_core::config::{Denoise, ThresholdConfig};
use flatscan_core::error::Result;
use flatscan_core::PaperSize;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::separable_filter_equal;
use tracing::{debug, info, instrument};

use crate::image::processor::ImageProcessor;
use crate::pdf::writer::PdfWriter;
use crate::scan::preprocess::denoise;

/// Turns a rectified page into a print-like scan.
///
/// Each operation consumes `self` and returns the transformed enhancer, so
/// steps chain:
///
/// ```ignore
/// let pdf = ScanEnhancer::from_dynamic(rectified, PaperSize::A4)
///     .denoise(Denoise::Median { radius: 3 })
///     .binarize(5, 2)
///     .scan_to_pdf()?;
/// ```
pub struct ScanEnhancer {
    /// The working image (kept as `DynamicImage` for flexibility).
    image: DynamicImage,
    /// Target paper size for PDF output.
    paper_size: PaperSize,
}

impl ScanEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Create an enhancer wrapping an existing `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage, paper_size: PaperSize) -> Self {
        Self { image, paper_size }
    }

    // -- Accessors ------------------------------------------------------------

    /// Consume the enhancer and return the underlying image.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Cleanup --------------------------------------------------------------

    /// Convert to grayscale and suppress noise before thresholding.
    #[instrument(skip(self))]
    pub fn denoise(self, mode: Denoise) -> Self {
        let gray = self.image.to_luma8();
        let cleaned = denoise(&gray, mode);
        debug!("Scan denoised");
        Self {
            image: DynamicImage::ImageLuma8(cleaned),
            paper_size: self.paper_size,
        }
    }

    // -- Binarization ---------------------------------------------------------

    /// Apply adaptive thresholding to produce a black-and-white image.
    ///
    /// For each pixel the threshold is a Gaussian-weighted mean of its
    /// `(2 * block_radius + 1)`-wide neighbourhood, minus a constant `c`.
    /// Pixels brighter than the local threshold become white; all others
    /// become black.
    ///
    /// A `block_radius` of 5 (an 11x11 window) with `c` = 2 suits a page
    /// rectified at working resolution.
    #[instrument(skip(self), fields(block_radius, c))]
    pub fn binarize(self, block_radius: u32, c: i32) -> Self {
        info!(block_radius, c, "Applying adaptive binarization");

        let gray = self.image.to_luma8();
        let local_mean = separable_filter_equal(&gray, &block_kernel(block_radius));

        let output = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let pixel = i32::from(gray.get_pixel(x, y).0[0]);
            let mean = i32::from(local_mean.get_pixel(x, y).0[0]);
            Luma([if pixel > mean - c { 255u8 } else { 0u8 }])
        });

        debug!("Binarization complete");
        Self {
            image: DynamicImage::ImageLuma8(output),
            paper_size: self.paper_size,
        }
    }

    /// Denoise then binarize with the given settings.
    pub fn threshold(self, config: &ThresholdConfig) -> Self {
        self.denoise(config.denoise)
            .binarize(config.block_radius, config.offset)
    }

    // -- Scan to PDF ----------------------------------------------------------

    /// Convert the (possibly enhanced) scan image to a print-ready PDF.
    ///
    /// The image is encoded as PNG, then embedded in a single-page PDF sized to
    /// the configured paper size.
    #[instrument(skip(self))]
    pub fn scan_to_pdf(&self) -> Result<Vec<u8>> {
        info!(paper = ?self.paper_size, "Converting scan to PDF");

        let png_bytes = ImageProcessor::from_dynamic(self.image.clone()).to_png_bytes()?;

        let mut writer = PdfWriter::new(self.paper_size);
        writer.set_title("Flatscan Scan");
        let pdf_bytes = writer.create_from_image(&png_bytes)?;

        debug!(pdf_bytes = pdf_bytes.len(), "Scan-to-PDF complete");
        Ok(pdf_bytes)
    }

    /// Write the scan as a single-page PDF file.
    pub fn write_pdf(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.scan_to_pdf()?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote scan PDF to {}", path.as_ref().display());
        Ok(())
    }
}

/// Normalised 1-D Gaussian weights spanning `2r + 1` pixels.
///
/// Sigma grows with the window: `0.3 * ((k - 1) / 2 - 1) + 0.8` for `k` taps.
fn block_kernel(block_radius: u32) -> Vec<f32> {
    let ksize = 2 * block_radius + 1;
    let sigma = 0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let weights: Vec<f32> = (0..ksize)
        .map(|i| {
            let d = i as f32 - block_radius as f32;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
