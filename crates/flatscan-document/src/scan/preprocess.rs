// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge-map stage: reduces a photograph to a binary mask in which the page
// boundary is a closed ring of foreground pixels.

use flatscan_core::config::{Denoise, PreprocessConfig};
use flatscan_core::error::{DocScanError, Result};
use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::morphology::{Mask, dilate, erode, grayscale_dilate, grayscale_erode};
use tracing::{debug, info, instrument};

/// Convert `image` into a binary (0/255) edge mask of the same dimensions.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Denoise ([`Denoise`] mode from the config)
/// 3. Grayscale closing with a diamond element, repeated, to wash out text
///    and texture while keeping the large page boundary
/// 4. Canny edge detection
/// 5. Binary dilate then erode with a square kernel to bridge small gaps in
///    the boundary without a net change in its thickness
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn preprocess(image: &DynamicImage, config: &PreprocessConfig) -> Result<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(DocScanError::InvalidInput(format!(
            "image has zero dimension ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let gray = image.to_luma8();
    let denoised = denoise(&gray, config.denoise);
    debug!(mode = ?config.denoise, "Denoised");

    let closed = close_grayscale(&denoised, config.close_radius, config.close_iterations);
    debug!(
        radius = config.close_radius,
        iterations = config.close_iterations,
        "Morphological closing applied"
    );

    let edges = canny(&closed, config.canny_low, config.canny_high);
    debug!(
        low = config.canny_low,
        high = config.canny_high,
        "Canny edge detection complete"
    );

    let bridged = bridge_gaps(&edges, config.gap_radius, config.gap_iterations);

    info!(
        edge_pixels = bridged.pixels().filter(|p| p.0[0] > 0).count(),
        "Edge map ready"
    );
    Ok(bridged)
}

/// Apply the configured noise suppression to a grayscale image.
pub fn denoise(gray: &GrayImage, mode: Denoise) -> GrayImage {
    match mode {
        Denoise::None => gray.clone(),
        Denoise::Median { radius } => median_filter(gray, radius, radius),
        Denoise::Gaussian { sigma } => gaussian_blur_f32(gray, sigma),
    }
}

/// Grayscale closing: `iterations` dilations followed by as many erosions.
fn close_grayscale(gray: &GrayImage, radius: u8, iterations: u32) -> GrayImage {
    if radius == 0 || iterations == 0 {
        return gray.clone();
    }
    let mask = Mask::diamond(radius);
    let mut out = gray.clone();
    for _ in 0..iterations {
        out = grayscale_dilate(&out, &mask);
    }
    for _ in 0..iterations {
        out = grayscale_erode(&out, &mask);
    }
    out
}

/// Binary closing of the edge mask with an L∞ (square) kernel.
fn bridge_gaps(edges: &GrayImage, radius: u8, iterations: u32) -> GrayImage {
    if radius == 0 || iterations == 0 {
        return edges.clone();
    }
    let mut out = edges.clone();
    for _ in 0..iterations {
        out = dilate(&out, Norm::LInf, radius);
    }
    for _ in 0..iterations {
        out = erode(&out, Norm::LInf, radius);
    }
    out
}
