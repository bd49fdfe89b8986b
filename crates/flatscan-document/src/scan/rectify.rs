// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: warps the document quadrilateral onto an
// upright target rectangle.

use flatscan_core::error::{DocScanError, Result};
use flatscan_core::OrderedCorners;
use image::{DynamicImage, ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};
use imageproc::definitions::{Clamp, Image};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, instrument};

use crate::geometry::quad_degeneracy;

/// Build the projection taking `corners` onto a `width` x `height` rectangle.
///
/// Collinear or coincident corners are rejected before the solve.
pub fn perspective_transform(
    corners: &OrderedCorners,
    width: u32,
    height: u32,
) -> Result<Projection> {
    let src = corners.to_array();
    if let Some(reason) = quad_degeneracy(&src) {
        return Err(DocScanError::DegenerateGeometry(reason));
    }
    let dst = OrderedCorners::target_rectangle(width, height);

    Projection::from_control_points(src.map(<(f32, f32)>::from), dst.map(<(f32, f32)>::from))
        .ok_or_else(|| {
            DocScanError::DegenerateGeometry(
                "no invertible perspective transform maps these corners".into(),
            )
        })
}

/// Resample `image` so the quadrilateral `corners` fills a new
/// `target_width` x `target_height` image.
///
/// Uses bilinear interpolation. Samples within one pixel of the photograph's
/// border take the nearest edge pixel; anything further out is filled with
/// white, like blank paper. The output has the same pixel layout and channel
/// depth as the input.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rectify(
    image: &DynamicImage,
    corners: &OrderedCorners,
    target_width: u32,
    target_height: u32,
) -> Result<DynamicImage> {
    if target_width == 0 || target_height == 0 {
        return Err(DocScanError::InvalidInput(format!(
            "target size must be non-zero, got {target_width}x{target_height}"
        )));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(DocScanError::InvalidInput("source image is empty".into()));
    }

    let projection = perspective_transform(corners, target_width, target_height)?;
    debug!(?projection, "Perspective transform solved");

    let (w, h) = (target_width, target_height);
    let rectified = match image {
        DynamicImage::ImageLuma8(src) => {
            DynamicImage::ImageLuma8(warp_page(src, &projection, Luma([u8::MAX]), w, h))
        }
        DynamicImage::ImageLumaA8(src) => {
            DynamicImage::ImageLumaA8(warp_page(src, &projection, LumaA([u8::MAX; 2]), w, h))
        }
        DynamicImage::ImageRgb8(src) => {
            DynamicImage::ImageRgb8(warp_page(src, &projection, Rgb([u8::MAX; 3]), w, h))
        }
        DynamicImage::ImageRgba8(src) => {
            DynamicImage::ImageRgba8(warp_page(src, &projection, Rgba([u8::MAX; 4]), w, h))
        }
        DynamicImage::ImageLuma16(src) => {
            DynamicImage::ImageLuma16(warp_page(src, &projection, Luma([u16::MAX]), w, h))
        }
        DynamicImage::ImageLumaA16(src) => {
            DynamicImage::ImageLumaA16(warp_page(src, &projection, LumaA([u16::MAX; 2]), w, h))
        }
        DynamicImage::ImageRgb16(src) => {
            DynamicImage::ImageRgb16(warp_page(src, &projection, Rgb([u16::MAX; 3]), w, h))
        }
        DynamicImage::ImageRgba16(src) => {
            DynamicImage::ImageRgba16(warp_page(src, &projection, Rgba([u16::MAX; 4]), w, h))
        }
        DynamicImage::ImageRgb32F(src) => {
            DynamicImage::ImageRgb32F(warp_page(src, &projection, Rgb([1.0f32; 3]), w, h))
        }
        DynamicImage::ImageRgba32F(src) => {
            DynamicImage::ImageRgba32F(warp_page(src, &projection, Rgba([1.0f32; 4]), w, h))
        }
        other => {
            return Err(DocScanError::InvalidInput(format!(
                "unsupported pixel layout {:?}",
                other.color()
            )));
        }
    };

    info!(target_width, target_height, "Perspective rectification applied");
    Ok(rectified)
}

/// Warp `src` through `projection` into a new `width` x `height` buffer.
///
/// The source gets a one-pixel replicated border first, so bilinear samples
/// on the last row and column have a neighbour to blend with.
fn warp_page<P>(src: &Image<P>, projection: &Projection, fill: P, width: u32, height: u32) -> Image<P>
where
    P: Pixel + Send + Sync,
    <P as Pixel>::Subpixel: Send + Sync + Into<f32> + Clamp<f32>,
{
    let padded = pad_replicate(src);
    let from_padded = Projection::translate(-1.0, -1.0).and_then(*projection);

    let mut out = ImageBuffer::new(width, height);
    warp_into(&padded, &from_padded, Interpolation::Bilinear, fill, &mut out);
    out
}

fn pad_replicate<P: Pixel>(src: &Image<P>) -> Image<P> {
    let (w, h) = src.dimensions();
    ImageBuffer::from_fn(w + 2, h + 2, |x, y| {
        let sx = x.saturating_sub(1).min(w - 1);
        let sy = y.saturating_sub(1).min(h - 1);
        *src.get_pixel(sx, sy)
    })
}
