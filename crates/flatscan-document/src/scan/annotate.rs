// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection preview: draws the detected page outline over the photograph.

use flatscan_core::OrderedCorners;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

const OUTLINE: Rgb<u8> = Rgb([0, 200, 0]);
const MARKER: Rgb<u8> = Rgb([220, 30, 30]);

/// Render `image` with the page outline and a dot on each corner.
pub fn annotate_corners(image: &DynamicImage, corners: &OrderedCorners) -> RgbImage {
    let mut canvas = image.to_rgb8();
    let ring = corners.clockwise();

    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        draw_line_segment_mut(&mut canvas, (a.x, a.y), (b.x, b.y), OUTLINE);
    }

    let radius = (canvas.width().min(canvas.height()) / 60).max(4) as i32;
    for p in ring {
        draw_filled_circle_mut(&mut canvas, (p.x.round() as i32, p.y.round() as i32), radius, MARKER);
    }
    canvas
}
