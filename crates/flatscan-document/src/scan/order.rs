// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canonical corner ordering.

use flatscan_core::error::{DocScanError, Result};
use flatscan_core::{OrderedCorners, Point2D};
use tracing::debug;

/// Order four corners as (top-left, top-right, bottom-left, bottom-right).
///
/// Top-left has the smallest `x + y` and bottom-right the largest; top-right
/// has the smallest `y - x` and bottom-left the largest. Ties go to the
/// earliest input point.
///
/// The heuristic assumes a roughly upright page. Near 45° of rotation two
/// roles can fall on the same input point; that is reported as
/// [`DocScanError::DegenerateGeometry`] instead of returning a set with a
/// duplicated corner.
pub fn order_corners(corners: &[Point2D]) -> Result<OrderedCorners> {
    if corners.len() != 4 {
        return Err(DocScanError::InvalidInput(format!(
            "corner ordering needs exactly 4 points, got {}",
            corners.len()
        )));
    }

    let top_left = arg_extreme(corners, Point2D::sum, Extreme::Min);
    let bottom_right = arg_extreme(corners, Point2D::sum, Extreme::Max);
    let top_right = arg_extreme(corners, Point2D::diff, Extreme::Min);
    let bottom_left = arg_extreme(corners, Point2D::diff, Extreme::Max);

    let roles = [top_left, top_right, bottom_left, bottom_right];
    for i in 0..4 {
        for j in (i + 1)..4 {
            if roles[i] == roles[j] {
                return Err(DocScanError::DegenerateGeometry(format!(
                    "corner {} fills two roles; the page is rotated too far from upright for sum/difference ordering",
                    corners[roles[i]]
                )));
            }
        }
    }

    let ordered = OrderedCorners {
        top_left: corners[top_left],
        top_right: corners[top_right],
        bottom_left: corners[bottom_left],
        bottom_right: corners[bottom_right],
    };
    debug!(%ordered, "Corners ordered");
    Ok(ordered)
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

/// Index of the first point minimising / maximising `key`.
fn arg_extreme(points: &[Point2D], key: fn(&Point2D) -> f32, extreme: Extreme) -> usize {
    let mut best = 0;
    for i in 1..points.len() {
        let better = match extreme {
            Extreme::Min => key(&points[i]) < key(&points[best]),
            Extreme::Max => key(&points[i]) > key(&points[best]),
        };
        if better {
            best = i;
        }
    }
    best
}
