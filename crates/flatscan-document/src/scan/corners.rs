// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral search over the external contours of an edge mask.

use flatscan_core::config::DetectionConfig;
use flatscan_core::error::{DocScanError, Result};
use flatscan_core::{CornerSet, Point2D};
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use tracing::{debug, info, instrument, warn};

use crate::geometry::{approximate_polygon, arc_length, polygon_area};

/// The winning contour of a corner search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentCandidate {
    /// The four simplified vertices, in contour order.
    pub corners: CornerSet,
    /// Area enclosed by the full (unsimplified) contour, in px².
    pub area: f64,
}

/// Find the largest external contour that simplifies to exactly four
/// vertices and encloses more than `config.min_contour_area`.
///
/// Contours are enumerated in the order `imageproc::contours::find_contours`
/// discovers them: by the raster position (rows top to bottom, each row left
/// to right) of their first border pixel. Only a strictly larger area
/// replaces the current best, so among equal areas the first contour in this
/// order wins.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn find_document(edges: &GrayImage, config: &DetectionConfig) -> Result<DocumentCandidate> {
    let contours = find_contours::<i32>(edges);
    let external: Vec<_> = contours
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .collect();
    debug!(external = external.len(), "External contours traced");

    let mut best: Option<DocumentCandidate> = None;
    for (index, contour) in external.iter().enumerate() {
        let area = polygon_area(&contour.points);
        if area <= config.min_contour_area {
            continue;
        }

        let epsilon = config.approx_epsilon_fraction * arc_length(&contour.points);
        let polygon = approximate_polygon(&contour.points, epsilon);
        debug!(index, area, vertices = polygon.len(), "Contour above area threshold");

        if polygon.len() != 4 {
            continue;
        }
        if best.is_some_and(|b| area <= b.area) {
            continue;
        }
        let corners = [0, 1, 2, 3].map(|i| Point2D::new(polygon[i].x as f32, polygon[i].y as f32));
        best = Some(DocumentCandidate { corners, area });
    }

    match best {
        Some(candidate) => {
            info!(
                area = candidate.area,
                corners = ?candidate.corners,
                "Document quadrilateral found"
            );
            Ok(candidate)
        }
        None => {
            warn!(
                min_area = config.min_contour_area,
                "No quadrilateral contour above the area threshold"
            );
            Err(DocScanError::NoDocumentFound)
        }
    }
}

/// Corner search returning only the four raw corners.
pub fn find_document_corners(edges: &GrayImage, config: &DetectionConfig) -> Result<CornerSet> {
    find_document(edges, config).map(|candidate| candidate.corners)
}
