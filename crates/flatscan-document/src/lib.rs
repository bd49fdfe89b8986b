// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatscan-document: Turns a photograph of a paper page into a flat,
// upright scan.
//
// Provides the scanning pipeline (edge map, corner search, corner ordering,
// perspective rectification), post-scan enhancement (denoise, adaptive
// thresholding), image I/O, and single-page PDF export.

pub mod geometry;
pub mod image;
pub mod pdf;
pub mod scan;

// Re-export the primary structs so callers can use `flatscan_document::DocumentScanner` etc.
pub use crate::image::processor::ImageProcessor;
pub use pdf::writer::PdfWriter;
pub use scan::enhance::ScanEnhancer;
pub use scan::scanner::{Detection, DocumentScanner, ScanOutput};
