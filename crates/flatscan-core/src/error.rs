// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Flatscan.

use thiserror::Error;

/// Top-level error type for all Flatscan operations.
#[derive(Debug, Error)]
pub enum DocScanError {
    // -- Pipeline errors --
    #[error("no document found: no external contour simplifies to a quadrilateral above the area threshold")]
    NoDocumentFound,

    #[error("degenerate corner geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -- Codec / export errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocScanError {
    /// Whether the caller can recover by supplying a different photograph.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoDocumentFound | Self::DegenerateGeometry(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocScanError>;
