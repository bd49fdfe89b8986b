// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people scanning with a phone camera.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity tells the front end whether a retake can help.

use crate::error::DocScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The photograph didn't work out; taking another one may succeed.
    Retake,
    /// The request itself is wrong (bad settings, bad arguments).
    InvalidRequest,
    /// Something around the scan failed: disk, codec, PDF writer.
    Environment,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `DocScanError` into a `HumanError`.
pub fn humanize_error(err: &DocScanError) -> HumanError {
    match err {
        // -- Pipeline errors --
        DocScanError::NoDocumentFound => HumanError {
            message: "We couldn't find a document in the photo.".into(),
            suggestion: "Place the page on a darker, plain surface so all four edges are visible, then take the photo again.".into(),
            severity: Severity::Retake,
        },

        DocScanError::DegenerateGeometry(detail) => HumanError {
            message: "The document's corners don't form a usable shape.".into(),
            suggestion: format!(
                "Hold the camera more squarely above the page and keep it upright in the frame. ({detail})"
            ),
            severity: Severity::Retake,
        },

        DocScanError::InvalidInput(detail) => HumanError {
            message: "The image can't be scanned.".into(),
            suggestion: format!("Check that the file is a non-empty photo. ({detail})"),
            severity: Severity::InvalidRequest,
        },

        DocScanError::Config(detail) => HumanError {
            message: "The scan settings are not valid.".into(),
            suggestion: format!("Fix the configuration file or command-line options. ({detail})"),
            severity: Severity::InvalidRequest,
        },

        // -- Codec / export --
        DocScanError::ImageError(detail) => humanize_image_error(detail),

        DocScanError::PdfError(detail) => HumanError {
            message: "We couldn't create the PDF.".into(),
            suggestion: format!("Try saving the scan as an image instead. ({detail})"),
            severity: Severity::Environment,
        },

        // -- Persistence --
        DocScanError::Io(io_err) => {
            use std::io::ErrorKind;
            match io_err.kind() {
                ErrorKind::NotFound => HumanError {
                    message: "A file couldn't be found.".into(),
                    suggestion: "Check the path and try again.".into(),
                    severity: Severity::InvalidRequest,
                },
                ErrorKind::PermissionDenied => HumanError {
                    message: "We don't have permission to use that file.".into(),
                    suggestion: "Choose a folder you can write to, or check the file's permissions.".into(),
                    severity: Severity::Environment,
                },
                _ => HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                    severity: Severity::Environment,
                },
            }
        }

        DocScanError::Serialization(_) => HumanError {
            message: "The configuration file couldn't be read.".into(),
            suggestion: "Make sure it is valid JSON, or print the defaults with --print-config and start from those.".into(),
            severity: Severity::InvalidRequest,
        },
    }
}

/// Parse codec error details into human-readable messages.
fn humanize_image_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("decode") || lower.contains("open") {
        HumanError {
            message: "We couldn't read that image.".into(),
            suggestion: "Use a JPEG, PNG, TIFF or BMP photo.".into(),
            severity: Severity::InvalidRequest,
        }
    } else if lower.contains("save") || lower.contains("encod") {
        HumanError {
            message: "We couldn't save the scan.".into(),
            suggestion: "Check the output file name ends in .png or .jpg and the folder exists.".into(),
            severity: Severity::Environment,
        }
    } else {
        HumanError {
            message: "Something went wrong while processing the image.".into(),
            suggestion: format!("Try again with a different photo. (Detail: {detail})"),
            severity: Severity::Environment,
        }
    }
}
