// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanning pipeline and post-scan enhancement.

pub mod annotate;
pub mod corners;
pub mod enhance;
pub mod order;
pub mod preprocess;
pub mod rectify;
pub mod scanner;

pub use annotate::annotate_corners;
pub use corners::{DocumentCandidate, find_document, find_document_corners};
pub use enhance::ScanEnhancer;
pub use order::order_corners;
pub use preprocess::preprocess;
pub use rectify::{perspective_transform, rectify};
pub use scanner::{Detection, DocumentScanner, ScanOutput};
