// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: places a flattened scan on a single page using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use flatscan_core::PaperSize;
use flatscan_core::error::{DocScanError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::ImageProcessor;

/// Resolution a scan is assumed to have when sizing it on the page.
const DEFAULT_DPI: f32 = 150.0;
/// Blank border kept around the scan on every side.
const MARGIN_MM: f32 = 10.0;

/// Writes scanned pages as single-page PDFs.
pub struct PdfWriter {
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    /// Create a new writer targeting the given paper size.
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// Create a single-page PDF containing the given encoded image.
    ///
    /// The scan is scaled up or down to fill the area inside the margins,
    /// preserving its aspect ratio, and centred on the page.
    #[instrument(skip(self, image_bytes), fields(bytes_len = image_bytes.len()))]
    pub fn create_from_image(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("Flatscan Scan");

        info!(paper = ?self.paper_size, title, "Creating scan PDF");

        let decoded = ImageProcessor::from_bytes(image_bytes)?.into_dynamic();
        let (img_width, img_height) = (decoded.width() as usize, decoded.height() as usize);
        if img_width == 0 || img_height == 0 {
            return Err(DocScanError::PdfError("cannot place an empty image".into()));
        }

        let raw = RawImage {
            pixels: RawImageData::U8(decoded.to_rgb8().into_raw()),
            width: img_width,
            height: img_height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(title);
        let xobject_id = doc.add_image(&raw);

        let margin_pt = Mm(MARGIN_MM).into_pt().0;
        let usable_w_pt = page_w.into_pt().0 - 2.0 * margin_pt;
        let usable_h_pt = page_h.into_pt().0 - 2.0 * margin_pt;
        if usable_w_pt <= 0.0 || usable_h_pt <= 0.0 {
            return Err(DocScanError::PdfError(format!(
                "margin of {} mm leaves no room on {:?}",
                MARGIN_MM, self.paper_size
            )));
        }

        let img_w_pt = img_width as f32 / DEFAULT_DPI * 72.0;
        let img_h_pt = img_height as f32 / DEFAULT_DPI * 72.0;
        let scale = (usable_w_pt / img_w_pt).min(usable_h_pt / img_h_pt);

        let rendered_w_pt = img_w_pt * scale;
        let rendered_h_pt = img_h_pt * scale;
        let x_offset = margin_pt + (usable_w_pt - rendered_w_pt) / 2.0;
        let y_offset = margin_pt + (usable_h_pt - rendered_h_pt) / 2.0;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x_offset)),
                translate_y: Some(Pt(y_offset)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(DEFAULT_DPI),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);
        debug!(rendered_w_pt, rendered_h_pt, scale, "Scan placed on page");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings");
        }

        Ok(output)
    }
}
