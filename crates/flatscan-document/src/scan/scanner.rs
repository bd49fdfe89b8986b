// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end document scanning: edge map -> corner search -> ordering ->
// rectification -> optional thresholding.

use flatscan_core::error::Result;
use flatscan_core::{OrderedCorners, ScanConfig};
use image::{DynamicImage, GrayImage};
use tracing::{debug, info, instrument, warn};

use crate::scan::corners::find_document;
use crate::scan::enhance::ScanEnhancer;
use crate::scan::order::order_corners;
use crate::scan::preprocess::preprocess;
use crate::scan::rectify::rectify;

/// Where the page was found in the working image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub corners: OrderedCorners,
    /// Area enclosed by the winning contour, in px².
    pub contour_area: f64,
}

/// Everything a successful scan produces.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub corners: OrderedCorners,
    pub contour_area: f64,
    /// The page warped to `output.width` x `output.height`.
    pub rectified: DynamicImage,
    /// Binarized copy of `rectified`, when `output.threshold` is set.
    pub thresholded: Option<GrayImage>,
}

/// Runs the full pipeline with one fixed configuration.
///
/// The scanner holds no mutable state, so a single instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct DocumentScanner {
    config: ScanConfig,
}

impl DocumentScanner {
    /// Validate `config` and build a scanner around it.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Locate the page and order its corners without warping.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection> {
        if image.width() != self.config.working_width
            || image.height() != self.config.working_height
        {
            warn!(
                expected_width = self.config.working_width,
                expected_height = self.config.working_height,
                "Image is not at the working resolution; area threshold may not fit"
            );
        }

        let edges = preprocess(image, &self.config.preprocess)?;
        let candidate = find_document(&edges, &self.config.detection)?;
        let corners = order_corners(&candidate.corners)?;
        debug!(%corners, area = candidate.area, "Detection complete");

        Ok(Detection {
            corners,
            contour_area: candidate.area,
        })
    }

    /// Detect the page and flatten it.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn scan(&self, image: &DynamicImage) -> Result<ScanOutput> {
        let detection = self.detect(image)?;
        let output = &self.config.output;

        let rectified = rectify(image, &detection.corners, output.width, output.height)?;

        let thresholded = output.threshold.as_ref().map(|threshold| {
            ScanEnhancer::from_dynamic(rectified.clone(), output.paper_size)
                .threshold(threshold)
                .into_dynamic()
                .to_luma8()
        });

        info!(
            width = output.width,
            height = output.height,
            thresholded = thresholded.is_some(),
            "Document scanned"
        );

        Ok(ScanOutput {
            corners: detection.corners,
            contour_area: detection.contour_area,
            rectified,
            thresholded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatscan_core::{DocScanError, Point2D, ThresholdConfig};
    use image::Luma;

    /// White page (100,100)-(500,500) on a black 600x600 background.
    fn white_square_on_black() -> DynamicImage {
        let mut img = GrayImage::from_pixel(600, 600, Luma([0u8]));
        for y in 100..500 {
            for x in 100..500 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    /// Bright convex page with clockwise `corners` on a dark 960x1280 frame.
    fn page_on_dark_frame(corners: [(f32, f32); 4]) -> DynamicImage {
        let inside = |x: f32, y: f32| {
            (0..4).all(|i| {
                let (ax, ay) = corners[i];
                let (bx, by) = corners[(i + 1) % 4];
                (bx - ax) * (y - ay) - (by - ay) * (x - ax) >= 0.0
            })
        };
        let img = GrayImage::from_fn(960, 1280, |x, y| {
            Luma([if inside(x as f32, y as f32) { 235u8 } else { 10 }])
        });
        DynamicImage::ImageLuma8(img)
    }

    fn assert_near(p: Point2D, x: f32, y: f32) {
        assert!(
            (p.x - x).abs() <= 6.0 && (p.y - y).abs() <= 6.0,
            "corner {p} is not near ({x}, {y})"
        );
    }

    fn scanner_600(output: u32) -> DocumentScanner {
        let mut config = ScanConfig::for_working_size(600, 600);
        config.output.width = output;
        config.output.height = output;
        DocumentScanner::new(config).expect("valid config")
    }

    #[test]
    fn detects_the_corners_of_a_white_page() {
        let detection = scanner_600(400)
            .detect(&white_square_on_black())
            .expect("detected");
        let c = detection.corners;

        let close = |p: Point2D, x: f32, y: f32| {
            (p.x - x).abs() <= 4.0 && (p.y - y).abs() <= 4.0
        };
        assert!(close(c.top_left, 100.0, 100.0), "{c}");
        assert!(close(c.top_right, 499.0, 100.0), "{c}");
        assert!(close(c.bottom_left, 100.0, 499.0), "{c}");
        assert!(close(c.bottom_right, 499.0, 499.0), "{c}");
        assert!(detection.contour_area > 390.0 * 390.0);
    }

    #[test]
    fn white_page_rectifies_to_white() {
        let out = scanner_600(400)
            .scan(&white_square_on_black())
            .expect("scanned");
        let rectified = out.rectified.to_luma8();
        assert_eq!(rectified.dimensions(), (400, 400));

        let margin = 6;
        for y in margin..400 - margin {
            for x in margin..400 - margin {
                let v = rectified.get_pixel(x, y).0[0];
                assert!(v > 240, "pixel ({x},{y}) = {v}");
            }
        }

        assert!(out.thresholded.is_none(), "thresholding is opt-in");
    }

    #[test]
    fn configured_threshold_binarizes_the_page() {
        let mut config = ScanConfig::for_working_size(600, 600);
        config.output.threshold = Some(ThresholdConfig::default());
        let out = DocumentScanner::new(config)
            .expect("valid")
            .scan(&white_square_on_black())
            .expect("scanned");

        let thresholded = out.thresholded.expect("threshold configured");
        assert_eq!(thresholded.dimensions(), (600, 600));
        assert_eq!(thresholded.get_pixel(300, 300).0[0], 255);
        assert_eq!(out.rectified.color(), image::ColorType::L8);
    }

    #[test]
    fn trapezoid_page_is_found_and_flattened() {
        let corners = [(301.0, 150.0), (701.0, 172.0), (899.0, 1180.0), (91.0, 1210.0)];
        let photo = page_on_dark_frame(corners);
        let scanner = DocumentScanner::new(ScanConfig::default()).expect("valid");

        let out = scanner.scan(&photo).expect("scanned");
        let c = out.corners;
        assert_near(c.top_left, 301.0, 150.0);
        assert_near(c.top_right, 701.0, 172.0);
        assert_near(c.bottom_right, 899.0, 1180.0);
        assert_near(c.bottom_left, 91.0, 1210.0);

        let rectified = out.rectified.to_luma8();
        assert_eq!(rectified.dimensions(), (960, 1280));
        let margin = 20;
        for y in margin..1280 - margin {
            for x in margin..960 - margin {
                let v = rectified.get_pixel(x, y).0[0];
                assert!(v > 200, "pixel ({x},{y}) = {v}");
            }
        }
    }

    #[test]
    fn page_rotated_about_eighteen_degrees_keeps_its_corner_roles() {
        let corners = [(250.0, 101.0), (850.0, 300.0), (700.0, 1199.0), (100.0, 999.0)];
        let photo = page_on_dark_frame(corners);
        let scanner = DocumentScanner::new(ScanConfig::default()).expect("valid");

        let c = scanner.detect(&photo).expect("detected").corners;
        assert_near(c.top_left, 250.0, 101.0);
        assert_near(c.top_right, 850.0, 300.0);
        assert_near(c.bottom_right, 700.0, 1199.0);
        assert_near(c.bottom_left, 100.0, 999.0);
    }

    #[test]
    fn diamond_page_is_degenerate_geometry() {
        // Top vertex wins both top-left and top-right, bottom vertex wins
        // both bottom roles.
        let corners = [(480.0, 240.0), (880.0, 660.0), (480.0, 1080.0), (80.0, 660.0)];
        let photo = page_on_dark_frame(corners);
        let scanner = DocumentScanner::new(ScanConfig::default()).expect("valid");

        let err = scanner.scan(&photo).expect_err("ambiguous corner roles");
        assert!(matches!(err, DocScanError::DegenerateGeometry(_)), "{err}");
        assert!(err.is_recoverable());
    }

    #[test]
    fn all_black_image_is_no_document() {
        let black = DynamicImage::ImageLuma8(GrayImage::new(600, 600));
        let err = scanner_600(400).scan(&black).expect_err("nothing to find");
        assert!(matches!(err, DocScanError::NoDocumentFound));
        assert!(err.is_recoverable());
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = ScanConfig::default();
        config.output.width = 0;
        let err = DocumentScanner::new(config).expect_err("invalid");
        assert!(matches!(err, DocScanError::Config(_)));
    }

    #[test]
    fn scanner_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentScanner>();
    }
}
