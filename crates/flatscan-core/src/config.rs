// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration. Every tunable of the pipeline lives here and is passed
// explicitly into each stage.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocScanError, Result};
use crate::types::PaperSize;

/// Working resolution the default thresholds were tuned at.
pub const REFERENCE_WIDTH: u32 = 960;
/// Working resolution the default thresholds were tuned at.
pub const REFERENCE_HEIGHT: u32 = 1280;
/// Minimum document contour area (px²) at the reference resolution.
pub const REFERENCE_MIN_AREA: f64 = 6000.0;

/// Noise suppression applied before morphology / thresholding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Denoise {
    /// Leave the intensity image untouched.
    None,
    /// Edge-preserving median filter over a `(2r+1)²` window.
    Median { radius: u32 },
    /// Gaussian blur with the given standard deviation.
    Gaussian { sigma: f32 },
}

/// Parameters of the edge-map stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub denoise: Denoise,
    /// Radius of the diamond structuring element used for closing (1 = 3x3).
    pub close_radius: u8,
    /// How many times the closing dilation/erosion is repeated.
    pub close_iterations: u32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Radius of the square kernel that bridges gaps in the edge mask (2 = 5x5).
    pub gap_radius: u8,
    pub gap_iterations: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            denoise: Denoise::Median { radius: 2 },
            close_radius: 1,
            close_iterations: 5,
            canny_low: 75.0,
            canny_high: 200.0,
            gap_radius: 2,
            gap_iterations: 1,
        }
    }
}

/// Parameters of the quadrilateral search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Contours enclosing this many px² or fewer are ignored.
    pub min_contour_area: f64,
    /// Polygon simplification tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_fraction: f64,
}

impl DetectionConfig {
    /// Scale the reference area threshold to a `width` x `height` working image.
    pub fn for_resolution(width: u32, height: u32) -> Self {
        let scale = (width as f64 * height as f64)
            / (REFERENCE_WIDTH as f64 * REFERENCE_HEIGHT as f64);
        Self {
            min_contour_area: REFERENCE_MIN_AREA * scale,
            ..Self::default()
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_contour_area: REFERENCE_MIN_AREA,
            approx_epsilon_fraction: 0.05,
        }
    }
}

/// Adaptive thresholding of the rectified scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub denoise: Denoise,
    /// Half-width of the local mean window (5 = 11x11).
    pub block_radius: u32,
    /// Constant subtracted from the local mean.
    pub offset: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            denoise: Denoise::Median { radius: 3 },
            block_radius: 5,
            offset: 2,
        }
    }
}

/// Shape of the flattened output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    /// When set, a thresholded copy of the rectified scan is produced too.
    /// Off by default.
    pub threshold: Option<ThresholdConfig>,
    /// Page size used for PDF export.
    pub paper_size: PaperSize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: REFERENCE_WIDTH,
            height: REFERENCE_HEIGHT,
            threshold: None,
            paper_size: PaperSize::A4,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Resolution the caller resizes photographs to before scanning.
    pub working_width: u32,
    pub working_height: u32,
    pub preprocess: PreprocessConfig,
    pub detection: DetectionConfig,
    pub output: OutputConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            working_width: REFERENCE_WIDTH,
            working_height: REFERENCE_HEIGHT,
            preprocess: PreprocessConfig::default(),
            detection: DetectionConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Defaults for a different working resolution: the area threshold is
    /// rescaled and the output matches the working size.
    pub fn for_working_size(width: u32, height: u32) -> Self {
        Self {
            working_width: width,
            working_height: height,
            detection: DetectionConfig::for_resolution(width, height),
            output: OutputConfig {
                width,
                height,
                ..OutputConfig::default()
            },
            ..Self::default()
        }
    }

    /// Reject values that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.working_width == 0 || self.working_height == 0 {
            return Err(DocScanError::Config(format!(
                "working resolution must be non-zero, got {}x{}",
                self.working_width, self.working_height
            )));
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(DocScanError::Config(format!(
                "output size must be non-zero, got {}x{}",
                self.output.width, self.output.height
            )));
        }
        let pre = &self.preprocess;
        if !(pre.canny_low >= 0.0 && pre.canny_low <= pre.canny_high) {
            return Err(DocScanError::Config(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                pre.canny_low, pre.canny_high
            )));
        }
        if let Denoise::Gaussian { sigma } = pre.denoise {
            if !(sigma > 0.0) {
                return Err(DocScanError::Config(format!(
                    "gaussian sigma must be positive, got {sigma}"
                )));
            }
        }
        let det = &self.detection;
        if !(det.approx_epsilon_fraction > 0.0 && det.approx_epsilon_fraction < 1.0) {
            return Err(DocScanError::Config(format!(
                "approx_epsilon_fraction must be in (0, 1), got {}",
                det.approx_epsilon_fraction
            )));
        }
        if !(det.min_contour_area >= 0.0) {
            return Err(DocScanError::Config(format!(
                "min_contour_area must be non-negative, got {}",
                det.min_contour_area
            )));
        }
        if let Some(threshold) = &self.output.threshold {
            if threshold.block_radius == 0 {
                return Err(DocScanError::Config(
                    "threshold block_radius must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
