// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Flatscan document pipeline.

use serde::{Deserialize, Serialize};

/// A point in image coordinates (x grows right, y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// `x + y`: smallest at the top-left of an upright quadrilateral.
    pub fn sum(&self) -> f32 {
        self.x + self.y
    }

    /// `y - x`: smallest at the top-right of an upright quadrilateral.
    pub fn diff(&self) -> f32 {
        self.y - self.x
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2D) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f32, f32)> for Point2D {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for (f32, f32) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Four document corners in discovery order (not yet ordered).
pub type CornerSet = [Point2D; 4];

/// Document corners in the canonical order expected by rectification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedCorners {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_left: Point2D,
    pub bottom_right: Point2D,
}

impl OrderedCorners {
    /// Corners as `[top_left, top_right, bottom_left, bottom_right]`.
    pub fn to_array(&self) -> [Point2D; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Corners walking the boundary clockwise from the top-left.
    ///
    /// Useful for drawing and for area computations, which need adjacent
    /// vertices rather than the rectification order.
    pub fn clockwise(&self) -> [Point2D; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// The target-rectangle corners for a `width` x `height` output, in the
    /// same order as [`to_array`](Self::to_array).
    pub fn target_rectangle(width: u32, height: u32) -> [Point2D; 4] {
        let (w, h) = (width as f32, height as f32);
        [
            Point2D::new(0.0, 0.0),
            Point2D::new(w, 0.0),
            Point2D::new(0.0, h),
            Point2D::new(w, h),
        ]
    }
}

impl std::fmt::Display for OrderedCorners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tl={} tr={} bl={} br={}",
            self.top_left, self.top_right, self.bottom_left, self.bottom_right
        )
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Parse a size name as accepted on the command line (`a4`, `letter`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a3" => Some(Self::A3),
            "a5" => Some(Self::A5),
            "letter" => Some(Self::Letter),
            "legal" => Some(Self::Legal),
            "tabloid" => Some(Self::Tabloid),
            _ => None,
        }
    }
}
