//! Shared value types for cells and their geometry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a live cell. Allocated by the grid model, stable across drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Size of a cell in grid units (always >= 1 in both directions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub width: u32,
    pub height: u32,
}

impl Span {
    pub const UNIT: Span = Span { width: 1, height: 1 };

    /// Build a span, raising zero dimensions to 1
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn area(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::UNIT
    }
}

/// 1-based grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub column: u32,
    pub row: u32,
}

impl GridPos {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col {} row {}", self.column, self.row)
    }
}

/// Margins around a cell's box, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Margins {
    /// Split a gutter between the two sides of each axis
    pub fn from_gutter(gutter: u32) -> Self {
        let near = gutter / 2;
        let far = gutter - near;
        Self {
            left: near,
            right: far,
            top: near,
            bottom: far,
        }
    }
}

/// Pixel geometry the layout engine reports for one cell.
/// `left`/`top` are the origin of the cell's margin box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelGeometry {
    pub left: i32,
    pub top: i32,
    pub width_px: u32,
    pub height_px: u32,
    pub margins: Margins,
}

impl PixelGeometry {
    pub fn right(&self) -> i32 {
        self.left + self.width_px as i32
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height_px as i32
    }
}

/// Direction along which two cells touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Same row, side by side
    Row,
    /// Same column, stacked
    Column,
}
