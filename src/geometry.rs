//! Conversion between layout-engine pixel geometry and grid coordinates
//!
//! The adjacency/merge heuristic lives here too, behind `GeometryResolver`, so
//! a layout engine with exact grid indices can swap in its own rules.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::{Axis, GridPos, PixelGeometry, Span};

/// How a cell's (column, row) is derived at export time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateScheme {
    /// From the cell's pixel offset; correct for merged and multi-span cells
    #[default]
    PixelOffset,
    /// From the cell's position in display order, assuming dense unit slots
    Index,
}

pub trait GeometryResolver {
    /// 1-based position of the cell at `index` in display order
    fn grid_position(&self, index: usize, geometry: &PixelGeometry, columns: u32) -> GridPos;

    /// Span in grid units for a pixel size
    fn span_of(&self, geometry: &PixelGeometry) -> Span;

    /// Pixel (width, height) a span should be given by the layout engine
    fn pixel_size(&self, span: Span) -> (u32, u32);

    /// Axis along which the two cells touch, if they do
    fn adjacency(&self, a: &PixelGeometry, b: &PixelGeometry) -> Option<Axis>;

    /// Span of the cell produced by merging two adjacent cells
    fn merged_span(&self, a: &PixelGeometry, b: &PixelGeometry) -> Option<Span>;

    /// Bottom row reached by a cell, for inferring the exported row count
    fn last_row(&self, position: GridPos, span: Span) -> u32;
}

/// Index-modulo coordinates: `column = index % columns + 1`, `row = index / columns + 1`
pub fn to_grid_coordinates(index: usize, columns: u32) -> GridPos {
    let columns = columns.max(1) as usize;
    GridPos::new((index % columns) as u32 + 1, (index / columns) as u32 + 1)
}

/// Order a pair so the cell with smaller left (then smaller top) comes first
pub fn order_pair<'a>(
    a: &'a PixelGeometry,
    b: &'a PixelGeometry,
) -> (&'a PixelGeometry, &'a PixelGeometry) {
    match a.left.cmp(&b.left).then(a.top.cmp(&b.top)) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    }
}

/// Uniform grid of fixed-size unit cells separated by a gutter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitGrid {
    pub unit_width: u32,
    pub unit_height: u32,
    pub gutter: u32,
    pub scheme: CoordinateScheme,
}

impl UnitGrid {
    pub fn new(unit_width: u32, unit_height: u32, gutter: u32, scheme: CoordinateScheme) -> Self {
        Self {
            unit_width: unit_width.max(1),
            unit_height: unit_height.max(1),
            gutter,
            scheme,
        }
    }

    /// Distance between the origins of two horizontally neighbouring cells
    pub fn column_pitch(&self) -> u32 {
        self.unit_width + self.gutter
    }

    pub fn row_pitch(&self) -> u32 {
        self.unit_height + self.gutter
    }

    /// Pixel-offset coordinates, rounded to the nearest slot
    pub fn pixel_to_grid(&self, geometry: &PixelGeometry) -> GridPos {
        let column = (geometry.left.max(0) as f64 / self.column_pitch() as f64).round() as u32 + 1;
        let row = (geometry.top.max(0) as f64 / self.row_pitch() as f64).round() as u32 + 1;
        GridPos::new(column, row)
    }

    /// Span from pixel size: floored, minimum 1
    pub fn to_span_cells(&self, width_px: u32, height_px: u32) -> Span {
        Span::new(width_px / self.unit_width, height_px / self.unit_height)
    }

    pub fn are_adjacent(&self, a: &PixelGeometry, b: &PixelGeometry) -> bool {
        self.adjacency(a, b).is_some()
    }
}

impl GeometryResolver for UnitGrid {
    fn grid_position(&self, index: usize, geometry: &PixelGeometry, columns: u32) -> GridPos {
        match self.scheme {
            CoordinateScheme::PixelOffset => self.pixel_to_grid(geometry),
            CoordinateScheme::Index => to_grid_coordinates(index, columns),
        }
    }

    fn span_of(&self, geometry: &PixelGeometry) -> Span {
        self.to_span_cells(geometry.width_px, geometry.height_px)
    }

    fn pixel_size(&self, span: Span) -> (u32, u32) {
        let width = span.width * self.unit_width + (span.width - 1) * self.gutter;
        let height = span.height * self.unit_height + (span.height - 1) * self.gutter;
        (width, height)
    }

    fn adjacency(&self, a: &PixelGeometry, b: &PixelGeometry) -> Option<Axis> {
        let (first, second) = order_pair(a, b);

        let row_edge = first.right() as i64
            + first.margins.right as i64
            + second.margins.left as i64;
        if first.top == second.top && row_edge == second.left as i64 {
            return Some(Axis::Row);
        }

        let column_edge = first.bottom() as i64
            + first.margins.bottom as i64
            + second.margins.top as i64;
        if first.left == second.left && column_edge == second.top as i64 {
            return Some(Axis::Column);
        }

        None
    }

    fn last_row(&self, position: GridPos, span: Span) -> u32 {
        match self.scheme {
            CoordinateScheme::PixelOffset => position.row.saturating_add(span.height.saturating_sub(1)),
            // Index positions assume unit slots: the row of the last index is ceil((index + 1) / columns)
            CoordinateScheme::Index => position.row,
        }
    }

    fn merged_span(&self, a: &PixelGeometry, b: &PixelGeometry) -> Option<Span> {
        let span_a = self.span_of(a);
        let span_b = self.span_of(b);
        match self.adjacency(a, b)? {
            Axis::Row => Some(Span::new(
                (a.width_px + b.width_px) / self.unit_width,
                span_a.height.max(span_b.height),
            )),
            Axis::Column => Some(Span::new(
                span_a.width.max(span_b.width),
                (a.height_px + b.height_px) / self.unit_height,
            )),
        }
    }
}

impl Default for UnitGrid {
    fn default() -> Self {
        use crate::constants::grid::{GUTTER, UNIT_HEIGHT, UNIT_WIDTH};
        Self::new(UNIT_WIDTH, UNIT_HEIGHT, GUTTER, CoordinateScheme::default())
    }
}
