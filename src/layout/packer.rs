use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use super::LayoutEngine;
use crate::error::GridError;
use crate::geometry::{GeometryResolver, UnitGrid};
use crate::types::{CellId, Margins, PixelGeometry, Span};

/// In-memory layout engine with first-fit gap filling.
///
/// Cells are packed in layout order into a container `columns` slots wide with
/// unbounded rows; each cell takes the topmost, then leftmost, position where
/// its whole span is free. Drag operations reorder the layout at once but only
/// reach `current_order()` after `synchronize()`.
#[derive(Debug, Clone)]
pub struct PackingLayout {
    grid: UnitGrid,
    columns: u32,
    spans: HashMap<CellId, Span>,
    visual: Vec<CellId>,
    committed: Vec<CellId>,
    placements: HashMap<CellId, (u32, u32)>,
}

impl PackingLayout {
    pub fn new(grid: UnitGrid, columns: u32) -> Self {
        Self {
            grid,
            columns: columns.max(1),
            spans: HashMap::new(),
            visual: Vec::new(),
            committed: Vec::new(),
            placements: HashMap::new(),
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Container width in pixels for the current column count
    pub fn container_width(&self) -> u32 {
        self.grid.column_pitch() * self.columns
    }

    fn ensure_known(&self, id: CellId) -> Result<(), GridError> {
        if self.spans.contains_key(&id) {
            Ok(())
        } else {
            Err(GridError::NotFound(id))
        }
    }

    fn first_fit(&self, occupied: &HashSet<(u32, u32)>, width: u32, height: u32) -> (u32, u32) {
        let mut row = 0;
        loop {
            for col in 0..=(self.columns - width) {
                let free = (col..col + width)
                    .all(|c| (row..row + height).all(|r| !occupied.contains(&(c, r))));
                if free {
                    return (col, row);
                }
            }
            row += 1;
        }
    }
}

impl LayoutEngine for PackingLayout {
    fn add(&mut self, id: CellId, span: Span) {
        if self.spans.insert(id, span).is_some() {
            warn!(cell = %id, "Cell added to layout twice, keeping original position");
            return;
        }
        self.visual.push(id);
        self.committed.push(id);
    }

    fn remove(&mut self, ids: &[CellId], relayout: bool) {
        for id in ids {
            self.spans.remove(id);
            self.placements.remove(id);
        }
        self.visual.retain(|c| !ids.contains(c));
        self.committed.retain(|c| !ids.contains(c));
        if relayout {
            self.refresh_and_relayout();
        }
    }

    fn clear(&mut self) {
        self.spans.clear();
        self.visual.clear();
        self.committed.clear();
        self.placements.clear();
    }

    fn resize(&mut self, id: CellId, span: Span) -> Result<(), GridError> {
        self.ensure_known(id)?;
        self.spans.insert(id, span);
        Ok(())
    }

    fn set_columns(&mut self, columns: u32) {
        self.columns = columns.max(1);
        debug!(columns = self.columns, width = self.container_width(), "Resized layout container");
    }

    fn refresh_and_relayout(&mut self) {
        let mut occupied = HashSet::new();
        self.placements.clear();

        for id in &self.visual {
            let Some(span) = self.spans.get(id) else {
                continue;
            };
            // Cells wider than the container are pinned to the first column
            let width = span.width.min(self.columns);
            let (col, row) = self.first_fit(&occupied, width, span.height);
            for c in col..col + width {
                for r in row..row + span.height {
                    occupied.insert((c, r));
                }
            }
            trace!(cell = %id, col = col, row = row, "Placed cell");
            self.placements.insert(*id, (col, row));
        }
    }

    fn synchronize(&mut self) {
        self.committed = self.visual.clone();
    }

    fn current_order(&self) -> Vec<CellId> {
        self.committed.clone()
    }

    fn geometry_of(&self, id: CellId) -> Option<PixelGeometry> {
        let (col, row) = *self.placements.get(&id)?;
        let span = *self.spans.get(&id)?;
        let (width_px, height_px) = self.grid.pixel_size(span);
        Some(PixelGeometry {
            left: (col * self.grid.column_pitch()) as i32,
            top: (row * self.grid.row_pitch()) as i32,
            width_px,
            height_px,
            margins: Margins::from_gutter(self.grid.gutter),
        })
    }

    fn swap(&mut self, a: CellId, b: CellId) -> Result<(), GridError> {
        self.ensure_known(a)?;
        self.ensure_known(b)?;
        let ia = self.visual.iter().position(|c| *c == a).ok_or(GridError::NotFound(a))?;
        let ib = self.visual.iter().position(|c| *c == b).ok_or(GridError::NotFound(b))?;
        self.visual.swap(ia, ib);
        self.refresh_and_relayout();
        Ok(())
    }

    fn move_to(&mut self, id: CellId, index: usize) -> Result<(), GridError> {
        self.ensure_known(id)?;
        self.visual.retain(|c| *c != id);
        let index = index.min(self.visual.len());
        self.visual.insert(index, id);
        self.refresh_and_relayout();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(columns: u32) -> PackingLayout {
        PackingLayout::new(UnitGrid::default(), columns)
    }

    fn slot(layout: &PackingLayout, id: u32) -> (i32, i32) {
        let g = layout.geometry_of(CellId(id)).unwrap();
        (g.left / 210, g.top / 260)
    }

    #[test]
    fn test_packs_row_major() {
        let mut l = layout(2);
        for i in 0..3 {
            l.add(CellId(i), Span::UNIT);
        }
        l.refresh_and_relayout();

        assert_eq!(slot(&l, 0), (0, 0));
        assert_eq!(slot(&l, 1), (1, 0));
        assert_eq!(slot(&l, 2), (0, 1));
    }

    #[test]
    fn test_fills_gaps() {
        let mut l = layout(3);
        l.add(CellId(0), Span::new(2, 1));
        l.add(CellId(1), Span::new(2, 1));
        l.add(CellId(2), Span::UNIT);
        l.refresh_and_relayout();

        assert_eq!(slot(&l, 1), (0, 1));
        // The 1x1 goes back into the hole left on the first row
        assert_eq!(slot(&l, 2), (2, 0));
    }

    #[test]
    fn test_tall_cell_reserves_rows() {
        let mut l = layout(2);
        l.add(CellId(0), Span::new(1, 2));
        l.add(CellId(1), Span::UNIT);
        l.add(CellId(2), Span::UNIT);
        l.refresh_and_relayout();

        assert_eq!(slot(&l, 1), (1, 0));
        assert_eq!(slot(&l, 2), (1, 1));
    }

    #[test]
    fn test_geometry_sizes_from_span() {
        let mut l = layout(3);
        l.add(CellId(0), Span::new(2, 1));
        l.refresh_and_relayout();

        let g = l.geometry_of(CellId(0)).unwrap();
        assert_eq!(g.width_px, 410);
        assert_eq!(g.height_px, 250);
        assert_eq!(g.margins.left + g.margins.right, 10);
    }

    #[test]
    fn test_swap_needs_synchronize() {
        let mut l = layout(3);
        for i in 0..3 {
            l.add(CellId(i), Span::UNIT);
        }
        l.refresh_and_relayout();
        l.swap(CellId(0), CellId(2)).unwrap();

        // Geometry follows the drag at once
        assert_eq!(slot(&l, 2), (0, 0));
        // Order only after synchronize
        assert_eq!(l.current_order(), vec![CellId(0), CellId(1), CellId(2)]);
        l.synchronize();
        assert_eq!(l.current_order(), vec![CellId(2), CellId(1), CellId(0)]);
    }

    #[test]
    fn test_move_to_clamps_index() {
        let mut l = layout(3);
        for i in 0..3 {
            l.add(CellId(i), Span::UNIT);
        }
        l.move_to(CellId(0), 99).unwrap();
        l.synchronize();
        assert_eq!(l.current_order(), vec![CellId(1), CellId(2), CellId(0)]);
    }

    #[test]
    fn test_unknown_cell_errors() {
        let mut l = layout(3);
        assert!(l.swap(CellId(0), CellId(1)).is_err());
        assert!(l.resize(CellId(0), Span::UNIT).is_err());
        assert!(l.geometry_of(CellId(0)).is_none());
    }

    #[test]
    fn test_remove_with_relayout() {
        let mut l = layout(2);
        for i in 0..3 {
            l.add(CellId(i), Span::UNIT);
        }
        l.refresh_and_relayout();
        l.remove(&[CellId(0)], true);

        assert_eq!(slot(&l, 1), (0, 0));
        assert_eq!(l.current_order(), vec![CellId(1), CellId(2)]);
    }

    #[test]
    fn test_overwide_cell_pinned_left() {
        let mut l = layout(2);
        l.add(CellId(0), Span::new(4, 1));
        l.add(CellId(1), Span::UNIT);
        l.refresh_and_relayout();

        assert_eq!(slot(&l, 0), (0, 0));
        assert_eq!(slot(&l, 1), (0, 1));
    }
}
