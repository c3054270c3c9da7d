//! Layout engine contract
//!
//! The engine physically arranges cells (packing, gap filling, drag swaps).
//! The editor never packs cells itself; it only reads back order and geometry
//! after a relayout.

mod packer;

pub use packer::PackingLayout;

use crate::error::GridError;
use crate::types::{CellId, PixelGeometry, Span};

/// Where a drag gesture started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    /// The cell body itself
    Cell,
    /// An interactive control inside the cell (list, text field, ...)
    Control { suppresses_drag: bool },
}

impl DragOrigin {
    pub fn allows_drag(&self) -> bool {
        match self {
            DragOrigin::Cell => true,
            DragOrigin::Control { suppresses_drag } => !suppresses_drag,
        }
    }
}

pub trait LayoutEngine {
    /// Append a cell to the end of the layout
    fn add(&mut self, id: CellId, span: Span);

    /// Remove cells; relayout immediately when `relayout` is set
    fn remove(&mut self, ids: &[CellId], relayout: bool);

    fn clear(&mut self);

    fn resize(&mut self, id: CellId, span: Span) -> Result<(), GridError>;

    /// Container width in columns
    fn set_columns(&mut self, columns: u32);

    /// Recompute every cell's geometry from the current layout order
    fn refresh_and_relayout(&mut self);

    /// Commit pending drag reorders into the authoritative order
    fn synchronize(&mut self);

    /// Authoritative display order as of the last `synchronize`
    fn current_order(&self) -> Vec<CellId>;

    fn geometry_of(&self, id: CellId) -> Option<PixelGeometry>;

    /// Drag-swap two cells
    fn swap(&mut self, a: CellId, b: CellId) -> Result<(), GridError>;

    /// Drag a cell to a new index in the layout order
    fn move_to(&mut self, id: CellId, index: usize) -> Result<(), GridError>;
}
