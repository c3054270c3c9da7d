//! Grid model: the authoritative set of cells for one editing session
//!
//! Cells are kept in insertion order. Position on screen is owned by the
//! layout engine; the model only stores spans and content.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::constants::validation::MAX_GRID_DIMENSION;
use crate::error::GridError;
use crate::types::{CellId, Span};

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub span: Span,
    pub job: String,
    pub widget: String,
    pub config_text: String,
    pub hidden: bool,
    /// Configuration key carried over from an imported document
    pub config_key: Option<String>,
}

impl Cell {
    fn new(id: CellId, span: Span) -> Self {
        Self {
            id,
            span,
            job: String::new(),
            widget: String::new(),
            config_text: String::new(),
            hidden: false,
            config_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridModel {
    cells: BTreeMap<CellId, Cell>,
    insertion: Vec<CellId>,
    next_id: u32,
    columns: u32,
    rows: u32,
}

impl GridModel {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            cells: BTreeMap::new(),
            insertion: Vec::new(),
            next_id: 0,
            columns: columns.clamp(1, MAX_GRID_DIMENSION),
            rows: rows.clamp(1, MAX_GRID_DIMENSION),
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Set the grid size, clamped to `1..=MAX_GRID_DIMENSION` on each axis
    pub fn set_dimensions(&mut self, columns: u32, rows: u32) {
        self.columns = columns.clamp(1, MAX_GRID_DIMENSION);
        self.rows = rows.clamp(1, MAX_GRID_DIMENSION);
    }

    pub fn capacity(&self) -> u32 {
        self.columns.saturating_mul(self.rows)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grid slots covered by all live cells, hidden fillers included
    pub fn occupied_slots(&self) -> u32 {
        self.cells
            .values()
            .fold(0u32, |total, c| total.saturating_add(c.span.area()))
    }

    /// Allocate a new visible cell
    pub fn create_cell(&mut self, span: Span) -> CellId {
        let id = CellId(self.next_id);
        self.next_id += 1;
        self.cells.insert(id, Cell::new(id, span));
        self.insertion.push(id);
        debug!(cell = %id, width = span.width, height = span.height, "Created cell");
        id
    }

    /// Allocate a cell and fill in its content before it becomes visible to callers
    pub fn create_cell_with(&mut self, span: Span, fill: impl FnOnce(&mut Cell)) -> CellId {
        let id = self.create_cell(span);
        if let Some(cell) = self.cells.get_mut(&id) {
            fill(cell);
        }
        id
    }

    pub fn remove_cell(&mut self, id: CellId) -> Result<Cell, GridError> {
        let cell = self.cells.remove(&id).ok_or(GridError::NotFound(id))?;
        self.insertion.retain(|c| *c != id);
        debug!(cell = %id, "Removed cell");
        Ok(cell)
    }

    /// Remove every listed cell. Fails without removing anything if one id is unknown.
    pub fn remove_cells(&mut self, ids: &[CellId]) -> Result<(), GridError> {
        if let Some(missing) = ids.iter().find(|id| !self.cells.contains_key(id)) {
            return Err(GridError::NotFound(*missing));
        }
        for id in ids {
            self.remove_cell(*id)?;
        }
        Ok(())
    }

    /// Drop all cells and restart id allocation at zero
    pub fn clear(&mut self) {
        info!(cells = self.cells.len(), "Clearing grid");
        self.cells.clear();
        self.insertion.clear();
        self.next_id = 0;
    }

    pub fn mark_hidden(&mut self, id: CellId) -> Result<(), GridError> {
        self.cell_mut(id)?.hidden = true;
        Ok(())
    }

    pub fn is_hidden(&self, id: CellId) -> Result<bool, GridError> {
        Ok(self.cell(id)?.hidden)
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains_key(&id)
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell, GridError> {
        self.cells.get(&id).ok_or(GridError::NotFound(id))
    }

    pub fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell, GridError> {
        self.cells.get_mut(&id).ok_or(GridError::NotFound(id))
    }

    /// Cells in insertion order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.insertion.iter().filter_map(|id| self.cells.get(id))
    }
}

impl Default for GridModel {
    fn default() -> Self {
        use crate::constants::grid::{DEFAULT_COLUMNS, DEFAULT_ROWS};
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}
