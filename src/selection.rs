//! Cells picked by the user for resize, merge and delete

use crate::types::CellId;

/// Up to two selected cells, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    cells: Vec<CellId>,
}

impl SelectionSet {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Select a cell. Selecting an already selected cell is a no-op; a third
    /// selection evicts the oldest one.
    pub fn select(&mut self, id: CellId) {
        if self.contains(id) {
            return;
        }
        if self.cells.len() == Self::CAPACITY {
            self.cells.remove(0);
        }
        self.cells.push(id);
    }

    pub fn deselect(&mut self, id: CellId) -> bool {
        let before = self.cells.len();
        self.cells.retain(|c| *c != id);
        before != self.cells.len()
    }

    /// Returns true when the cell ends up selected
    pub fn toggle(&mut self, id: CellId) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.select(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.cells.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Most recently selected cell
    pub fn latest(&self) -> Option<CellId> {
        self.cells.last().copied()
    }

    pub fn pair(&self) -> Option<(CellId, CellId)> {
        match self.cells.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> &[CellId] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_idempotent() {
        let mut sel = SelectionSet::new();
        sel.select(CellId(1));
        sel.select(CellId(1));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_third_selection_evicts_oldest() {
        let mut sel = SelectionSet::new();
        sel.select(CellId(1));
        sel.select(CellId(2));
        sel.select(CellId(3));
        assert_eq!(sel.pair(), Some((CellId(2), CellId(3))));
    }

    #[test]
    fn test_toggle() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(CellId(4)));
        assert_eq!(sel.latest(), Some(CellId(4)));
        assert!(!sel.toggle(CellId(4)));
        assert!(sel.is_empty());
    }
}
