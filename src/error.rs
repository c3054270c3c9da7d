//! Domain errors for grid editing, import and export

use std::fmt;

use crate::types::{CellId, GridPos};

/// Errors raised at operation boundaries. None of them leave the session in a
/// partially mutated state.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("cell {0} does not exist")]
    NotFound(CellId),

    #[error("import rejected: {0}")]
    ImportShape(String),

    #[error("cells {first} and {second} cannot be merged: {reason}")]
    AdjacencyRejected {
        first: CellId,
        second: CellId,
        reason: &'static str,
    },

    #[error("grid is full ({capacity} slots)")]
    CapacityExceeded { capacity: u32 },

    #[error("selection error: {0}")]
    Selection(&'static str),
}

/// Non-fatal problem with one cell's config text found during export
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDiagnostic {
    pub cell: CellId,
    pub position: GridPos,
    pub message: String,
    pub text: String,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gridRow: {}, gridColumn: {}  ERROR : {} : {}",
            self.position.row, self.position.column, self.message, self.text
        )
    }
}
