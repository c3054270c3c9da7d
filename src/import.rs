//! Import: rebuild the session's cells from a validated document
//!
//! Every slot of the grid is visited in row-major order. A slot claimed by a
//! widget creates that widget's cell the first time the widget is seen; an
//! unclaimed slot creates a hidden 1x1 filler so the packer puts later widgets
//! back where they were.

use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::config_text::config_value_to_text;
use crate::constants::validation::MAX_GRID_DIMENSION;
use crate::document::{GridDocument, GridSize, WidgetEntry};
use crate::layout::LayoutEngine;
use crate::model::GridModel;
use crate::types::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedCell {
    /// Index into the document's widget list
    Widget(usize),
    Filler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub grid_size: GridSize,
    pub placed: usize,
    pub fillers: usize,
    /// Widgets that lie outside the grid and were not placed
    pub dropped: Vec<usize>,
}

/// Cells to create, in creation order, plus the widgets that could not be placed
pub fn plan_cells(doc: &GridDocument) -> (Vec<PlannedCell>, Vec<usize>) {
    let columns = doc.layout.grid_size.columns.min(MAX_GRID_DIMENSION);
    let rows = doc.layout.grid_size.rows.min(MAX_GRID_DIMENSION);
    let widgets = &doc.layout.widgets;

    // Only slots inside the grid are ever visited, so the map stops at its edges
    let mut slots: HashMap<(u32, u32), usize> = HashMap::new();
    for (index, widget) in widgets.iter().enumerate() {
        for col in widget.col..=widget.last_column().min(columns) {
            for row in widget.row..=widget.last_row().min(rows) {
                if let Some(previous) = slots.insert((col, row), index) {
                    warn!(slot_col = col, slot_row = row, previous = previous, widget = index, "Widgets overlap, later widget claims the slot");
                }
            }
        }
        if widget.last_column() > columns {
            warn!(widget = index, col = widget.col, width = widget.width, columns = columns, "Widget extends past the last column");
        }
    }

    let mut placed = HashSet::new();
    let mut plan = Vec::with_capacity((columns * rows) as usize);
    for row in 1..=rows {
        for col in 1..=columns {
            match slots.get(&(col, row)) {
                Some(&index) => {
                    if placed.insert(index) {
                        plan.push(PlannedCell::Widget(index));
                    }
                }
                None => plan.push(PlannedCell::Filler),
            }
        }
    }

    let dropped: Vec<usize> = (0..widgets.len()).filter(|i| !placed.contains(i)).collect();
    (plan, dropped)
}

fn config_text_for(doc: &GridDocument, widget: &WidgetEntry) -> String {
    if widget.config.is_empty() {
        return String::new();
    }
    match doc.config.get(&widget.config) {
        Some(value) => config_value_to_text(value),
        None => {
            warn!(key = %widget.config, "Widget references a configuration that is not in the document");
            String::new()
        }
    }
}

/// Replace the grid and layout contents with the document's cells.
///
/// The document must already be validated (see `GridDocument::from_json_str`);
/// nothing here can fail, so the session is never left half-imported.
pub fn import_document<L>(doc: &GridDocument, grid: &mut GridModel, layout: &mut L) -> ImportReport
where
    L: LayoutEngine + ?Sized,
{
    let (plan, dropped) = plan_cells(doc);
    let grid_size = doc.layout.grid_size;

    grid.clear();
    layout.clear();
    grid.set_dimensions(grid_size.columns, grid_size.rows);
    layout.set_columns(grid.columns());

    let mut placed = 0;
    let mut fillers = 0;
    for planned in plan {
        let (id, span) = match planned {
            PlannedCell::Widget(index) => {
                let widget = &doc.layout.widgets[index];
                let span = widget.span();
                let config_text = config_text_for(doc, widget);
                let id = grid.create_cell_with(span, |cell| {
                    cell.job = widget.job.clone();
                    cell.widget = widget.widget.clone();
                    cell.config_text = config_text;
                    cell.config_key = (!widget.config.is_empty()).then(|| widget.config.clone());
                });
                placed += 1;
                (id, span)
            }
            PlannedCell::Filler => {
                let id = grid.create_cell_with(Span::UNIT, |cell| cell.hidden = true);
                fillers += 1;
                (id, Span::UNIT)
            }
        };
        layout.add(id, span);
    }

    layout.refresh_and_relayout();
    layout.synchronize();

    for index in &dropped {
        warn!(widget = *index, "Widget lies outside the grid and was not placed");
    }
    info!(
        columns = grid_size.columns,
        rows = grid_size.rows,
        placed = placed,
        fillers = fillers,
        dropped = dropped.len(),
        "Imported layout document"
    );

    ImportReport {
        grid_size,
        placed,
        fillers,
        dropped,
    }
}
