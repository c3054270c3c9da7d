//! Export: read back the layout engine's order and geometry and build the document

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config_text::parse_config_text;
use crate::document::{GridDocument, GridSize, LayoutSection, WidgetEntry};
use crate::error::ConfigDiagnostic;
use crate::geometry::GeometryResolver;
use crate::layout::LayoutEngine;
use crate::model::{Cell, GridModel};

/// Where the exported row count comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowsSource {
    /// The row count the user entered
    #[default]
    Explicit,
    /// The bottom row reached by the last visible cell
    LastVisible,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions<'a> {
    pub title: &'a str,
    pub title_visible: bool,
    pub rows_source: RowsSource,
}

#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub document: GridDocument,
    /// Cells whose config text did not parse; their widgets reference no configuration
    pub diagnostics: Vec<ConfigDiagnostic>,
}

impl ExportOutcome {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Configuration key for a cell: the key it was imported with, else `<job>_<id>`
fn config_key_for(cell: &Cell) -> String {
    match &cell.config_key {
        Some(key) if !key.is_empty() => key.clone(),
        _ if cell.job.is_empty() => format!("config_{}", cell.id),
        _ => format!("{}_{}", cell.job, cell.id),
    }
}

/// Store a parsed configuration and return the key the widget should reference.
///
/// Cells sharing a key keep it only while their configurations agree. On a
/// conflict the key gets `_<id>` and then a counter appended until it names a
/// free entry or an equal value; existing entries are never overwritten.
fn attach_config(configs: &mut BTreeMap<String, Value>, cell: &Cell, value: Value) -> String {
    let base = config_key_for(cell);
    let mut key = base.clone();
    let mut attempt = 0u32;
    loop {
        match configs.get(&key) {
            None => {
                configs.insert(key.clone(), value);
                break;
            }
            Some(existing) if *existing == value => break,
            Some(_) => {
                attempt += 1;
                key = match attempt {
                    1 => format!("{base}_{}", cell.id),
                    n => format!("{base}_{}_{n}", cell.id),
                };
            }
        }
    }
    if key != base {
        warn!(cell = %cell.id, key = %base, unique = %key, "Configuration key already used with different contents");
    }
    key
}

/// Build the document for the current session state.
///
/// Synchronizes the layout first so drag reorders are reflected. Hidden
/// filler cells are skipped. Bad config text never aborts the export.
pub fn export_document<L, R>(
    grid: &GridModel,
    layout: &mut L,
    resolver: &R,
    options: &ExportOptions<'_>,
) -> ExportOutcome
where
    L: LayoutEngine + ?Sized,
    R: GeometryResolver + ?Sized,
{
    layout.synchronize();
    layout.refresh_and_relayout();

    let columns = grid.columns();
    let mut widgets = Vec::new();
    let mut configs = BTreeMap::new();
    let mut diagnostics = Vec::new();
    let mut bottom_row = 0;

    for (index, id) in layout.current_order().into_iter().enumerate() {
        let cell = match grid.cell(id) {
            Ok(cell) => cell,
            Err(err) => {
                warn!(cell = %id, error = %err, "Layout reports a cell the grid does not know");
                continue;
            }
        };
        if cell.hidden {
            continue;
        }
        let Some(geometry) = layout.geometry_of(id) else {
            warn!(cell = %id, "No geometry for cell, skipping");
            continue;
        };

        let position = resolver.grid_position(index, &geometry, columns);
        let span = resolver.span_of(&geometry);
        bottom_row = bottom_row.max(resolver.last_row(position, span));

        let config = match parse_config_text(&cell.config_text) {
            Ok(None) => String::new(),
            Ok(Some(value)) => attach_config(&mut configs, cell, value),
            Err(failure) => {
                let diagnostic = ConfigDiagnostic {
                    cell: id,
                    position,
                    message: failure.message,
                    text: cell.config_text.trim().to_string(),
                };
                warn!(cell = %id, %diagnostic, "Config text failed to parse");
                diagnostics.push(diagnostic);
                String::new()
            }
        };

        debug!(cell = %id, col = position.column, row = position.row, width = span.width, height = span.height, "Exported cell");
        widgets.push(WidgetEntry {
            col: position.column,
            row: position.row,
            width: span.width,
            height: span.height,
            job: cell.job.clone(),
            widget: cell.widget.clone(),
            config,
        });
    }

    let rows = match options.rows_source {
        RowsSource::Explicit => grid.rows(),
        RowsSource::LastVisible => bottom_row.max(1),
    };

    info!(
        widgets = widgets.len(),
        configs = configs.len(),
        diagnostics = diagnostics.len(),
        columns = columns,
        rows = rows,
        "Exported layout document"
    );

    ExportOutcome {
        document: GridDocument {
            title: options.title.to_string(),
            title_visible: options.title_visible,
            layout: LayoutSection {
                grid_size: GridSize { columns, rows },
                widgets,
            },
            config: configs,
        },
        diagnostics,
    }
}
