//! The exported dashboard layout document and its lenient import parser

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config_text::parse_json;
use crate::constants::grid::{MIN_INFERRED_COLUMNS, MIN_INFERRED_ROWS};
use crate::constants::validation::MAX_GRID_DIMENSION;
use crate::error::GridError;
use crate::types::{GridPos, Span};

/// Top-level document consumed by the dashboard renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    pub title: String,
    #[serde(rename = "titleVisible")]
    pub title_visible: bool,
    pub layout: LayoutSection,
    /// Configurations keyed by the name widgets reference. Sorted, so output is stable.
    pub config: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSection {
    #[serde(rename = "gridSize")]
    pub grid_size: GridSize,
    pub widgets: Vec<WidgetEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub columns: u32,
    pub rows: u32,
}

/// One placed cell. `config` is a key into `GridDocument::config`, empty for none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetEntry {
    pub col: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
    pub job: String,
    pub widget: String,
    pub config: String,
}

impl WidgetEntry {
    pub fn position(&self) -> GridPos {
        GridPos::new(self.col, self.row)
    }

    pub fn span(&self) -> Span {
        Span::new(self.width, self.height)
    }

    /// Whether the widget covers the given 1-based slot
    pub fn covers(&self, column: u32, row: u32) -> bool {
        column >= self.col
            && column < self.col.saturating_add(self.width)
            && row >= self.row
            && row < self.row.saturating_add(self.height)
    }

    /// Last column the widget reaches (1-based, inclusive)
    pub fn last_column(&self) -> u32 {
        self.col.saturating_add(self.width).saturating_sub(1)
    }

    /// Last row the widget reaches (1-based, inclusive)
    pub fn last_row(&self) -> u32 {
        self.row.saturating_add(self.height).saturating_sub(1)
    }
}

// Import side: everything optional so shape problems can be reported precisely

#[derive(Debug, Deserialize)]
struct IncomingDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "titleVisible")]
    title_visible: Option<bool>,
    #[serde(default)]
    layout: Option<IncomingLayout>,
    #[serde(default)]
    widgets: Option<Vec<IncomingWidget>>,
    #[serde(default)]
    config: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct IncomingLayout {
    #[serde(default, rename = "gridSize")]
    grid_size: Option<GridSize>,
    #[serde(default)]
    widgets: Option<Vec<IncomingWidget>>,
}

#[derive(Debug, Deserialize)]
struct IncomingWidget {
    col: u32,
    row: u32,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    job: Option<String>,
    #[serde(default)]
    widget: Option<String>,
    #[serde(default)]
    config: Option<String>,
}

/// Grid size covering every widget, never smaller than 3x3
pub fn infer_grid_size(widgets: &[WidgetEntry]) -> GridSize {
    let columns = widgets
        .iter()
        .map(WidgetEntry::last_column)
        .fold(MIN_INFERRED_COLUMNS, u32::max);
    let rows = widgets
        .iter()
        .map(WidgetEntry::last_row)
        .fold(MIN_INFERRED_ROWS, u32::max);
    GridSize { columns, rows }
}

impl GridDocument {
    /// Parse and validate an uploaded document.
    ///
    /// Accepts widgets under `layout.widgets` or at the top level, and infers
    /// the grid size when `layout.gridSize` is absent.
    pub fn from_json_str(text: &str) -> Result<Self, GridError> {
        let value = parse_json(text).map_err(|e| {
            GridError::ImportShape(format!(
                "document is not valid JSON (line {}, column {}): {}",
                e.line, e.column, e.message
            ))
        })?;
        let incoming: IncomingDocument = serde_json::from_value(value)
            .map_err(|e| GridError::ImportShape(format!("unexpected document structure: {e}")))?;

        let layout = incoming
            .layout
            .ok_or_else(|| GridError::ImportShape("missing `layout`".to_string()))?;
        let raw_widgets = layout
            .widgets
            .or(incoming.widgets)
            .ok_or_else(|| GridError::ImportShape("missing `widgets`".to_string()))?;

        let mut widgets = Vec::with_capacity(raw_widgets.len());
        for (index, w) in raw_widgets.into_iter().enumerate() {
            if w.col == 0 || w.row == 0 {
                return Err(GridError::ImportShape(format!(
                    "widget {index} is at col {} row {}; positions are 1-based",
                    w.col, w.row
                )));
            }
            let width = w.width.unwrap_or(1);
            let height = w.height.unwrap_or(1);
            if width == 0 || height == 0 {
                warn!(widget = index, width = width, height = height, "Zero-sized widget, using 1");
            }
            let span = Span::new(width, height);
            let entry = WidgetEntry {
                col: w.col,
                row: w.row,
                width: span.width,
                height: span.height,
                job: w.job.unwrap_or_default(),
                widget: w.widget.unwrap_or_default(),
                config: w.config.unwrap_or_default(),
            };
            if entry.last_column() > MAX_GRID_DIMENSION || entry.last_row() > MAX_GRID_DIMENSION {
                return Err(GridError::ImportShape(format!(
                    "widget {index} reaches col {} row {}; the grid is limited to {MAX_GRID_DIMENSION}x{MAX_GRID_DIMENSION}",
                    entry.last_column(),
                    entry.last_row()
                )));
            }
            widgets.push(entry);
        }

        if let Some(size) = layout.grid_size {
            if size.columns > MAX_GRID_DIMENSION || size.rows > MAX_GRID_DIMENSION {
                return Err(GridError::ImportShape(format!(
                    "gridSize {}x{} exceeds the {MAX_GRID_DIMENSION}x{MAX_GRID_DIMENSION} limit",
                    size.columns, size.rows
                )));
            }
        }

        let grid_size = match layout.grid_size {
            Some(size) if size.columns > 0 && size.rows > 0 => size,
            _ => {
                let inferred = infer_grid_size(&widgets);
                info!(columns = inferred.columns, rows = inferred.rows, "Inferred grid size from widgets");
                inferred
            }
        };

        Ok(Self {
            title: incoming.title.unwrap_or_default(),
            title_visible: incoming.title_visible.unwrap_or(false),
            layout: LayoutSection { grid_size, widgets },
            config: incoming.config.unwrap_or_default(),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize layout document")
    }

    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?)
            .with_context(|| format!("Failed to write layout document to {:?}", path))?;
        info!(path = %path.display(), widgets = self.layout.widgets.len(), "Saved layout document");
        Ok(())
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout document from {:?}", path))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Failed to load layout document from {:?}", path))
    }
}
