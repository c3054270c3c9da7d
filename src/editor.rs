//! Editing session: the grid, its layout, the selection and document I/O
//!
//! All user operations go through `Editor`. It keeps the grid model and the
//! layout engine in step and is the only place that touches both.

use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::constants::validation::MAX_GRID_DIMENSION;
use crate::document::GridDocument;
use crate::error::{ConfigDiagnostic, GridError};
use crate::export::{ExportOptions, ExportOutcome, RowsSource, export_document};
use crate::geometry::{GeometryResolver, UnitGrid};
use crate::import::{ImportReport, import_document};
use crate::layout::{DragOrigin, LayoutEngine, PackingLayout};
use crate::model::{Cell, GridModel};
use crate::selection::SelectionSet;
use crate::types::{CellId, Span};
use crate::upload::{UploadGate, UploadTicket, read_upload};

#[derive(Debug)]
pub struct Editor<L = PackingLayout> {
    grid: GridModel,
    layout: L,
    resolver: UnitGrid,
    selection: SelectionSet,
    catalog: Catalog,
    title: String,
    title_visible: bool,
    rows_source: RowsSource,
    enforce_capacity: bool,
    uploads: UploadGate,
}

impl Editor<PackingLayout> {
    /// Session backed by the in-memory packing layout
    pub fn new(settings: &Settings, catalog: Catalog) -> Self {
        let resolver = settings.unit_grid();
        let layout = PackingLayout::new(resolver, settings.default_columns);
        Self::with_layout(settings, catalog, layout)
    }
}

impl<L: LayoutEngine> Editor<L> {
    pub fn with_layout(settings: &Settings, catalog: Catalog, mut layout: L) -> Self {
        layout.set_columns(settings.default_columns);
        Self {
            grid: GridModel::new(settings.default_columns, settings.default_rows),
            layout,
            resolver: settings.unit_grid(),
            selection: SelectionSet::new(),
            catalog,
            title: String::new(),
            title_visible: false,
            rows_source: settings.rows_source,
            enforce_capacity: settings.enforce_capacity,
            uploads: UploadGate::new(),
        }
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_visible(&self) -> bool {
        self.title_visible
    }

    pub fn cell(&self, id: CellId) -> Result<&Cell, GridError> {
        self.grid.cell(id)
    }

    pub fn set_rows_source(&mut self, rows_source: RowsSource) {
        self.rows_source = rows_source;
    }

    /// Remove every cell and forget the selection. Title and settings survive.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.layout.clear();
        self.selection.clear();
        self.uploads.cancel_all();
    }

    /// Replace the session with a `columns` x `rows` grid of empty unit cells.
    /// Each dimension is clamped to `MAX_GRID_DIMENSION`.
    pub fn create_grid(&mut self, columns: u32, rows: u32) {
        if columns > MAX_GRID_DIMENSION || rows > MAX_GRID_DIMENSION {
            warn!(columns = columns, rows = rows, max = MAX_GRID_DIMENSION, "Grid size exceeds maximum, clamping");
        }
        self.clear();
        self.grid.set_dimensions(columns, rows);
        self.layout.set_columns(self.grid.columns());

        for _ in 0..self.grid.capacity() {
            let id = self.grid.create_cell(Span::UNIT);
            self.layout.add(id, Span::UNIT);
        }
        self.layout.refresh_and_relayout();
        self.layout.synchronize();
        info!(columns = self.grid.columns(), rows = self.grid.rows(), "Created grid");
    }

    /// Append a 1x1 cell
    pub fn add_cell(&mut self) -> Result<CellId, GridError> {
        if self.enforce_capacity && self.grid.occupied_slots() >= self.grid.capacity() {
            warn!(capacity = self.grid.capacity(), "Grid is full, not adding a cell");
            return Err(GridError::CapacityExceeded {
                capacity: self.grid.capacity(),
            });
        }
        let id = self.grid.create_cell(Span::UNIT);
        self.layout.add(id, Span::UNIT);
        self.layout.refresh_and_relayout();
        Ok(id)
    }

    pub fn mark_hidden(&mut self, id: CellId) -> Result<(), GridError> {
        self.grid.mark_hidden(id)
    }

    /// Delete every selected cell
    pub fn remove_selected(&mut self) -> Result<Vec<CellId>, GridError> {
        if self.selection.is_empty() {
            return Err(GridError::Selection("no cell selected"));
        }
        let ids = self.selection.as_slice().to_vec();
        self.grid.remove_cells(&ids)?;
        self.layout.remove(&ids, true);
        self.selection.clear();
        info!(cells = ?ids, "Removed selected cells");
        Ok(ids)
    }

    /// Resize the most recently selected cell, clamping each dimension to
    /// `1..=MAX_GRID_DIMENSION`
    pub fn resize_selected(&mut self, width: u32, height: u32) -> Result<Span, GridError> {
        let id = self
            .selection
            .latest()
            .ok_or(GridError::Selection("no cell selected"))?;
        let span = Span::new(width.min(MAX_GRID_DIMENSION), height.min(MAX_GRID_DIMENSION));
        self.grid.cell_mut(id)?.span = span;
        self.layout.resize(id, span)?;
        self.layout.refresh_and_relayout();
        debug!(cell = %id, width = span.width, height = span.height, "Resized cell");
        Ok(span)
    }

    /// Merge the two selected cells into the left/top one.
    ///
    /// The surviving cell keeps its content and takes the merged span; the
    /// other cell is removed. Nothing changes when the cells do not touch.
    pub fn merge_selected(&mut self) -> Result<CellId, GridError> {
        let (a, b) = self
            .selection
            .pair()
            .ok_or(GridError::Selection("merge needs exactly two selected cells"))?;

        self.layout.refresh_and_relayout();
        let geometry_a = self.layout.geometry_of(a).ok_or(GridError::NotFound(a))?;
        let geometry_b = self.layout.geometry_of(b).ok_or(GridError::NotFound(b))?;

        let Some(span) = self.resolver.merged_span(&geometry_a, &geometry_b) else {
            warn!(first = %a, second = %b, "Selected cells are not adjacent, merge rejected");
            return Err(GridError::AdjacencyRejected {
                first: a,
                second: b,
                reason: "cells do not share an edge of the same length",
            });
        };

        // Left cell first, then top cell
        let (keep, absorbed) = if (geometry_a.left, geometry_a.top) <= (geometry_b.left, geometry_b.top) {
            (a, b)
        } else {
            (b, a)
        };

        self.grid.remove_cell(absorbed)?;
        self.layout.remove(&[absorbed], false);
        self.grid.cell_mut(keep)?.span = span;
        self.layout.resize(keep, span)?;
        self.layout.refresh_and_relayout();
        self.selection.clear();

        info!(kept = %keep, absorbed = %absorbed, width = span.width, height = span.height, "Merged cells");
        Ok(keep)
    }

    /// Returns true when the cell ends up selected
    pub fn toggle_select(&mut self, id: CellId) -> Result<bool, GridError> {
        if !self.grid.contains(id) {
            return Err(GridError::NotFound(id));
        }
        Ok(self.selection.toggle(id))
    }

    /// Config text of the most recently selected cell
    pub fn selected_config_text(&self) -> Option<&str> {
        let id = self.selection.latest()?;
        self.grid.cell(id).ok().map(|c| c.config_text.as_str())
    }

    pub fn edit_selected_config(&mut self, text: &str) -> Result<(), GridError> {
        let id = self
            .selection
            .latest()
            .ok_or(GridError::Selection("no cell selected"))?;
        self.set_config_text(id, text)
    }

    /// Set a cell's job. A widget of the same name is picked along with it and
    /// the config text is reset to the widget's template.
    pub fn set_job(&mut self, id: CellId, job: &str) -> Result<(), GridError> {
        let matching_widget = self.catalog.widget_for_job(job).map(str::to_string);
        let cell = self.grid.cell_mut(id)?;
        cell.job = job.to_string();
        if let Some(widget) = matching_widget {
            cell.widget = widget;
        }
        cell.config_text = self.catalog.template_for(&cell.widget).to_string();
        debug!(cell = %id, job = %cell.job, widget = %cell.widget, "Job changed");
        Ok(())
    }

    /// Set a cell's widget and reset its config text to the widget's template
    pub fn set_widget(&mut self, id: CellId, widget: &str) -> Result<(), GridError> {
        let template = self.catalog.template_for(widget).to_string();
        let cell = self.grid.cell_mut(id)?;
        cell.widget = widget.to_string();
        cell.config_text = template;
        Ok(())
    }

    pub fn set_config_text(&mut self, id: CellId, text: &str) -> Result<(), GridError> {
        self.grid.cell_mut(id)?.config_text = text.to_string();
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn set_title_visible(&mut self, visible: bool) {
        self.title_visible = visible;
    }

    /// Whether a drag starting at `origin` on cell `id` may proceed
    pub fn begin_drag(&self, id: CellId, origin: DragOrigin) -> Result<bool, GridError> {
        if !self.grid.contains(id) {
            return Err(GridError::NotFound(id));
        }
        let allowed = origin.allows_drag();
        if !allowed {
            debug!(cell = %id, "Drag suppressed by control");
        }
        Ok(allowed)
    }

    pub fn swap_cells(&mut self, a: CellId, b: CellId) -> Result<(), GridError> {
        self.layout.swap(a, b)
    }

    pub fn move_cell(&mut self, id: CellId, index: usize) -> Result<(), GridError> {
        self.layout.move_to(id, index)
    }

    /// Cell covering the 1-based slot, hidden fillers included
    pub fn cell_at(&self, column: u32, row: u32) -> Option<CellId> {
        self.layout.current_order().into_iter().find(|id| {
            self.layout.geometry_of(*id).is_some_and(|geometry| {
                let origin = self.resolver.pixel_to_grid(&geometry);
                let span = self.resolver.span_of(&geometry);
                (origin.column..origin.column + span.width).contains(&column)
                    && (origin.row..origin.row + span.height).contains(&row)
            })
        })
    }

    pub fn export(&mut self) -> ExportOutcome {
        let options = ExportOptions {
            title: &self.title,
            title_visible: self.title_visible,
            rows_source: self.rows_source,
        };
        export_document(&self.grid, &mut self.layout, &self.resolver, &options)
    }

    /// Pretty-printed document text plus any config diagnostics
    pub fn export_json(&mut self) -> Result<(String, Vec<ConfigDiagnostic>)> {
        let outcome = self.export();
        let text = outcome.document.to_json_pretty()?;
        Ok((text, outcome.diagnostics))
    }

    /// Replace the session with the document. Invalid documents leave it untouched.
    pub fn import_json(&mut self, text: &str) -> Result<ImportReport, GridError> {
        let doc = GridDocument::from_json_str(text)?;
        Ok(self.apply_document(&doc))
    }

    pub fn apply_document(&mut self, doc: &GridDocument) -> ImportReport {
        self.selection.clear();
        let report = import_document(doc, &mut self.grid, &mut self.layout);
        self.title = doc.title.clone();
        self.title_visible = doc.title_visible;
        report
    }

    pub fn begin_upload(&self) -> UploadTicket {
        self.uploads.begin()
    }

    /// Apply an upload's text unless a newer upload has started since
    pub fn finish_upload(
        &mut self,
        ticket: &UploadTicket,
        text: &str,
    ) -> Result<Option<ImportReport>, GridError> {
        if !ticket.is_current() {
            info!(generation = ticket.generation(), "Discarding superseded upload");
            return Ok(None);
        }
        self.import_json(text).map(Some)
    }

    /// Read a file and import it, unless another upload supersedes it meanwhile
    pub async fn upload_file(&mut self, path: impl AsRef<Path>) -> Result<Option<ImportReport>> {
        let ticket = self.begin_upload();
        let text = read_upload(path).await?;
        Ok(self.finish_upload(&ticket, &text)?)
    }

    pub fn save_document(&mut self, path: impl AsRef<Path>) -> Result<Vec<ConfigDiagnostic>> {
        let outcome = self.export();
        outcome.document.save_json_file(path)?;
        Ok(outcome.diagnostics)
    }

    pub fn load_document(&mut self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let path = path.as_ref();
        let doc = GridDocument::load_json_file(path)?;
        let report = self.apply_document(&doc);
        Ok(report)
    }

    /// Load a document, failing when any of its widgets had to be dropped
    pub fn load_document_strict(&mut self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let path = path.as_ref();
        let report = self.load_document(path)?;
        if !report.dropped.is_empty() {
            anyhow::bail!(
                "Incomplete import of {:?}: {} widget(s) lie outside the grid",
                path,
                report.dropped.len()
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridPos;

    fn editor() -> Editor {
        Editor::new(&Settings::default(), Catalog::builtin())
    }

    fn grid_editor(columns: u32, rows: u32) -> Editor {
        let mut e = editor();
        e.create_grid(columns, rows);
        e
    }

    #[test]
    fn test_create_grid() {
        let mut e = grid_editor(3, 2);
        assert_eq!(e.grid().len(), 6);

        let out = e.export();
        assert_eq!(out.document.layout.widgets.len(), 6);
        assert_eq!(out.document.layout.grid_size.columns, 3);
        assert_eq!(out.document.layout.grid_size.rows, 2);
        let last = out.document.layout.widgets.last().unwrap();
        assert_eq!(last.position(), GridPos::new(3, 2));
    }

    #[test]
    fn test_create_grid_replaces_cells_and_resets_ids() {
        let mut e = grid_editor(3, 3);
        e.create_grid(2, 1);
        assert_eq!(e.grid().len(), 2);
        assert!(e.cell(CellId(0)).is_ok());
        assert!(e.cell(CellId(2)).is_err());
    }

    #[test]
    fn test_create_grid_clamps_oversized_request() {
        let mut e = grid_editor(70_000, 1);
        assert_eq!(e.grid().columns(), MAX_GRID_DIMENSION);
        assert_eq!(e.grid().len(), MAX_GRID_DIMENSION as usize);

        let out = e.export();
        assert_eq!(out.document.layout.grid_size.columns, MAX_GRID_DIMENSION);
    }

    #[test]
    fn test_add_cell_capacity() {
        let settings = Settings {
            enforce_capacity: true,
            ..Settings::default()
        };
        let mut e = Editor::new(&settings, Catalog::builtin());
        e.create_grid(2, 1);

        let result = e.add_cell();
        assert!(matches!(result, Err(GridError::CapacityExceeded { capacity: 2 })));
        assert_eq!(e.grid().len(), 2);
    }

    #[test]
    fn test_add_cell_unbounded_by_default() {
        let mut e = grid_editor(2, 1);
        let id = e.add_cell().unwrap();
        assert_eq!(e.grid().len(), 3);
        assert_eq!(e.cell_at(1, 2), Some(id));
    }

    #[test]
    fn test_toggle_select_evicts_oldest() {
        let mut e = grid_editor(3, 1);
        assert!(e.toggle_select(CellId(0)).unwrap());
        assert!(e.toggle_select(CellId(1)).unwrap());
        assert!(e.toggle_select(CellId(2)).unwrap());
        assert_eq!(e.selection().as_slice(), &[CellId(1), CellId(2)]);

        assert!(!e.toggle_select(CellId(2)).unwrap());
        assert!(e.toggle_select(CellId(9)).is_err());
    }

    #[test]
    fn test_remove_selected() {
        let mut e = grid_editor(3, 1);
        assert!(matches!(e.remove_selected(), Err(GridError::Selection(_))));

        e.toggle_select(CellId(1)).unwrap();
        let removed = e.remove_selected().unwrap();
        assert_eq!(removed, vec![CellId(1)]);
        assert_eq!(e.grid().len(), 2);
        assert!(e.selection().is_empty());
        assert_eq!(e.cell_at(2, 1), Some(CellId(2)));
    }

    #[test]
    fn test_resize_selected_clamps() {
        let mut e = grid_editor(3, 2);
        e.toggle_select(CellId(0)).unwrap();
        let span = e.resize_selected(0, 2).unwrap();
        assert_eq!(span, Span::new(1, 2));

        let out = e.export();
        let first = &out.document.layout.widgets[0];
        assert_eq!((first.width, first.height), (1, 2));
    }

    #[test]
    fn test_merge_row_neighbours() {
        let mut e = grid_editor(3, 1);
        e.set_job(CellId(0), "burndown").unwrap();
        e.toggle_select(CellId(1)).unwrap();
        e.toggle_select(CellId(0)).unwrap();

        let kept = e.merge_selected().unwrap();
        assert_eq!(kept, CellId(0));
        assert_eq!(e.cell(kept).unwrap().span, Span::new(2, 1));
        assert_eq!(e.cell(kept).unwrap().job, "burndown");
        assert!(e.cell(CellId(1)).is_err());

        let out = e.export();
        let widgets = &out.document.layout.widgets;
        assert_eq!(widgets.len(), 2);
        assert_eq!((widgets[0].col, widgets[0].width), (1, 2));
        assert_eq!(widgets[1].col, 3);
    }

    #[test]
    fn test_resize_selected_clamps_to_max() {
        let mut e = grid_editor(2, 1);
        e.toggle_select(CellId(1)).unwrap();
        let span = e.resize_selected(u32::MAX, u32::MAX).unwrap();
        assert_eq!(span, Span::new(MAX_GRID_DIMENSION, MAX_GRID_DIMENSION));
        assert!(e.cell_at(1, 2).is_some());
    }

    #[test]
    fn test_merge_keeps_top_cell() {
        let mut e = grid_editor(2, 2);
        e.toggle_select(CellId(2)).unwrap();
        e.toggle_select(CellId(0)).unwrap();

        assert_eq!(e.merge_selected().unwrap(), CellId(0));
        assert!(e.cell(CellId(2)).is_err());
    }

    #[test]
    fn test_merge_column_neighbours() {
        let mut e = grid_editor(2, 2);
        e.toggle_select(CellId(0)).unwrap();
        e.toggle_select(CellId(2)).unwrap();
        e.merge_selected().unwrap();
        assert_eq!(e.cell(CellId(0)).unwrap().span, Span::new(1, 2));
    }

    #[test]
    fn test_merge_rejects_diagonal() {
        let mut e = grid_editor(3, 3);
        e.toggle_select(CellId(0)).unwrap();
        e.toggle_select(CellId(4)).unwrap();

        let result = e.merge_selected();
        assert!(matches!(result, Err(GridError::AdjacencyRejected { .. })));
        assert_eq!(e.grid().len(), 9);
        assert_eq!(e.selection().len(), 2);
    }

    #[test]
    fn test_merge_needs_two_cells() {
        let mut e = grid_editor(3, 3);
        e.toggle_select(CellId(0)).unwrap();
        assert!(matches!(e.merge_selected(), Err(GridError::Selection(_))));
    }

    #[test]
    fn test_set_job_picks_widget_and_template() {
        let mut e = grid_editor(1, 1);
        e.set_config_text(CellId(0), "\"old\": 1").unwrap();
        e.set_job(CellId(0), "zone-clock").unwrap();

        let cell = e.cell(CellId(0)).unwrap();
        assert_eq!(cell.widget, "zone-clock");
        assert_eq!(cell.config_text, "{}");
    }

    #[test]
    fn test_set_job_without_matching_widget() {
        let mut e = grid_editor(1, 1);
        e.set_widget(CellId(0), "isitup").unwrap();
        e.set_job(CellId(0), "custom-job").unwrap();

        let cell = e.cell(CellId(0)).unwrap();
        assert_eq!(cell.job, "custom-job");
        assert_eq!(cell.widget, "isitup");
    }

    #[test]
    fn test_edit_selected_config() {
        let mut e = grid_editor(2, 1);
        assert!(e.edit_selected_config("{}").is_err());
        assert_eq!(e.selected_config_text(), None);

        e.toggle_select(CellId(1)).unwrap();
        e.edit_selected_config("\"x\": 1").unwrap();
        assert_eq!(e.selected_config_text(), Some("\"x\": 1"));
        assert_eq!(e.cell(CellId(1)).unwrap().config_text, "\"x\": 1");
    }

    #[test]
    fn test_begin_drag_respects_controls() {
        let e = grid_editor(2, 1);
        assert!(e.begin_drag(CellId(0), DragOrigin::Cell).unwrap());
        assert!(!e.begin_drag(CellId(0), DragOrigin::Control { suppresses_drag: true }).unwrap());
        assert!(e.begin_drag(CellId(0), DragOrigin::Control { suppresses_drag: false }).unwrap());
        assert!(e.begin_drag(CellId(7), DragOrigin::Cell).is_err());
    }

    #[test]
    fn test_swap_reflected_in_export() {
        let mut e = grid_editor(2, 1);
        e.set_job(CellId(0), "burndown").unwrap();
        e.set_job(CellId(1), "isitup").unwrap();
        e.swap_cells(CellId(0), CellId(1)).unwrap();

        let out = e.export();
        let widgets = &out.document.layout.widgets;
        assert_eq!(widgets[0].job, "isitup");
        assert_eq!(widgets[0].col, 1);
        assert_eq!(widgets[1].job, "burndown");
        assert_eq!(widgets[1].col, 2);
    }

    #[test]
    fn test_move_cell() {
        let mut e = grid_editor(3, 1);
        e.move_cell(CellId(2), 0).unwrap();
        e.export();
        assert_eq!(e.layout().current_order(), vec![CellId(2), CellId(0), CellId(1)]);
        assert_eq!(e.cell_at(1, 1), Some(CellId(2)));
    }

    #[test]
    fn test_hidden_cells_and_last_visible_rows() {
        let mut e = grid_editor(3, 2);
        e.set_rows_source(RowsSource::LastVisible);
        e.mark_hidden(CellId(4)).unwrap();
        e.mark_hidden(CellId(5)).unwrap();

        let out = e.export();
        assert_eq!(out.document.layout.widgets.len(), 4);
        assert_eq!(out.document.layout.grid_size.rows, 2);

        e.mark_hidden(CellId(3)).unwrap();
        let out = e.export();
        assert_eq!(out.document.layout.widgets.len(), 3);
        assert_eq!(out.document.layout.grid_size.rows, 1);
    }

    #[test]
    fn test_export_json_reports_diagnostics() {
        let mut e = grid_editor(2, 1);
        e.set_job(CellId(0), "burndown").unwrap();
        e.set_config_text(CellId(0), "x=1").unwrap();
        e.set_title("Ops");

        let (text, diagnostics) = e.export_json().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].position, GridPos::new(1, 1));
        assert!(text.contains("\"title\": \"Ops\""));
        assert!(!text.contains("burndown_0"));
    }

    #[test]
    fn test_export_twice_identical() {
        let mut e = grid_editor(3, 1);
        e.set_job(CellId(0), "zone-clock").unwrap();
        e.set_config_text(CellId(0), "\"zones\": [\"UTC\"]").unwrap();
        let (first, _) = e.export_json().unwrap();
        let (second, _) = e.export_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_import_json_replaces_session() {
        let mut e = grid_editor(3, 3);
        e.toggle_select(CellId(0)).unwrap();
        let report = e
            .import_json(
                r#"{"title": "T", "titleVisible": true,
                    "layout": {"gridSize": {"columns": 2, "rows": 1},
                    "widgets": [{"col": 2, "row": 1, "job": "isitup", "widget": "isitup"}]}}"#,
            )
            .unwrap();

        assert_eq!(report.placed, 1);
        assert_eq!(report.fillers, 1);
        assert_eq!(e.title(), "T");
        assert!(e.title_visible());
        assert!(e.selection().is_empty());
        assert_eq!(e.cell_at(2, 1), Some(CellId(1)));
    }

    #[test]
    fn test_bad_import_leaves_session_intact() {
        let mut e = grid_editor(3, 3);
        e.set_title("Keep");
        let result = e.import_json(r#"{"widgets": []}"#);
        assert!(matches!(result, Err(GridError::ImportShape(_))));
        assert_eq!(e.grid().len(), 9);
        assert_eq!(e.title(), "Keep");
    }

    #[test]
    fn test_oversized_import_rejected_before_mutation() {
        let mut e = grid_editor(3, 3);
        let result = e.import_json(r#"{"layout": {"gridSize": {"columns": 70000, "rows": 70000}, "widgets": []}}"#);
        assert!(matches!(result, Err(GridError::ImportShape(_))));
        assert_eq!(e.grid().len(), 9);
    }

    #[test]
    fn test_stale_upload_discarded() {
        let mut e = grid_editor(3, 3);
        let doc = r#"{"layout": {"widgets": [{"col": 1, "row": 1}]}}"#;

        let first = e.begin_upload();
        let second = e.begin_upload();
        assert_eq!(e.finish_upload(&first, doc).unwrap(), None);
        assert_eq!(e.grid().len(), 9);

        let report = e.finish_upload(&second, doc).unwrap().unwrap();
        assert_eq!(report.placed, 1);
    }

    #[tokio::test]
    async fn test_upload_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("upload.json");
        std::fs::write(&path, r#"{"layout": {"widgets": [{"col": 1, "row": 1, "width": 2}]}}"#)?;

        let mut e = editor();
        let report = e.upload_file(&path).await?.expect("upload is current");
        assert_eq!(report.placed, 1);
        assert_eq!(e.cell(CellId(0)).unwrap().span, Span::new(2, 1));
        Ok(())
    }

    #[test]
    fn test_save_and_load_document() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("board.json");

        let mut e = grid_editor(2, 2);
        e.set_title("Wall");
        e.set_job(CellId(3), "sprint-goals")?;
        e.set_config_text(CellId(3), "\"team\": \"core\"")?;
        assert!(e.save_document(&path)?.is_empty());

        let mut restored = editor();
        let report = restored.load_document_strict(&path)?;
        assert_eq!(report.placed, 4);
        assert_eq!(restored.title(), "Wall");
        assert_eq!(restored.cell(CellId(3))?.job, "sprint-goals");
        assert_eq!(restored.cell(CellId(3))?.config_key.as_deref(), Some("sprint-goals_3"));
        assert_eq!(e.export().document, restored.export().document);
        Ok(())
    }

    #[test]
    fn test_clear_keeps_title() {
        let mut e = grid_editor(2, 2);
        e.set_title("Wall");
        e.toggle_select(CellId(0)).unwrap();
        e.clear();
        assert!(e.grid().is_empty());
        assert!(e.selection().is_empty());
        assert_eq!(e.title(), "Wall");
    }
}
