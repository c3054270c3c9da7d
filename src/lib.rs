//! dashgrid: dashboard grid layout editor core
//!
//! Cells are arranged by a layout engine, read back as pixel geometry, and
//! serialized into a column/row indexed JSON layout document. Uploaded
//! documents are turned back into cells, with hidden fillers keeping every
//! widget in its slot.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod config_text;
pub mod constants;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod import;
pub mod layout;
pub mod model;
pub mod selection;
pub mod types;
pub mod upload;

pub use catalog::Catalog;
pub use config::Settings;
pub use document::GridDocument;
pub use editor::Editor;
pub use error::{ConfigDiagnostic, GridError};
pub use types::{CellId, GridPos, Span};
