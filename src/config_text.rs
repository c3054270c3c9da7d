//! Per-cell config text: normalization, parsing, and error reporting
//!
//! Shared by export (validating what the user typed) and import (parsing the
//! uploaded document and turning configurations back into editable text).

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fmt;

use crate::constants::config_text::IMPORT_INDENT;

/// Parser failure with the location serde_json reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<serde_json::Error> for ParseFailure {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

pub fn parse_json(text: &str) -> Result<Value, ParseFailure> {
    serde_json::from_str(text).map_err(ParseFailure::from)
}

/// Trim the text and wrap bare `"key": value` pairs in braces.
/// Text that already starts with `{`, or has no `"` at all, is left alone.
pub fn normalize_config_text(raw: &str) -> String {
    let text = raw.trim();
    if !text.starts_with('{') && text.contains('"') {
        format!("{{{text}}}")
    } else {
        text.to_string()
    }
}

/// Parse a cell's config text. Empty text means no configuration.
pub fn parse_config_text(raw: &str) -> Result<Option<Value>, ParseFailure> {
    let text = normalize_config_text(raw);
    if text.is_empty() {
        return Ok(None);
    }
    parse_json(&text).map(Some)
}

/// Editable text for a configuration, tab-indented
pub fn config_value_to_text(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(IMPORT_INDENT));
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}
