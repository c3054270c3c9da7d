//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Cell unit geometry used by the layout engine
pub mod grid {
    /// Pixel width of a 1-column cell
    pub const UNIT_WIDTH: u32 = 200;

    /// Pixel height of a 1-row cell
    pub const UNIT_HEIGHT: u32 = 250;

    /// Space between neighbouring cells (split evenly into left/right margins)
    pub const GUTTER: u32 = 10;

    /// Smallest grid inferred from a document without an explicit gridSize
    pub const MIN_INFERRED_COLUMNS: u32 = 3;
    pub const MIN_INFERRED_ROWS: u32 = 3;

    /// Default grid dimensions for a fresh session
    pub const DEFAULT_COLUMNS: u32 = 3;
    pub const DEFAULT_ROWS: u32 = 3;
}

/// Config text handling
pub mod config_text {
    /// Template text used when a catalog entry has no starter config
    pub const EMPTY_TEMPLATE: &str = "{}";

    /// Indent used when an imported configuration is turned back into editable text
    pub const IMPORT_INDENT: &[u8] = b"\t";
}

/// Settings file location
pub mod config {
    /// Directory under the platform config dir
    pub const APP_DIR: &str = "dashgrid";

    /// Settings file name
    pub const FILENAME: &str = "settings.json";
}

/// Limits applied by `Settings::validate_and_clamp`
pub mod validation {
    pub const MIN_UNIT_SIZE: u32 = 10;
    pub const MAX_UNIT_SIZE: u32 = 4096;
    pub const MAX_GUTTER: u32 = 200;
    pub const MAX_GRID_DIMENSION: u32 = 64;
}
