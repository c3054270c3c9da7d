//! Editor settings stored as JSON under the user's config directory

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::constants::grid;
use crate::export::RowsSource;
use crate::geometry::{CoordinateScheme, UnitGrid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Pixel width of one grid column
    #[serde(default = "default_unit_width")]
    pub unit_width: u32,
    /// Pixel height of one grid row
    #[serde(default = "default_unit_height")]
    pub unit_height: u32,
    #[serde(default = "default_gutter")]
    pub gutter: u32,

    #[serde(default)]
    pub coordinate_scheme: CoordinateScheme,
    #[serde(default)]
    pub rows_source: RowsSource,

    /// Refuse to add cells once every grid slot is taken
    #[serde(default)]
    pub enforce_capacity: bool,

    #[serde(default = "default_columns")]
    pub default_columns: u32,
    #[serde(default = "default_rows")]
    pub default_rows: u32,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Custom job/widget catalog; the built-in list is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

fn default_unit_width() -> u32 {
    grid::UNIT_WIDTH
}

fn default_unit_height() -> u32 {
    grid::UNIT_HEIGHT
}

fn default_gutter() -> u32 {
    grid::GUTTER
}

fn default_columns() -> u32 {
    grid::DEFAULT_COLUMNS
}

fn default_rows() -> u32 {
    grid::DEFAULT_ROWS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unit_width: default_unit_width(),
            unit_height: default_unit_height(),
            gutter: default_gutter(),
            coordinate_scheme: CoordinateScheme::default(),
            rows_source: RowsSource::default(),
            enforce_capacity: false,
            default_columns: default_columns(),
            default_rows: default_rows(),
            log_level: default_log_level(),
            catalog_path: None,
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load settings from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if !path.exists() {
            info!("Settings file not found, creating default settings at {:?}", path);
            let settings = Self::default();
            if let Err(e) = settings.save_to(&path) {
                error!(error = ?e, "Failed to write default settings");
            }
            return Ok(settings);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let mut settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;
        settings.apply_env_overrides();
        settings.validate_and_clamp();
        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn unit_grid(&self) -> UnitGrid {
        UnitGrid::new(self.unit_width, self.unit_height, self.gutter, self.coordinate_scheme)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load_json_file(path),
            None => Ok(Catalog::builtin()),
        }
    }

    fn parse_num(var: &str) -> Option<u32> {
        let raw = env::var(var).ok()?;
        raw.trim()
            .parse::<u32>()
            .inspect_err(|e| error!(var = %var, error = ?e, "failed to parse env var"))
            .ok()
    }

    fn apply_env_overrides(&mut self) {
        if let Some(width) = Self::parse_num("DASHGRID_UNIT_WIDTH") {
            self.unit_width = width;
        }
        if let Some(height) = Self::parse_num("DASHGRID_UNIT_HEIGHT") {
            self.unit_height = height;
        }
        if let Some(gutter) = Self::parse_num("DASHGRID_GUTTER") {
            self.gutter = gutter;
        }
    }

    /// Clamp values to ranges the layout math can handle
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        if self.unit_width < MIN_UNIT_SIZE {
            warn!(unit_width = self.unit_width, using = default_unit_width(), "unit_width below minimum, using default");
            self.unit_width = default_unit_width();
        } else if self.unit_width > MAX_UNIT_SIZE {
            warn!(unit_width = self.unit_width, max = MAX_UNIT_SIZE, "unit_width exceeds maximum, clamping");
            self.unit_width = MAX_UNIT_SIZE;
        }

        if self.unit_height < MIN_UNIT_SIZE {
            warn!(unit_height = self.unit_height, using = default_unit_height(), "unit_height below minimum, using default");
            self.unit_height = default_unit_height();
        } else if self.unit_height > MAX_UNIT_SIZE {
            warn!(unit_height = self.unit_height, max = MAX_UNIT_SIZE, "unit_height exceeds maximum, clamping");
            self.unit_height = MAX_UNIT_SIZE;
        }

        if self.gutter > MAX_GUTTER {
            warn!(gutter = self.gutter, max = MAX_GUTTER, "gutter exceeds maximum, clamping");
            self.gutter = MAX_GUTTER;
        }

        for (name, value, fallback) in [
            ("default_columns", &mut self.default_columns, default_columns()),
            ("default_rows", &mut self.default_rows, default_rows()),
        ] {
            if *value == 0 {
                warn!(setting = name, using = fallback, "grid dimension is zero, using default");
                *value = fallback;
            } else if *value > MAX_GRID_DIMENSION {
                warn!(setting = name, value = *value, max = MAX_GRID_DIMENSION, "grid dimension exceeds maximum, clamping");
                *value = MAX_GRID_DIMENSION;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.unit_width, 200);
        assert_eq!(settings.unit_height, 250);
        assert_eq!(settings.gutter, 10);
        assert_eq!(settings.coordinate_scheme, CoordinateScheme::PixelOffset);
        assert_eq!(settings.rows_source, RowsSource::Explicit);
        assert!(!settings.enforce_capacity);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"gutter": 4, "coordinate_scheme": "index"}"#).unwrap();
        assert_eq!(settings.gutter, 4);
        assert_eq!(settings.coordinate_scheme, CoordinateScheme::Index);
        assert_eq!(settings.unit_width, 200);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_validate_and_clamp() {
        let mut settings = Settings {
            unit_width: 1,
            unit_height: 100_000,
            gutter: 999,
            default_columns: 0,
            default_rows: 500,
            ..Settings::default()
        };
        settings.validate_and_clamp();

        assert_eq!(settings.unit_width, 200);
        assert_eq!(settings.unit_height, 4096);
        assert_eq!(settings.gutter, 200);
        assert_eq!(settings.default_columns, 3);
        assert_eq!(settings.default_rows, 64);
    }

    #[test]
    fn test_save_and_load_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            rows_source: RowsSource::LastVisible,
            enforce_capacity: true,
            ..Settings::default()
        };
        settings.save_to(&path)?;

        let loaded = Settings::load_from(&path)?;
        assert_eq!(loaded.rows_source, RowsSource::LastVisible);
        assert!(loaded.enforce_capacity);
        Ok(())
    }

    #[test]
    fn test_invalid_file_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ nope")?;
        assert!(Settings::load_from(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_unit_grid_uses_scheme() {
        let settings = Settings {
            coordinate_scheme: CoordinateScheme::Index,
            ..Settings::default()
        };
        assert_eq!(settings.unit_grid().scheme, CoordinateScheme::Index);
    }
}
