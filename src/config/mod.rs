//! Configuration management for dashgrid
//!
//! A single JSON settings file controls cell geometry, how coordinates and
//! row counts are derived on export, and where the catalog comes from.

pub mod settings;

pub use settings::Settings;
