//! Catalog of known job/widget names and their starter config templates

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::constants::config_text::EMPTY_TEMPLATE;

/// Names shipped with the editor. Jobs and widgets share the same list.
const BUILTIN_NAMES: &[&str] = &[
    "appbot-topics",
    "appbot-wordcloud",
    "apteligent-crashtrend",
    "blackduck-stats",
    "board-cycle",
    "bugsnag-error-occurances",
    "bugsnag-error-trend",
    "build-status",
    "burndown",
    "checkmarx-scan-queue",
    "checkmarx-top-risks",
    "checkmarx-top-scantime",
    "checkmarx_stats",
    "environment-commit-status",
    "google-drive",
    "isitup",
    "onelogin-locked-accounts",
    "pending-pr-count",
    "picture-of-the-day",
    "security-monkey",
    "sentinel-one-inactive",
    "sentinel-one-threats",
    "sentinel-one",
    "sprint-goals",
    "sprinthealth-history",
    "teamcity-build-queue",
    "teamcity-build-status",
    "teamcity-test-trend",
    "test-results",
    "testrail_run-count",
    "testrail_run-results",
    "tracker-burnup",
    "warcraft-profile",
    "zone-clock",
];

/// Starter config text shipped for built-in widgets
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[("appbot-topics", "enter config template")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Ordered, immutable list of job and widget names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    jobs: Vec<CatalogEntry>,
    widgets: Vec<CatalogEntry>,
}

impl Catalog {
    /// Both lists built from the same entries
    pub fn shared(entries: Vec<CatalogEntry>) -> Self {
        Self {
            jobs: entries.clone(),
            widgets: entries,
        }
    }

    pub fn builtin() -> Self {
        let entries = BUILTIN_NAMES
            .iter()
            .map(|name| CatalogEntry {
                name: (*name).to_string(),
                template: BUILTIN_TEMPLATES
                    .iter()
                    .find(|(widget, _)| widget == name)
                    .map(|(_, template)| (*template).to_string()),
            })
            .collect();
        Self::shared(entries)
    }

    /// Load a catalog from a JSON array of `{ "name", "template" }` objects
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {:?}", path))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse catalog JSON from {:?}", path))?;
        info!(path = %path.display(), entries = entries.len(), "Loaded catalog");
        Ok(Self::shared(entries))
    }

    pub fn jobs(&self) -> &[CatalogEntry] {
        &self.jobs
    }

    pub fn widgets(&self) -> &[CatalogEntry] {
        &self.widgets
    }

    pub fn has_job(&self, name: &str) -> bool {
        self.jobs.iter().any(|e| e.name == name)
    }

    /// The widget that goes with a job, when the widget list carries the same name
    pub fn widget_for_job(&self, job: &str) -> Option<&str> {
        self.widgets
            .iter()
            .find(|e| e.name == job)
            .map(|e| e.name.as_str())
    }

    /// Starter config text for a widget. Unknown names and empty templates give `{}`.
    pub fn template_for(&self, widget: &str) -> &str {
        self.widgets
            .iter()
            .find(|e| e.name == widget)
            .and_then(|e| e.template.as_deref())
            .filter(|t| !t.is_empty())
            .unwrap_or(EMPTY_TEMPLATE)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
