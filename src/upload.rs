//! Reading uploaded layout documents off the editor thread
//!
//! Only the most recently started upload may be applied. Each upload takes a
//! ticket from the gate; starting another one makes every older ticket stale.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct UploadGate {
    generation: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct UploadTicket {
    generation: u64,
    gate: Arc<AtomicU64>,
}

impl UploadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new upload, superseding any upload still in flight
    pub fn begin(&self) -> UploadTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation = generation, "Upload started");
        UploadTicket {
            generation,
            gate: Arc::clone(&self.generation),
        }
    }

    /// Invalidate every outstanding ticket without starting a new upload
    pub fn cancel_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl UploadTicket {
    pub fn is_current(&self) -> bool {
        self.gate.load(Ordering::Acquire) == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub async fn read_upload(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read uploaded document {:?}", path))?;
    info!(path = %path.display(), bytes = text.len(), "Read uploaded document");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_upload_supersedes_older() {
        let gate = UploadGate::new();
        let first = gate.begin();
        assert!(first.is_current());

        let second = gate.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn test_cancel_all() {
        let gate = UploadGate::new();
        let ticket = gate.begin();
        gate.cancel_all();
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_cloned_gate_shares_generation() {
        let gate = UploadGate::new();
        let ticket = gate.begin();
        gate.clone().begin();
        assert!(!ticket.is_current());
    }

    #[tokio::test]
    async fn test_read_upload() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("layout.json");
        std::fs::write(&path, r#"{"layout": {"widgets": []}}"#)?;

        let text = read_upload(&path).await?;
        assert!(text.contains("widgets"));
        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_upload() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_upload(dir.path().join("missing.json")).await.is_err());
    }
}
