//! Append-only report storage
//!
//! Accepted reports are appended as one JSON object per line. Stores never
//! read back or rewrite; rotation is someone else's job.

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const VIOLATIONS_FILE: &str = "csp-violations.jsonl";
pub const ERRORS_FILE: &str = "csp-errors.jsonl";

#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Append one record
    async fn append(&self, record: &Value) -> Result<(), StoreError>;
}

/// JSON Lines file, created along with its directory on first write
pub struct JsonlFileStore {
    path: PathBuf,
}

impl JsonlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `csp-violations.jsonl` under `dir`
    pub fn violations(dir: &Path) -> Self {
        Self::new(dir.join(VIOLATIONS_FILE))
    }

    /// `csp-errors.jsonl` under `dir`
    pub fn errors(dir: &Path) -> Self {
        Self::new(dir.join(ERRORS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ReportStore for JsonlFileStore {
    async fn append(&self, record: &Value) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // Single write so concurrent appends interleave by whole lines
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<Value> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn append(&self, record: &Value) -> Result<(), StoreError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

/// Discards everything; used where persistence belongs to an external
/// monitoring service
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl ReportStore for NullStore {
    async fn append(&self, _record: &Value) -> Result<(), StoreError> {
        Ok(())
    }
}
