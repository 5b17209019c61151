use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use imgbatch_core::{Seed, Task};
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to open record log {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to append record to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Failure,
}

/// One line of the structured generation log: the final outcome of a task
/// together with every parameter it was generated with.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRecord {
    pub timestamp: DateTime<Utc>,
    pub prompt: String,
    pub output_file: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub negative_prompt: Option<String>,
    pub nologo: bool,
    pub private: bool,
    pub safe: bool,
    pub enhance: bool,
    pub status: RecordStatus,
}

impl GenerationRecord {
    pub fn for_task(task: &Task, seed: Seed, status: RecordStatus) -> Self {
        let cfg = &task.config;
        Self {
            timestamp: Utc::now(),
            prompt: task.prompt.clone(),
            output_file: task.output.display().to_string(),
            model: cfg.model.clone(),
            width: cfg.size.width,
            height: cfg.size.height,
            seed: seed.value(),
            negative_prompt: cfg.effective_negative_prompt().map(String::from),
            nologo: cfg.flags.nologo,
            private: cfg.flags.private,
            safe: cfg.flags.safe,
            enhance: cfg.flags.enhance,
            status,
        }
    }
}

/// Append-only destination for [`GenerationRecord`]s, shared by all workers.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, record: &GenerationRecord) -> Result<(), RecordError>;
}

/// JSON Lines file. Each record is serialized in full before the file lock
/// is taken, so concurrent appends never interleave.
pub struct JsonlRecordSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlRecordSink {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| RecordError::Open {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(open_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(open_err)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl RecordSink for JsonlRecordSink {
    async fn append(&self, record: &GenerationRecord) -> Result<(), RecordError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let write_err = |source| RecordError::Write {
            path: self.path.clone(),
            source,
        };

        let mut file = self.file.lock().await;
        file.write_all(&line).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        Ok(())
    }
}
