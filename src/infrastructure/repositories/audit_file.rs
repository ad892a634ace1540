//! Append-only audit log: one JSON-lines file per UTC day.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::warn;

use crate::domain::{events::MessageFinalizedEvent, repositories::AuditLogRepository};

pub struct FileAuditLog {
    base_dir: PathBuf,
    // serializes appends so lines never interleave
    write_lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn partition_path(&self, day: NaiveDate) -> PathBuf {
        self.base_dir
            .join(format!("messages-{}.jsonl", day.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl AuditLogRepository for FileAuditLog {
    async fn append(&self, event: &MessageFinalizedEvent) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(event).context("failed to encode audit entry")?;
        line.push(b'\n');

        let path = self.partition_path(event.logged_at.date_naive());
        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.base_dir)
            .await
            .with_context(|| format!("failed to create {}", self.base_dir.display()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        file.write_all(&line)
            .await
            .with_context(|| format!("failed to append to {}", path.display()))?;
        file.flush().await?;
        Ok(())
    }

    async fn read_day(&self, day: NaiveDate) -> anyhow::Result<Vec<MessageFinalizedEvent>> {
        let path = self.partition_path(day);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        let mut entries = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                // a torn trailing write must not hide the rest of the day
                Err(err) => warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %err,
                    "skipping unreadable audit entry"
                ),
            }
        }
        Ok(entries)
    }
}
