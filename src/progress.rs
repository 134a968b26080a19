use std::sync::Arc;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_PROGRESS_MESSAGE: &str = "처리 중...";
pub const CANCELLED_MESSAGE: &str = "작업이 취소되었습니다.";
pub const FAILED_PROGRESS: i32 = -1;

/// Where the orchestrator reports stage checkpoints. Updates are
/// fire-and-forget: callers log a failed update and move on.
pub trait ProgressSink: Send + Sync {
    fn update(&self, job_id: &str, percent: i32, message: &str) -> Result<()>;

    /// Checked between stages only.
    fn is_cancelled(&self, _job_id: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub progress: i32,
    pub message: String,
    pub updated_at: String,
    #[serde(default)]
    pub cancelled: bool,
}

impl JobProgress {
    fn new(progress: i32, message: &str) -> Self {
        Self {
            progress,
            message: message.to_string(),
            updated_at: now_rfc3339(),
            cancelled: false,
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Process-wide job progress map, shared between concurrently running jobs.
#[derive(Clone, Default)]
pub struct ProgressStore {
    entries: Arc<DashMap<String, JobProgress>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for `job_id`; unknown jobs read as just started.
    pub fn get(&self, job_id: &str) -> JobProgress {
        self.entries
            .get(job_id)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| JobProgress::new(0, DEFAULT_PROGRESS_MESSAGE))
    }

    pub fn remove(&self, job_id: &str) -> Option<JobProgress> {
        self.entries.remove(job_id).map(|(_, v)| v)
    }

    /// Marks a job cancelled. The running pipeline notices at its next stage
    /// boundary; a stage already in flight runs to completion.
    pub fn cancel(&self, job_id: &str) {
        let mut entry = self
            .entries
            .entry(job_id.to_string())
            .or_insert_with(|| JobProgress::new(0, DEFAULT_PROGRESS_MESSAGE));
        entry.cancelled = true;
        entry.message = CANCELLED_MESSAGE.to_string();
        entry.updated_at = now_rfc3339();
        debug!("Job cancellation requested - job_id={}", job_id);
    }

    pub fn is_cancelled(&self, job_id: &str) -> bool {
        self.entries.get(job_id).map(|e| e.cancelled).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl ProgressSink for ProgressStore {
    fn update(&self, job_id: &str, percent: i32, message: &str) -> Result<()> {
        let mut entry = self
            .entries
            .entry(job_id.to_string())
            .or_insert_with(|| JobProgress::new(percent, message));
        // The cancel flag survives later checkpoints.
        entry.progress = percent;
        entry.message = message.to_string();
        entry.updated_at = now_rfc3339();
        debug!("Progress updated - job_id={}, progress={}, message={}", job_id, percent, message);
        Ok(())
    }

    fn is_cancelled(&self, job_id: &str) -> bool {
        ProgressStore::is_cancelled(self, job_id)
    }
}
