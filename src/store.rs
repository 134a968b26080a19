// src/store.rs
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/* -------------------------------------------------------------------------- */
/* Keys                                                                       */
/* -------------------------------------------------------------------------- */

pub fn caption_key(user_id: &str, job_id: &str) -> String {
    format!("captions/{}/{}_caption.txt", user_id, job_id)
}

pub fn report_json_key(user_id: &str, job_id: &str) -> String {
    format!("reports/{}/{}/report.json", user_id, job_id)
}

pub fn report_markdown_key(user_id: &str, job_id: &str) -> String {
    format!("reports/{}/{}/report.md", user_id, job_id)
}

/// 16 hex digit id, unique per (user, url, creation instant).
pub fn make_job_id(user_id: &str, source_url: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:016x}", xxh3_64(format!("{}|{}|{}", user_id, source_url, nanos).as_bytes()))
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/* -------------------------------------------------------------------------- */
/* Artifact store                                                             */
/* -------------------------------------------------------------------------- */

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put_text(&self, key: &str, content: &str) -> Result<()>;
    async fn put_json(&self, key: &str, content: &Value) -> Result<()>;
    /// Empty string when the key does not exist.
    async fn get_text(&self, key: &str) -> Result<String>;
}

/// Artifact store over a local directory; keys map to relative paths.
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        if key.is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            bail!("Invalid artifact key: {:?}", key);
        }
        Ok(self.root.join(rel))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {:?}", parent))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write {:?}", path))?;
        debug!("Artifact stored - key={}, bytes={}", key, bytes.len());
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put_text(&self, key: &str, content: &str) -> Result<()> {
        self.write(key, content.as_bytes()).await
    }

    async fn put_json(&self, key: &str, content: &Value) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(content)?;
        self.write(key, &bytes).await
    }

    async fn get_text(&self, key: &str) -> Result<String> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e).with_context(|| format!("read {:?}", path)),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Job records                                                                */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub user_id: String,
    pub source_url: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_key: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Registers a new job in `processing` state and returns its id.
    async fn create_job(&self, user_id: &str, source_url: &str) -> Result<String>;
    async fn update_status(&self, job_id: &str, status: JobStatus, report_key: Option<&str>) -> Result<()>;
}

/// One JSON file per job under `<root>/jobs/`.
pub struct FsJobStore {
    dir: PathBuf,
}

impl FsJobStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join("jobs"),
        }
    }

    fn path_for(&self, job_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", job_id))
    }

    pub async fn load(&self, job_id: &str) -> Result<JobRecord> {
        let path = self.path_for(job_id);
        let raw = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read {:?}", path))?;
        serde_json::from_slice(&raw).with_context(|| format!("Decoding job record {:?}", path))
    }

    async fn save(&self, record: &JobRecord) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create {:?}", self.dir))?;
        let path = self.path_for(&record.job_id);
        tokio::fs::write(&path, serde_json::to_vec_pretty(record)?)
            .await
            .with_context(|| format!("write {:?}", path))
    }
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn create_job(&self, user_id: &str, source_url: &str) -> Result<String> {
        let now = now_rfc3339();
        let record = JobRecord {
            job_id: make_job_id(user_id, source_url),
            user_id: user_id.to_string(),
            source_url: source_url.to_string(),
            status: JobStatus::Processing,
            report_key: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.save(&record).await?;
        debug!("Job created - job_id={}, user_id={}", record.job_id, user_id);
        Ok(record.job_id)
    }

    async fn update_status(&self, job_id: &str, status: JobStatus, report_key: Option<&str>) -> Result<()> {
        let mut record = self.load(job_id).await?;
        record.status = status;
        if let Some(k) = report_key {
            record.report_key = Some(k.to_string());
        }
        record.updated_at = now_rfc3339();
        self.save(&record).await?;
        debug!("Job status updated - job_id={}, status={}", job_id, status.as_str());
        Ok(())
    }
}
