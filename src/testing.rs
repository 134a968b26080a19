//! In-memory collaborators for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::fetch::CaptionSource;
use crate::llm::{LanguageModel, Prompt};
use crate::progress::ProgressSink;
use crate::store::{make_job_id, ArtifactStore, JobStatus, JobStore};

/// Answers prompts from a fixed script, in order, and records what it was asked.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fail_all: Option<String>,
    seen: Mutex<Vec<Prompt>>,
}

impl ScriptedModel {
    pub fn new<S: Into<String>>(replies: Vec<S>) -> Self {
        Self::from_results(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    pub fn from_results(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fail_all: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fail_all: Some(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        self.seen.lock().unwrap().push(prompt.clone());
        if let Some(msg) = &self.fail_all {
            bail!("{}", msg);
        }
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(anyhow!(e)),
            None => bail!("script exhausted"),
        }
    }
}

pub struct StaticCaptions {
    content: String,
}

impl StaticCaptions {
    pub fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }
}

#[async_trait]
impl CaptionSource for StaticCaptions {
    async fn fetch(&self, _video_url: &str, _locale: &str) -> Result<String> {
        Ok(self.content.clone())
    }
}

pub struct FailingCaptions;

#[async_trait]
impl CaptionSource for FailingCaptions {
    async fn fetch(&self, _video_url: &str, _locale: &str) -> Result<String> {
        bail!("caption provider unreachable")
    }
}

#[derive(Default)]
pub struct MemoryArtifactStore {
    entries: Mutex<HashMap<String, String>>,
    fail: bool,
}

impl MemoryArtifactStore {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put_text(&self, key: &str, content: &str) -> Result<()> {
        if self.fail {
            bail!("bucket unavailable");
        }
        self.entries.lock().unwrap().insert(key.to_string(), content.to_string());
        Ok(())
    }

    async fn put_json(&self, key: &str, content: &Value) -> Result<()> {
        self.put_text(key, &content.to_string()).await
    }

    async fn get_text(&self, key: &str) -> Result<String> {
        Ok(self.entries.lock().unwrap().get(key).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryJobStore {
    pub records: Mutex<HashMap<String, (JobStatus, Option<String>)>>,
    fail: bool,
}

impl MemoryJobStore {
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub fn status(&self, job_id: &str) -> Option<(JobStatus, Option<String>)> {
        self.records.lock().unwrap().get(job_id).cloned()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create_job(&self, user_id: &str, source_url: &str) -> Result<String> {
        if self.fail {
            bail!("job table unavailable");
        }
        let id = make_job_id(user_id, source_url);
        self.records
            .lock()
            .unwrap()
            .insert(id.clone(), (JobStatus::Processing, None));
        Ok(id)
    }

    async fn update_status(&self, job_id: &str, status: JobStatus, report_key: Option<&str>) -> Result<()> {
        if self.fail {
            bail!("job table unavailable");
        }
        let mut records = self.records.lock().unwrap();
        let entry = records
            .get_mut(job_id)
            .ok_or_else(|| anyhow!("unknown job {}", job_id))?;
        *entry = (status, report_key.map(str::to_string));
        Ok(())
    }
}

/// Records every progress update; optionally rejects them all.
#[derive(Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<(i32, String)>>,
    fail: bool,
}

impl RecordingProgress {
    pub fn failing() -> Self {
        Self {
            updates: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn percents(&self) -> Vec<i32> {
        self.updates.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn update(&self, _job_id: &str, percent: i32, message: &str) -> Result<()> {
        if self.fail {
            bail!("progress backend down");
        }
        self.updates.lock().unwrap().push((percent, message.to_string()));
        Ok(())
    }
}
