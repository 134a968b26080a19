use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::orchestrator::ReportPipeline;
use crate::out_models::JobOutcome;
use crate::progress::ProgressStore;
use crate::render::render_report_markdown;
use crate::store::{make_job_id, report_json_key, report_markdown_key, ArtifactStore, JobStatus, JobStore};

/// What a caller gets back from one processed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReport {
    pub job_id: String,
    pub outcome: JobOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub store_errors: Vec<String>,
}

/// Job boundary around the pipeline: job records, stored reports, progress
/// cleanup. Storage problems are collected, never raised.
pub struct ReportService {
    pipeline: Arc<ReportPipeline>,
    artifacts: Arc<dyn ArtifactStore>,
    jobs: Arc<dyn JobStore>,
    progress: ProgressStore,
}

impl ReportService {
    pub fn new(
        pipeline: Arc<ReportPipeline>,
        artifacts: Arc<dyn ArtifactStore>,
        jobs: Arc<dyn JobStore>,
        progress: ProgressStore,
    ) -> Self {
        Self {
            pipeline,
            artifacts,
            jobs,
            progress,
        }
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub async fn process_job(&self, user_id: &str, source_url: &str) -> ServiceReport {
        let mut store_errors = Vec::new();

        let job_id = match self.jobs.create_job(user_id, source_url).await {
            Ok(id) => id,
            Err(e) => {
                let id = make_job_id(user_id, source_url);
                error!("Job record creation failed - job_id={}, error={:#}", id, e);
                store_errors.push(format!("create job: {:#}", e));
                id
            }
        };
        info!("Job started - job_id={}, user_id={}, url={}", job_id, user_id, source_url);

        let outcome = self.pipeline.run_job(&job_id, user_id, source_url).await;

        let json_key = report_json_key(user_id, &job_id);
        let md_key = report_markdown_key(user_id, &job_id);

        let report_key = match serde_json::to_value(&outcome) {
            Ok(v) => match self.artifacts.put_json(&json_key, &v).await {
                Ok(()) => Some(json_key),
                Err(e) => {
                    warn!("Report store failed - key={}, error={:#}", json_key, e);
                    store_errors.push(format!("store {}: {:#}", json_key, e));
                    None
                }
            },
            Err(e) => {
                error!("Report serialization failed - job_id={}, error={}", job_id, e);
                store_errors.push(format!("serialize report: {}", e));
                None
            }
        };

        let markdown = render_report_markdown(&outcome.report);
        if let Err(e) = self.artifacts.put_text(&md_key, &markdown).await {
            warn!("Report markdown store failed - key={}, error={:#}", md_key, e);
            store_errors.push(format!("store {}: {:#}", md_key, e));
        }

        let status = if outcome.success { JobStatus::Completed } else { JobStatus::Failed };
        if let Err(e) = self
            .jobs
            .update_status(&job_id, status, report_key.as_deref())
            .await
        {
            warn!("Job status update failed - job_id={}, error={:#}", job_id, e);
            store_errors.push(format!("update job: {:#}", e));
        }

        self.progress.remove(&job_id);
        info!(
            "Job finished - job_id={}, status={}, report_key={}, store_errors={}",
            job_id,
            status.as_str(),
            report_key.as_deref().unwrap_or("-"),
            store_errors.len()
        );

        ServiceReport {
            job_id,
            outcome,
            report_key,
            store_errors,
        }
    }
}
