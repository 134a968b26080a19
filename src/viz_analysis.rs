use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api_types::ApiVisualizationRequests;
use crate::extract::extract_as;
use crate::llm::LanguageModel;
use crate::models::{is_sentinel_summary, PipelineState, VisualizationRequest};
use crate::prompts;
use crate::settings::{AnalysisPromptVariant, PipelineSettings};
use crate::stage::Stage;

pub struct VisualizationAnalysisStage {
    llm: Arc<dyn LanguageModel>,
    min_summary_chars: usize,
    variant: AnalysisPromptVariant,
}

impl VisualizationAnalysisStage {
    pub fn new(llm: Arc<dyn LanguageModel>, settings: &PipelineSettings) -> Self {
        Self {
            llm,
            min_summary_chars: settings.min_analyzable_summary_chars,
            variant: settings.analysis_prompt,
        }
    }

    async fn analyze(&self, summary: &str) -> Result<Vec<VisualizationRequest>> {
        let raw = self
            .llm
            .complete(&prompts::visualization_analysis(summary, self.variant))
            .await?;

        let Some(parsed) = extract_as::<ApiVisualizationRequests>(&raw) else {
            warn!("Visualization analysis returned no usable JSON - response_length={} chars", raw.chars().count());
            return Ok(Vec::new());
        };

        let total = parsed.visualization_requests.len();
        let requests: Vec<VisualizationRequest> = parsed
            .visualization_requests
            .iter()
            .filter_map(request_from_value)
            .collect();

        if requests.len() < total {
            debug!("Dropped unreadable or unsourced requests - dropped={}", total - requests.len());
        }
        Ok(requests)
    }
}

/// Reads one request entry. Only the string fields the pipeline uses are
/// looked at; entries without a source excerpt are dropped.
fn request_from_value(item: &Value) -> Option<VisualizationRequest> {
    let obj = item.as_object()?;
    let source_excerpt = first_str(obj, &["related_content", "source_excerpt"]);
    if source_excerpt.is_empty() {
        return None;
    }
    Some(VisualizationRequest {
        purpose: first_str(obj, &["purpose"]),
        description: first_str(obj, &["content_description", "description"]),
        source_excerpt,
    })
}

fn first_str(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Stage for VisualizationAnalysisStage {
    fn name(&self) -> &'static str {
        "visualization_analysis"
    }

    fn checkpoint(&self) -> (i32, &'static str) {
        (60, "🎯 시각화 기회 분석 중...")
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let len = state.summary.trim().chars().count();
        if len < self.min_summary_chars || is_sentinel_summary(&state.summary) {
            info!(
                "Visualization analysis skipped - job_id={}, summary_length={} chars",
                state.job_id(),
                len
            );
            state.visualization_requests = Vec::new();
            return Ok(());
        }

        let start = std::time::Instant::now();
        state.visualization_requests = match self.analyze(&state.summary).await {
            Ok(reqs) => reqs,
            Err(e) => {
                error!("Visualization analysis failed - job_id={}, error={:#}", state.job_id(), e);
                Vec::new()
            }
        };

        info!(
            "Visualization analysis completed - duration={:.2}s, requests={}",
            start.elapsed().as_secs_f32(),
            state.visualization_requests.len()
        );
        Ok(())
    }
}
