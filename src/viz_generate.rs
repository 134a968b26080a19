use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::extract::extract_json_object;
use crate::llm::LanguageModel;
use crate::models::{Placement, PipelineState, VisualizationArtifact, VisualizationRequest};
use crate::prompts;
use crate::settings::PipelineSettings;
use crate::stage::Stage;
use crate::viz_normalize::normalize;

/// Tag assumed when the generator omits `type`.
const DEFAULT_TYPE_TAG: &str = "chartjs";

pub fn viz_id(index: usize) -> String {
    format!("viz_{:03}", index + 1)
}

pub fn default_viz_title(index: usize) -> String {
    format!("시각화 {}", index + 1)
}

pub fn benefit_text(description: &str) -> String {
    format!("{}에 대한 시각적 이해를 돕습니다.", description)
}

pub struct VisualizationGenerationStage {
    llm: Arc<dyn LanguageModel>,
    context_chars: usize,
}

impl VisualizationGenerationStage {
    pub fn new(llm: Arc<dyn LanguageModel>, settings: &PipelineSettings) -> Self {
        Self {
            llm,
            context_chars: settings.transcript_context_chars,
        }
    }

    async fn generate_one(
        &self,
        index: usize,
        req: &VisualizationRequest,
        transcript_context: &str,
    ) -> Result<VisualizationArtifact> {
        let raw = self
            .llm
            .complete(&prompts::visualization_generation(req, transcript_context))
            .await?;
        let value = extract_json_object(&raw).ok_or_else(|| anyhow!("no JSON object in response"))?;
        Ok(build_artifact(index, req, &value))
    }
}

/// Turns one extracted generator object into an artifact placed after the
/// paragraph matching its request index.
pub fn build_artifact(index: usize, req: &VisualizationRequest, value: &Value) -> VisualizationArtifact {
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TYPE_TAG);
    let payload = normalize(value, tag);

    let title = value
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_viz_title(index));

    VisualizationArtifact {
        title,
        kind: payload.kind(),
        payload,
        insight: value
            .get("insight")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        placement: Placement::sequential(index),
        purpose: req.purpose.clone(),
        benefit_description: benefit_text(&req.description),
        source_excerpt: req.source_excerpt.clone(),
    }
}

#[async_trait]
impl Stage for VisualizationGenerationStage {
    fn name(&self) -> &'static str {
        "visualization_generation"
    }

    fn checkpoint(&self) -> (i32, &'static str) {
        (70, "🎨 시각화 생성 중...")
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let total = state.visualization_requests.len();
        if total == 0 {
            debug!("Visualization generation skipped - job_id={}, no requests", state.job_id());
            state.visual_sections = Vec::new();
            return Ok(());
        }

        let start = std::time::Instant::now();
        let context: String = state.transcript.chars().take(self.context_chars).collect();
        let mut artifacts = Vec::with_capacity(total);

        // Sequential within a job; one failed item never stops the batch.
        for (i, req) in state.visualization_requests.iter().enumerate() {
            let id = viz_id(i);
            debug!("Generating visualization {}/{} - id={}", i + 1, total, id);
            match self.generate_one(i, req, &context).await {
                Ok(a) => {
                    info!("Visualization generated - id={}, kind={}, title={}", id, a.kind.as_str(), a.title);
                    artifacts.push(a);
                }
                Err(e) => {
                    warn!("Visualization skipped - id={}, error={:#}", id, e);
                }
            }
        }

        info!(
            "Visualization generation completed - duration={:.2}s, generated={}/{}",
            start.elapsed().as_secs_f32(),
            artifacts.len(),
            total
        );
        state.visual_sections = artifacts;
        Ok(())
    }
}
