use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Where the report stage anchors each visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    /// Keep the request order assigned at generation time.
    #[default]
    Sequential,
    /// Recompute against the structured sections by keyword overlap.
    Keyword,
}

/// Which visualization-analysis prompt to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisPromptVariant {
    #[default]
    Detailed,
    Compact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub caption_api_url: String,
    pub caption_api_key: String,
    pub caption_locale: String,
    pub caption_timeout: Duration,
    /// Transcripts longer than this (chars) are condensed before prompting.
    pub transcript_budget_chars: usize,
    /// Summaries shorter than this get one elaboration request.
    pub min_summary_chars: usize,
    /// Summaries shorter than this are not analyzed for visualizations.
    pub min_analyzable_summary_chars: usize,
    /// Transcript prefix handed to the generator as grounding.
    pub transcript_context_chars: usize,
    pub placement: PlacementStrategy,
    pub analysis_prompt: AnalysisPromptVariant,
}

pub const DEFAULT_CAPTION_API_URL: &str = "https://vidcap.xyz/api/v1/youtube/caption";

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            caption_api_url: DEFAULT_CAPTION_API_URL.to_string(),
            caption_api_key: String::new(),
            caption_locale: "ko".to_string(),
            caption_timeout: Duration::from_secs(30),
            transcript_budget_chars: 6000,
            min_summary_chars: 500,
            min_analyzable_summary_chars: 50,
            transcript_context_chars: 1000,
            placement: PlacementStrategy::Sequential,
            analysis_prompt: AnalysisPromptVariant::Detailed,
        }
    }
}
