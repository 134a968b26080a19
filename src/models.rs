use serde::{Deserialize, Serialize};

use crate::out_models::ReportDocument;
use crate::viz_payload::{VizKind, VizPayload};

/* -------------------------------------------------------------------------- */
/* Sentinels                                                                  */
/* -------------------------------------------------------------------------- */

pub const NO_CAPTION: &str = "자막을 찾을 수 없습니다.";
pub const CAPTION_API_FAILURE: &str = "자막 API 호출 실패";
pub const CAPTION_FAILURE: &str = "자막 추출 실패";
pub const CANNOT_ANALYZE: &str =
    "자막을 분석할 수 없습니다. 영상에 자막이 없거나 추출에 실패했습니다.";
pub const SUMMARY_FAILURE: &str = "요약 생성 중 오류가 발생했습니다";

/// What the caption stage left behind in `PipelineState::transcript`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptStatus {
    Usable,
    Missing,
    Failed,
}

pub fn classify_transcript(transcript: &str) -> TranscriptStatus {
    let t = transcript.trim();
    if t.is_empty() || t.contains(NO_CAPTION.trim_end_matches('.')) {
        TranscriptStatus::Missing
    } else if t.starts_with(CAPTION_API_FAILURE) || t.starts_with(CAPTION_FAILURE) {
        TranscriptStatus::Failed
    } else {
        TranscriptStatus::Usable
    }
}

/// True when the summary holds one of the summarization stage's fixed messages
/// instead of model prose.
pub fn is_sentinel_summary(summary: &str) -> bool {
    let s = summary.trim();
    s == CANNOT_ANALYZE || s.starts_with(SUMMARY_FAILURE)
}

/* -------------------------------------------------------------------------- */
/* Pipeline state                                                             */
/* -------------------------------------------------------------------------- */

/// Per-job working state. Created by the orchestrator, threaded through the
/// stages by `&mut`, dropped once the outcome is built.
#[derive(Debug, Clone)]
pub struct PipelineState {
    job_id: String,
    user_id: String,
    source_url: String,
    pub transcript: String,
    pub summary: String,
    pub visualization_requests: Vec<VisualizationRequest>,
    pub visual_sections: Vec<VisualizationArtifact>,
    pub report: Option<ReportDocument>,
}

impl PipelineState {
    pub fn new(job_id: impl Into<String>, user_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            user_id: user_id.into(),
            source_url: source_url.into(),
            transcript: String::new(),
            summary: String::new(),
            visualization_requests: Vec::new(),
            visual_sections: Vec::new(),
            report: None,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationRequest {
    pub purpose: String,
    pub description: String,
    /// Literal passage of the summary; generation may only use facts from here
    /// plus the transcript context window.
    pub source_excerpt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub after_paragraph_index: usize,
    pub relevance_score: u32,
}

impl Placement {
    pub fn sequential(index: usize) -> Self {
        Self {
            after_paragraph_index: index,
            relevance_score: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationHint {
    Beginning,
    Middle,
    End,
}

impl LocationHint {
    /// Tertile of `position` within `0..len`.
    pub fn from_position(position: usize, len: usize) -> Self {
        if len == 0 || position * 3 < len {
            LocationHint::Beginning
        } else if position * 3 < len * 2 {
            LocationHint::Middle
        } else {
            LocationHint::End
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationArtifact {
    pub title: String,
    pub kind: VizKind,
    pub payload: VizPayload,
    pub insight: String,
    pub placement: Placement,
    pub purpose: String,
    pub benefit_description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_excerpt: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_classification() {
        assert_eq!(classify_transcript(""), TranscriptStatus::Missing);
        assert_eq!(classify_transcript(NO_CAPTION), TranscriptStatus::Missing);
        assert_eq!(
            classify_transcript("자막 API 호출 실패: timeout"),
            TranscriptStatus::Failed
        );
        assert_eq!(
            classify_transcript("자막 추출 실패: boom"),
            TranscriptStatus::Failed
        );
        assert_eq!(classify_transcript("안녕하세요 여러분"), TranscriptStatus::Usable);
    }

    #[test]
    fn sentinel_summaries() {
        assert!(is_sentinel_summary(CANNOT_ANALYZE));
        assert!(is_sentinel_summary("요약 생성 중 오류가 발생했습니다: 503"));
        assert!(!is_sentinel_summary("## 개요\n영상은 러스트를 다룹니다."));
    }

    #[test]
    fn location_tertiles() {
        assert_eq!(LocationHint::from_position(0, 9), LocationHint::Beginning);
        assert_eq!(LocationHint::from_position(2, 9), LocationHint::Beginning);
        assert_eq!(LocationHint::from_position(3, 9), LocationHint::Middle);
        assert_eq!(LocationHint::from_position(5, 9), LocationHint::Middle);
        assert_eq!(LocationHint::from_position(6, 9), LocationHint::End);
        assert_eq!(LocationHint::from_position(0, 0), LocationHint::Beginning);
    }
}
