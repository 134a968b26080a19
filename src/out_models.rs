use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::VisualizationArtifact;
use crate::viz_payload::{VizKind, VizPayload};

/* Sections */

/// How a text section came to be; lets consumers (and tests) tell model output
/// apart from fallbacks and repairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionOrigin {
    #[default]
    Model,
    ParagraphSplit,
    Error,
    RepairedFromMalformed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSection {
    pub id: String,
    pub title: String,
    pub level: u8,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub origin: SectionOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSection {
    pub id: String,
    pub title: String,
    pub visualization_type: VizKind,
    pub data: VizPayload,
    pub insight: String,
    pub purpose: String,
    pub user_benefit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VisualizationSection {
    pub fn from_artifact(id: String, artifact: &VisualizationArtifact) -> Self {
        Self {
            id,
            title: artifact.title.clone(),
            visualization_type: artifact.kind,
            data: artifact.payload.clone(),
            insight: artifact.insight.clone(),
            purpose: artifact.purpose.clone(),
            user_benefit: artifact.benefit_description.clone(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Section {
    Text(TextSection),
    Visualization(VisualizationSection),
    /// Model-supplied entry that could not be read as a section; replaced by a
    /// repaired text section when the report is finalized.
    Malformed { id: String, raw: Value },
}

impl Section {
    pub fn id(&self) -> &str {
        match self {
            Section::Text(t) => &t.id,
            Section::Visualization(v) => &v.id,
            Section::Malformed { id, .. } => id,
        }
    }

    pub fn set_id(&mut self, new_id: String) {
        match self {
            Section::Text(t) => t.id = new_id,
            Section::Visualization(v) => v.id = new_id,
            Section::Malformed { id, .. } => *id = new_id,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Section::Text(_))
    }

    pub fn is_visualization(&self) -> bool {
        matches!(self, Section::Visualization(_))
    }
}

/* Report */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportStats {
    pub total_sections: usize,
    pub text_sections: usize,
    pub visual_sections: usize,
}

impl ReportStats {
    pub fn count(sections: &[Section]) -> Self {
        Self {
            total_sections: sections.len(),
            text_sections: sections.iter().filter(|s| s.is_text()).count(),
            visual_sections: sections.iter().filter(|s| s.is_visualization()).count(),
        }
    }
}

pub const FAILED_REPORT_TITLE: &str = "리포트 생성 실패";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub brief_summary: String,
    pub sections: Vec<Section>,
    pub stats: ReportStats,
    /// Set when the document communicates a failure in-band.
    #[serde(default)]
    pub error: bool,
}

impl ReportDocument {
    pub fn new(title: String, brief_summary: String, sections: Vec<Section>) -> Self {
        let stats = ReportStats::count(&sections);
        Self {
            title,
            brief_summary,
            sections,
            stats,
            error: false,
        }
    }

    /// Single text section naming the failure.
    pub fn failure(message: &str) -> Self {
        let section = TextSection {
            id: "error_section".into(),
            title: "오류 정보".into(),
            level: 1,
            content: format!(
                "죄송합니다. 리포트 생성 중 다음과 같은 오류가 발생했습니다:\n\n{}\n\n다시 시도해 주시거나, 다른 영상으로 시도해 보세요.",
                message
            ),
            keywords: vec!["오류".into(), "실패".into()],
            origin: SectionOrigin::Error,
        };
        let mut doc = Self::new(
            FAILED_REPORT_TITLE.into(),
            format!("리포트 생성 중 오류가 발생했습니다: {}", message),
            vec![Section::Text(section)],
        );
        doc.error = true;
        doc
    }

    pub fn recount(&mut self) {
        self.stats = ReportStats::count(&self.sections);
    }
}

/* Job outcome */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub caption_length: usize,
    pub summary_length: usize,
    pub user_id: String,
    pub job_id: String,
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a pipeline run hands back to its caller; always well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    pub report: ReportDocument,
    pub process_info: ProcessInfo,
}
