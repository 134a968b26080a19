use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api_types::ApiStructuredSections;
use crate::extract::extract_as;
use crate::llm::LanguageModel;
use crate::models::{is_sentinel_summary, LocationHint, PipelineState, VisualizationArtifact};
use crate::out_models::{ReportDocument, Section, SectionOrigin, TextSection, VisualizationSection};
use crate::placement::place;
use crate::prompts;
use crate::settings::{PipelineSettings, PlacementStrategy};
use crate::stage::Stage;

pub const NO_SUMMARY_MESSAGE: &str = "요약을 생성할 수 없습니다.";

const MIN_PARAGRAPH_CHARS: usize = 50;
const MAX_TITLE_CHARS: usize = 100;
const BRIEF_KEYWORDS: [&str; 6] = ["핵심", "중요", "주요", "결론", "목적", "요약"];
const GENERIC_TITLE_WORDS: [&str; 2] = ["개요", "요약"];

pub struct ReportAssemblyStage {
    llm: Arc<dyn LanguageModel>,
    placement: PlacementStrategy,
    blank_line: Regex,
}

impl ReportAssemblyStage {
    pub fn new(llm: Arc<dyn LanguageModel>, settings: &PipelineSettings) -> Result<Self> {
        Ok(Self {
            llm,
            placement: settings.placement,
            blank_line: Regex::new(r"\n[ \t]*\n")?,
        })
    }

    /// Builds the report for `summary`. Never fails: a missing or failed summary
    /// becomes a failure document, a failed structuring call falls back to the
    /// paragraph split.
    pub async fn assemble(&self, summary: &str, artifacts: &[VisualizationArtifact]) -> ReportDocument {
        if summary.trim().is_empty() {
            warn!("Report assembly - no summary available");
            return ReportDocument::failure(NO_SUMMARY_MESSAGE);
        }
        if is_sentinel_summary(summary) {
            info!("Report assembly - summary carries a failure message, building error report");
            return ReportDocument::failure(summary.trim());
        }

        let sections = self.structure(summary).await;
        debug!("Summary structured - sections={}", sections.len());

        let placed = match self.placement {
            PlacementStrategy::Sequential => artifacts.to_vec(),
            PlacementStrategy::Keyword => place_by_keyword(summary, &sections, artifacts),
        };

        let merged = merge_sections(sections, &placed);
        ReportDocument::new(extract_title(summary), brief_summary(summary), merged)
    }

    async fn structure(&self, summary: &str) -> Vec<Section> {
        let raw = match self.llm.complete(&prompts::structure_sections(summary)).await {
            Ok(r) => r,
            Err(e) => {
                error!("Section structuring call failed - error={:#}, using paragraph split", e);
                return self.paragraph_sections(summary);
            }
        };

        match extract_as::<ApiStructuredSections>(&raw) {
            Some(parsed) if !parsed.sections.is_empty() => parsed
                .sections
                .into_iter()
                .enumerate()
                .map(|(i, item)| section_from_value(i, item))
                .collect(),
            _ => {
                warn!("Section structuring returned no sections - using paragraph split");
                self.paragraph_sections(summary)
            }
        }
    }

    /// Deterministic fallback: one level-2 section per blank-line separated
    /// paragraph longer than 50 chars.
    pub fn paragraph_sections(&self, summary: &str) -> Vec<Section> {
        self.blank_line
            .split(summary)
            .map(str::trim)
            .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
            .enumerate()
            .map(|(i, p)| {
                Section::Text(TextSection {
                    id: format!("section_{}", i + 1),
                    title: format!("섹션 {}", i + 1),
                    level: 2,
                    content: p.to_string(),
                    keywords: Vec::new(),
                    origin: SectionOrigin::ParagraphSplit,
                })
            })
            .collect()
    }
}

/// Reads one model-supplied section entry. Anything without string content is
/// kept as `Malformed` for the finalize step to repair.
fn section_from_value(index: usize, item: Value) -> Section {
    let fallback_id = format!("section_{}", index + 1);
    let Some(obj) = item.as_object() else {
        return Section::Malformed { id: fallback_id, raw: item };
    };
    let Some(content) = obj.get("content").and_then(Value::as_str) else {
        let id = obj
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback_id);
        return Section::Malformed { id, raw: item };
    };

    let text = |k: &str| obj.get(k).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty());
    Section::Text(TextSection {
        id: text("id").map(str::to_string).unwrap_or(fallback_id),
        title: text("title")
            .map(str::to_string)
            .unwrap_or_else(|| format!("섹션 {}", index + 1)),
        level: obj
            .get("level")
            .and_then(Value::as_u64)
            .map(|l| l.clamp(1, 6) as u8)
            .unwrap_or(1),
        content: content.trim().to_string(),
        keywords: obj
            .get("keywords")
            .and_then(Value::as_array)
            .map(|ks| ks.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default(),
        origin: SectionOrigin::Model,
    })
}

fn section_text(s: &Section) -> String {
    match s {
        Section::Text(t) => format!("{} {}", t.title, t.content),
        Section::Visualization(v) => v.title.clone(),
        Section::Malformed { raw, .. } => raw.to_string(),
    }
}

/// Keyword placement: each artifact goes after the section sharing the most
/// words with its source excerpt, nudged toward the part of the summary the
/// excerpt was quoted from.
fn place_by_keyword(summary: &str, sections: &[Section], artifacts: &[VisualizationArtifact]) -> Vec<VisualizationArtifact> {
    let paragraphs: Vec<String> = sections.iter().map(section_text).collect();
    let summary_chars = summary.chars().count();

    artifacts
        .iter()
        .map(|a| {
            let hint = if a.source_excerpt.trim().is_empty() { &a.title } else { &a.source_excerpt };
            let location = match summary.find(a.source_excerpt.trim()).filter(|_| !a.source_excerpt.trim().is_empty()) {
                Some(byte_pos) => LocationHint::from_position(summary[..byte_pos].chars().count(), summary_chars),
                None => LocationHint::from_position(a.placement.after_paragraph_index, paragraphs.len()),
            };
            let mut placed = a.clone();
            placed.placement = place(paragraphs.as_slice(), hint, location);
            debug!(
                "Visualization placed - title={}, after_paragraph={}, score={}",
                a.title, placed.placement.after_paragraph_index, placed.placement.relevance_score
            );
            placed
        })
        .collect()
}

/// Interleaves artifacts into the section list. After section `i`, every not
/// yet emitted artifact anchored at `<= i` follows, in anchor order and then
/// submission order; leftovers are appended at the end.
pub fn merge_sections(sections: Vec<Section>, artifacts: &[VisualizationArtifact]) -> Vec<Section> {
    let mut sorted: Vec<&VisualizationArtifact> = artifacts.iter().collect();
    sorted.sort_by_key(|a| a.placement.after_paragraph_index);

    let mut out = Vec::with_capacity(sections.len() + sorted.len());
    let mut next = 0usize;
    let emit = |out: &mut Vec<Section>, next: &mut usize| {
        let a = sorted[*next];
        *next += 1;
        out.push(Section::Visualization(VisualizationSection::from_artifact(
            format!("visual_{}", *next),
            a,
        )));
    };

    for (i, section) in sections.into_iter().enumerate() {
        out.push(section);
        while next < sorted.len() && sorted[next].placement.after_paragraph_index <= i {
            emit(&mut out, &mut next);
        }
    }
    while next < sorted.len() {
        emit(&mut out, &mut next);
    }
    out
}

/// First line of the summary, capped at 100 chars. Generic headings
/// ("개요", "요약") defer to the first of three leading sentences that is
/// between 20 and 80 chars.
pub fn extract_title(summary: &str) -> String {
    let first_line = summary.lines().next().unwrap_or_default();
    let first_line = first_line.trim().trim_start_matches('#').trim();
    let line = if first_line.chars().count() > MAX_TITLE_CHARS {
        format!("{}...", first_line.chars().take(MAX_TITLE_CHARS - 3).collect::<String>())
    } else {
        first_line.to_string()
    };

    if GENERIC_TITLE_WORDS.iter().any(|w| line.contains(w)) {
        let better = summary
            .split('.')
            .take(3)
            .map(|s| s.trim().trim_start_matches('#').trim())
            .map(|s| s.lines().last().unwrap_or(s).trim())
            .find(|s| (21..80).contains(&s.chars().count()));
        if let Some(s) = better {
            return s.to_string();
        }
    }
    line
}

/// One or two sentences: those carrying an importance keyword among the first
/// ten, else the first two.
pub fn brief_summary(summary: &str) -> String {
    let flat = summary.replace('\n', " ");
    let sentences: Vec<&str> = flat.split('.').collect();

    let mut picked: Vec<&str> = sentences
        .iter()
        .take(10)
        .filter(|s| BRIEF_KEYWORDS.iter().any(|k| s.contains(k)))
        .map(|s| s.trim())
        .collect();
    if picked.is_empty() {
        picked = sentences
            .iter()
            .take(2)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
    }

    let mut brief = picked.into_iter().take(2).collect::<Vec<_>>().join(". ");
    if !brief.ends_with('.') {
        brief.push('.');
    }
    brief
}

#[async_trait]
impl Stage for ReportAssemblyStage {
    fn name(&self) -> &'static str {
        "report_assembly"
    }

    fn checkpoint(&self) -> (i32, &'static str) {
        (80, "📊 최종 리포트 생성 중...")
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let start = std::time::Instant::now();
        let doc = self.assemble(&state.summary, &state.visual_sections).await;
        info!(
            "Report assembly completed - duration={:.2}s, sections={}, visual_sections={}, error={}",
            start.elapsed().as_secs_f32(),
            doc.stats.total_sections,
            doc.stats.visual_sections,
            doc.error
        );
        state.report = Some(doc);
        Ok(())
    }
}
