use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::caption::CaptionStage;
use crate::fetch::{CaptionSource, VideoRef};
use crate::llm::LanguageModel;
use crate::models::PipelineState;
use crate::out_models::{JobOutcome, ProcessInfo, ReportDocument, Section, SectionOrigin, TextSection};
use crate::progress::{ProgressSink, CANCELLED_MESSAGE, FAILED_PROGRESS};
use crate::report::ReportAssemblyStage;
use crate::settings::PipelineSettings;
use crate::stage::Stage;
use crate::store::ArtifactStore;
use crate::summarize::SummarizationStage;
use crate::viz_analysis::VisualizationAnalysisStage;
use crate::viz_generate::VisualizationGenerationStage;
use crate::viz_payload::VizPayload;

/// Raised between stages when the job was cancelled through the progress sink.
#[derive(Debug)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(CANCELLED_MESSAGE)
    }
}

impl std::error::Error for Cancelled {}

/// Runs the stages of one job strictly in order over a fresh `PipelineState`.
pub struct ReportPipeline {
    stages: Vec<Arc<dyn Stage>>,
    progress: Arc<dyn ProgressSink>,
}

impl ReportPipeline {
    pub fn new(stages: Vec<Arc<dyn Stage>>, progress: Arc<dyn ProgressSink>) -> Self {
        Self { stages, progress }
    }

    /// caption → summary → visualization analysis → visualization generation → report.
    pub fn standard(
        llm: Arc<dyn LanguageModel>,
        captions: Arc<dyn CaptionSource>,
        artifacts: Arc<dyn ArtifactStore>,
        progress: Arc<dyn ProgressSink>,
        settings: &PipelineSettings,
    ) -> Result<Self> {
        let stages: Vec<Arc<dyn Stage>> = vec![
            Arc::new(CaptionStage::new(captions, artifacts, settings.caption_locale.clone())),
            Arc::new(SummarizationStage::new(llm.clone(), settings)),
            Arc::new(VisualizationAnalysisStage::new(llm.clone(), settings)),
            Arc::new(VisualizationGenerationStage::new(llm.clone(), settings)),
            Arc::new(ReportAssemblyStage::new(llm, settings).context("building report stage")?),
        ];
        Ok(Self::new(stages, progress))
    }

    fn report_progress(&self, job_id: &str, percent: i32, message: &str) {
        if let Err(e) = self.progress.update(job_id, percent, message) {
            warn!("Progress update failed (ignored) - job_id={}, progress={}, error={:#}", job_id, percent, e);
        }
    }

    /// Never fails: every outcome, including a crashed stage or a cancelled
    /// job, comes back as a well-formed `JobOutcome`.
    pub async fn run_job(&self, job_id: &str, user_id: &str, source_url: &str) -> JobOutcome {
        let pipeline_start = std::time::Instant::now();
        info!("Pipeline started - job_id={}, user_id={}, url={}", job_id, user_id, source_url);
        self.report_progress(job_id, 0, "🚀 분석 시작...");

        let mut state = PipelineState::new(job_id, user_id, source_url);
        let outcome = match self.run_stages(&mut state).await {
            Ok(()) => {
                let report = state
                    .report
                    .take()
                    .map(finalize_report)
                    .unwrap_or_else(|| ReportDocument::failure("리포트가 생성되지 않았습니다."));
                self.report_progress(job_id, 100, "✅ 분석 완료!");
                build_outcome(&state, report, None)
            }
            Err(e) if e.downcast_ref::<Cancelled>().is_some() => {
                warn!("Pipeline cancelled - job_id={}", job_id);
                build_outcome(&state, ReportDocument::failure(CANCELLED_MESSAGE), Some(e.to_string()))
            }
            Err(e) => {
                error!("Pipeline failed - job_id={}, error={:#}", job_id, e);
                self.report_progress(job_id, FAILED_PROGRESS, &format!("❌ 분석 실패: {:#}", e));
                let report = ReportDocument::failure(&format!("워크플로우 실행 중 오류가 발생했습니다: {:#}", e));
                build_outcome(&state, report, Some(format!("{:#}", e)))
            }
        };

        info!(
            "Pipeline completed - job_id={}, duration={:.2}s, success={}, sections={}, visual_sections={}",
            job_id,
            pipeline_start.elapsed().as_secs_f32(),
            outcome.success,
            outcome.report.stats.total_sections,
            outcome.report.stats.visual_sections
        );
        outcome
    }

    async fn run_stages(&self, state: &mut PipelineState) -> Result<()> {
        for stage in &self.stages {
            if self.progress.is_cancelled(state.job_id()) {
                return Err(Cancelled.into());
            }
            let (percent, message) = stage.checkpoint();
            self.report_progress(state.job_id(), percent, message);

            let start = std::time::Instant::now();
            stage
                .run(state)
                .await
                .with_context(|| format!("stage '{}' failed", stage.name()))?;
            debug!(
                "Stage completed - stage={}, duration={:.2}s",
                stage.name(),
                start.elapsed().as_secs_f32()
            );
        }
        Ok(())
    }
}

fn build_outcome(state: &PipelineState, report: ReportDocument, error: Option<String>) -> JobOutcome {
    JobOutcome {
        success: error.is_none() && !report.error,
        process_info: ProcessInfo {
            source_url: state.source_url().to_string(),
            video_id: VideoRef::parse(state.source_url()).ok().map(|v| v.video_id),
            caption_length: state.transcript.chars().count(),
            summary_length: state.summary.chars().count(),
            user_id: state.user_id().to_string(),
            job_id: state.job_id().to_string(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            error,
        },
        report,
    }
}

/* -------------------------------------------------------------------------- */
/* Finalize                                                                   */
/* -------------------------------------------------------------------------- */

/// Last structural pass over an assembled report: repairs malformed sections,
/// makes ids unique, flags visualizations whose payload lacks what its kind
/// needs, and recounts.
pub fn finalize_report(mut report: ReportDocument) -> ReportDocument {
    for (i, section) in report.sections.iter_mut().enumerate() {
        if let Section::Malformed { id, raw } = section {
            warn!("Malformed section repaired - id={}, index={}", id, i);
            let content = match raw {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            *section = Section::Text(TextSection {
                id: std::mem::take(id),
                title: format!("섹션 {}", i + 1),
                level: 2,
                content,
                keywords: Vec::new(),
                origin: SectionOrigin::RepairedFromMalformed,
            });
        }

        if let Section::Visualization(v) = section {
            let problem = if v.visualization_type != v.data.kind() {
                Some("시각화 유형이 데이터와 일치하지 않습니다")
            } else {
                missing_payload(&v.data)
            };
            if let Some(msg) = problem {
                warn!("Visualization section flagged - id={}, title={}, error={}", v.id, v.title, msg);
                v.error = Some(msg.to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    for (i, section) in report.sections.iter_mut().enumerate() {
        let base = if section.id().trim().is_empty() {
            format!("section_{}", i + 1)
        } else {
            section.id().to_string()
        };
        let mut id = base.clone();
        let mut n = 2;
        while !seen.insert(id.clone()) {
            id = format!("{}_{}", base, n);
            n += 1;
        }
        if id != section.id() {
            debug!("Section id rewritten - from={}, to={}", section.id(), id);
            section.set_id(id);
        }
    }

    report.recount();
    report
}

fn missing_payload(payload: &VizPayload) -> Option<&'static str> {
    match payload {
        VizPayload::Chart(c) if c.config.get("data").map_or(true, Value::is_null) => Some("차트 설정이 없습니다"),
        VizPayload::Network(n) if n.nodes.is_empty() || n.edges.is_empty() => Some("네트워크 데이터가 없습니다"),
        VizPayload::Flow(f) if f.nodes.is_empty() => Some("플로우 데이터가 없습니다"),
        VizPayload::Timeline(t) if t.nodes.is_empty() && t.events.is_empty() => Some("타임라인 데이터가 없습니다"),
        VizPayload::Table(t) if t.headers.is_empty() && t.rows.is_empty() => Some("표 데이터가 없습니다"),
        VizPayload::Text(t) if t.description.trim().is_empty() && t.method.trim().is_empty() => {
            Some("시각화 데이터가 없습니다")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{VisualizationArtifact, Placement, CANNOT_ANALYZE, NO_CAPTION};
    use crate::out_models::VisualizationSection;
    use crate::progress::ProgressStore;
    use crate::testing::{MemoryArtifactStore, RecordingProgress, ScriptedModel, StaticCaptions};
    use crate::viz_normalize::placeholder;
    use crate::viz_payload::{TablePayload, VizKind};
    use async_trait::async_trait;
    use serde_json::json;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn pipeline(model: Arc<ScriptedModel>, captions: &str, progress: Arc<dyn ProgressSink>) -> ReportPipeline {
        ReportPipeline::standard(
            model,
            Arc::new(StaticCaptions::new(captions)),
            Arc::new(MemoryArtifactStore::default()),
            progress,
            &PipelineSettings::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn missing_caption_yields_single_cannot_analyze_section() {
        let model = Arc::new(ScriptedModel::new(Vec::<&str>::new()));
        let progress = Arc::new(RecordingProgress::default());
        let outcome = pipeline(model.clone(), "", progress.clone())
            .run_job("job-a", "user", URL)
            .await;

        assert!(!outcome.success);
        assert_eq!(model.calls(), 0);
        assert_eq!(outcome.report.sections.len(), 1);
        let Section::Text(t) = &outcome.report.sections[0] else {
            panic!("expected text section");
        };
        assert!(t.content.contains(CANNOT_ANALYZE));
        assert_eq!(outcome.process_info.caption_length, NO_CAPTION.chars().count());
        assert_eq!(outcome.process_info.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(progress.percents(), vec![0, 20, 40, 60, 70, 80, 100]);
    }

    #[tokio::test]
    async fn unparsable_visualization_leaves_report_without_visuals() {
        let summary = format!(
            "## 개요\n이 영상은 채널별 매출 구조와 성장 요인을 자세히 설명하는 강의입니다.\n\n{}\n\n{}",
            "온라인 매출이 40% 증가했고 오프라인 매출은 35%에 머물렀으며 나머지는 기타 채널이 차지했습니다. ".repeat(6),
            "핵심 결론은 모바일 결제의 확산이 전체 성장을 이끌었다는 점이며 앞으로도 이어질 전망입니다. ".repeat(6)
        );
        let analysis = json!({"visualization_requests": [
            {"purpose": "data", "content_description": "채널별 매출", "related_content": "온라인 매출이 40% 증가했고 오프라인 매출은 35%에 머물렀으며"}
        ]})
        .to_string();
        let model = Arc::new(ScriptedModel::new(vec![
            summary.clone(),
            analysis,
            "시각화를 만들 수 없습니다".to_string(),
            "구조화 실패".to_string(),
        ]));
        let outcome = pipeline(model.clone(), "자막 본문입니다. 매출 이야기를 합니다.", Arc::new(ProgressStore::new()))
            .run_job("job-c", "user", URL)
            .await;

        assert!(outcome.success);
        assert_eq!(model.calls(), 4);
        assert_eq!(outcome.report.stats.visual_sections, 0);
        assert_eq!(outcome.report.stats.text_sections, 2);
        assert!(outcome.report.sections.iter().all(Section::is_text));
        assert_eq!(outcome.process_info.summary_length, summary.trim().chars().count());
    }

    #[tokio::test]
    async fn full_run_places_visualizations_sequentially() {
        let summary = "## 개요\n러스트의 소유권 모델을 설명하는 영상입니다. ".repeat(30);
        let analysis = json!({"visualization_requests": [
            {"purpose": "structure", "content_description": "소유권 규칙", "related_content": "러스트의 소유권 모델을 설명하는 영상입니다."},
            {"purpose": "process", "content_description": "빌림 흐름", "related_content": "러스트의 소유권 모델을 설명하는 영상입니다."}
        ]})
        .to_string();
        let sections = json!({"sections": (0..5).map(|i| json!({
            "id": format!("s{}", i), "title": format!("제목 {}", i), "type": "text", "content": format!("본문 {}", i), "level": 1
        })).collect::<Vec<_>>()})
        .to_string();
        let model = Arc::new(ScriptedModel::new(vec![
            summary,
            analysis,
            r#"{"type": "visjs", "title": "규칙", "config": {"nodes": [{"id": 1, "label": "소유"}, {"id": 2, "label": "이동"}], "edges": [{"from": 1, "to": 2}]}}"#.to_string(),
            r#"{"type": "reactflow", "title": "흐름", "config": {"nodes": [{"id": "1", "data": {"label": "빌림"}, "position": {"x": 0, "y": 0}}]}}"#.to_string(),
            sections,
        ]));
        let outcome = pipeline(model, "러스트 자막", Arc::new(ProgressStore::new()))
            .run_job("job-d", "user", URL)
            .await;

        assert!(outcome.success);
        let ids: Vec<&str> = outcome.report.sections.iter().map(Section::id).collect();
        assert_eq!(ids, vec!["s0", "visual_1", "s1", "visual_2", "s2", "s3", "s4"]);
        assert_eq!(outcome.report.stats.visual_sections, 2);
        assert_eq!(outcome.report.stats.total_sections, 7);
    }

    struct ExplodingStage;

    #[async_trait]
    impl Stage for ExplodingStage {
        fn name(&self) -> &'static str {
            "exploding"
        }
        fn checkpoint(&self) -> (i32, &'static str) {
            (10, "boom")
        }
        async fn run(&self, _state: &mut PipelineState) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    #[tokio::test]
    async fn pipeline_fatal_error_becomes_failure_outcome() {
        let progress = Arc::new(ProgressStore::new());
        let pipeline = ReportPipeline::new(vec![Arc::new(ExplodingStage)], progress.clone());
        let outcome = pipeline.run_job("job-x", "user", "not a url").await;

        assert!(!outcome.success);
        assert!(outcome.report.error);
        assert!(outcome.process_info.error.as_deref().unwrap().contains("disk on fire"));
        assert_eq!(outcome.process_info.video_id, None);
        let p = progress.get("job-x");
        assert_eq!(p.progress, FAILED_PROGRESS);
        assert!(p.message.contains("분석 실패"));
    }

    #[tokio::test]
    async fn progress_failures_are_ignored() {
        let model = Arc::new(ScriptedModel::new(Vec::<&str>::new()));
        let progress = Arc::new(RecordingProgress::failing());
        let outcome = pipeline(model, "", progress).run_job("job-p", "user", URL).await;
        assert_eq!(outcome.report.sections.len(), 1);
    }

    #[tokio::test]
    async fn cancellation_is_checked_between_stages() {
        let model = Arc::new(ScriptedModel::new(Vec::<&str>::new()));
        let progress = Arc::new(ProgressStore::new());
        progress.cancel("job-k");
        let outcome = pipeline(model.clone(), "자막", progress.clone())
            .run_job("job-k", "user", URL)
            .await;

        assert!(!outcome.success);
        assert_eq!(model.calls(), 0);
        assert_eq!(outcome.process_info.error.as_deref(), Some(CANCELLED_MESSAGE));
        assert!(progress.is_cancelled("job-k"));
    }

    fn viz_section(id: &str, kind: VizKind, data: VizPayload) -> Section {
        let artifact = VisualizationArtifact {
            title: "t".into(),
            kind,
            payload: data,
            insight: String::new(),
            placement: Placement::sequential(0),
            purpose: String::new(),
            benefit_description: String::new(),
            source_excerpt: String::new(),
        };
        Section::Visualization(VisualizationSection::from_artifact(id.into(), &artifact))
    }

    #[test]
    fn finalize_repairs_dedupes_and_flags() {
        let doc = ReportDocument::new(
            "제목".into(),
            "요약.".into(),
            vec![
                Section::Malformed { id: "section_1".into(), raw: json!("그냥 문자열") },
                Section::Malformed { id: "section_1".into(), raw: json!({"title": "내용 없음"}) },
                viz_section("visual_1", VizKind::Table, VizPayload::Table(TablePayload { headers: vec![], rows: vec![] })),
                viz_section("visual_2", VizKind::Network, placeholder(VizKind::Network, "visjs", false)),
                viz_section("visual_3", VizKind::Chart, placeholder(VizKind::Network, "visjs", false)),
            ],
        );
        let doc = finalize_report(doc);

        let Section::Text(first) = &doc.sections[0] else {
            panic!("expected repaired text section");
        };
        assert_eq!(first.origin, SectionOrigin::RepairedFromMalformed);
        assert_eq!(first.content, "그냥 문자열");
        assert_eq!(doc.sections[1].id(), "section_1_2");

        let errors: Vec<Option<String>> = doc
            .sections
            .iter()
            .filter_map(|s| match s {
                Section::Visualization(v) => Some(v.error.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            errors,
            vec![
                Some("표 데이터가 없습니다".to_string()),
                None,
                Some("시각화 유형이 데이터와 일치하지 않습니다".to_string()),
            ]
        );
        assert_eq!(doc.stats.text_sections, 2);
        assert_eq!(doc.stats.visual_sections, 3);
    }
}
