use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::llm::LanguageModel;
use crate::models::{classify_transcript, PipelineState, TranscriptStatus, CANNOT_ANALYZE, SUMMARY_FAILURE};
use crate::prompts;
use crate::segment::condense;
use crate::settings::PipelineSettings;
use crate::stage::Stage;

pub struct SummarizationStage {
    llm: Arc<dyn LanguageModel>,
    budget_chars: usize,
    min_summary_chars: usize,
}

impl SummarizationStage {
    pub fn new(llm: Arc<dyn LanguageModel>, settings: &PipelineSettings) -> Self {
        Self {
            llm,
            budget_chars: settings.transcript_budget_chars,
            min_summary_chars: settings.min_summary_chars,
        }
    }

    async fn summarize(&self, transcript: &str) -> Result<String> {
        let condensed;
        let text = if transcript.chars().count() > self.budget_chars {
            condensed = condense(transcript, self.budget_chars);
            condensed.as_str()
        } else {
            transcript
        };

        let first = self.llm.complete(&prompts::summary(text)).await?.trim().to_string();
        let first_len = first.chars().count();
        if first_len >= self.min_summary_chars {
            return Ok(first);
        }

        // At most one elaboration request; its answer is final.
        warn!(
            "Summary too short - length={} chars, min={} chars, requesting elaboration",
            first_len, self.min_summary_chars
        );
        let second = self
            .llm
            .complete(&prompts::summary_elaboration(text, &first))
            .await?
            .trim()
            .to_string();
        debug!("Elaborated summary received - length={} chars", second.chars().count());
        Ok(second)
    }
}

#[async_trait]
impl Stage for SummarizationStage {
    fn name(&self) -> &'static str {
        "summarize"
    }

    fn checkpoint(&self) -> (i32, &'static str) {
        (40, "🧠 요약 생성 중...")
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        if classify_transcript(&state.transcript) != TranscriptStatus::Usable {
            info!("Summarization skipped - job_id={}, reason=no usable transcript", state.job_id());
            state.summary = CANNOT_ANALYZE.to_string();
            return Ok(());
        }

        let start = std::time::Instant::now();
        state.summary = match self.summarize(&state.transcript).await {
            Ok(s) => {
                info!(
                    "Summarization completed - duration={:.2}s, summary_length={} chars",
                    start.elapsed().as_secs_f32(),
                    s.chars().count()
                );
                s
            }
            Err(e) => {
                error!("Summarization failed - job_id={}, error={:#}", state.job_id(), e);
                format!("{}: {:#}", SUMMARY_FAILURE, e)
            }
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{is_sentinel_summary, NO_CAPTION};
    use crate::testing::ScriptedModel;

    fn stage(model: Arc<ScriptedModel>) -> SummarizationStage {
        SummarizationStage::new(model, &PipelineSettings::default())
    }

    fn with_transcript(t: &str) -> PipelineState {
        let mut st = PipelineState::new("j", "u", "https://youtu.be/abc");
        st.transcript = t.to_string();
        st
    }

    #[tokio::test]
    async fn sentinel_transcript_short_circuits() {
        for t in ["", NO_CAPTION, "자막 API 호출 실패: 503", "자막 추출 실패: x"] {
            let model = Arc::new(ScriptedModel::new(Vec::<&str>::new()));
            let mut st = with_transcript(t);
            stage(model.clone()).run(&mut st).await.unwrap();
            assert_eq!(st.summary, CANNOT_ANALYZE);
            assert_eq!(model.calls(), 0);
        }
    }

    #[tokio::test]
    async fn long_summary_accepted_without_followup() {
        let long = "가".repeat(600);
        let model = Arc::new(ScriptedModel::new(vec![long.clone()]));
        let mut st = with_transcript("러스트의 소유권에 대한 영상입니다.");
        stage(model.clone()).run(&mut st).await.unwrap();
        assert_eq!(st.summary, long);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn short_summary_gets_exactly_one_followup() {
        // The second answer is still short; it is accepted anyway.
        let model = Arc::new(ScriptedModel::new(vec!["짧은 요약", "조금 더 긴 요약"]));
        let mut st = with_transcript("러스트의 소유권에 대한 영상입니다.");
        stage(model.clone()).run(&mut st).await.unwrap();
        assert_eq!(st.summary, "조금 더 긴 요약");
        assert_eq!(model.calls(), 2);
        let prompts = model.prompts();
        assert!(prompts[1].user.contains("짧은 요약"));
    }

    #[tokio::test]
    async fn oversized_transcript_is_condensed_before_prompting() {
        let transcript = "핵심 내용은 다음과 같습니다. 일반 문장입니다. ".repeat(400);
        let model = Arc::new(ScriptedModel::new(vec!["나".repeat(600)]));
        let mut st = with_transcript(&transcript);
        stage(model.clone()).run(&mut st).await.unwrap();
        let sent = &model.prompts()[0].user;
        assert!(sent.chars().count() < transcript.chars().count());
    }

    #[tokio::test]
    async fn model_error_becomes_prefixed_sentinel() {
        let model = Arc::new(ScriptedModel::failing("503 Service Unavailable"));
        let mut st = with_transcript("러스트의 소유권에 대한 영상입니다.");
        stage(model).run(&mut st).await.unwrap();
        assert!(st.summary.starts_with(SUMMARY_FAILURE));
        assert!(st.summary.contains("503"));
        assert!(is_sentinel_summary(&st.summary));
    }

    #[tokio::test]
    async fn padding_does_not_count_toward_minimum_length() {
        let padded = format!("\n\n{}\n{}\n", "가".repeat(450), " ".repeat(100));
        let model = Arc::new(ScriptedModel::new(vec![padded, format!("  {}  ", "나".repeat(520))]));
        let mut st = with_transcript("러스트의 소유권에 대한 영상입니다.");
        stage(model.clone()).run(&mut st).await.unwrap();
        assert_eq!(model.calls(), 2);
        assert_eq!(st.summary, "나".repeat(520));
        assert!(model.prompts()[1].user.contains(&"가".repeat(450)));
    }
}
