use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::fetch::CaptionSource;
use crate::models::{PipelineState, CAPTION_API_FAILURE, CAPTION_FAILURE, NO_CAPTION};
use crate::stage::Stage;
use crate::store::{caption_key, ArtifactStore};

pub struct CaptionStage {
    source: Arc<dyn CaptionSource>,
    artifacts: Arc<dyn ArtifactStore>,
    locale: String,
}

impl CaptionStage {
    pub fn new(source: Arc<dyn CaptionSource>, artifacts: Arc<dyn ArtifactStore>, locale: impl Into<String>) -> Self {
        Self {
            source,
            artifacts,
            locale: locale.into(),
        }
    }
}

/// Transport and HTTP status errors read as an API failure; anything else
/// (undecodable body, client setup) as an extraction failure.
fn failure_sentinel(e: &anyhow::Error) -> String {
    let transport = e
        .chain()
        .find_map(|c| c.downcast_ref::<reqwest::Error>())
        .map(|re| !re.is_decode())
        .unwrap_or(false);
    let prefix = if transport { CAPTION_API_FAILURE } else { CAPTION_FAILURE };
    format!("{}: {:#}", prefix, e)
}

#[async_trait]
impl Stage for CaptionStage {
    fn name(&self) -> &'static str {
        "caption"
    }

    fn checkpoint(&self) -> (i32, &'static str) {
        (20, "📝 자막 추출 중...")
    }

    async fn run(&self, state: &mut PipelineState) -> Result<()> {
        let start = std::time::Instant::now();
        info!("Caption extraction starting - job_id={}, url={}", state.job_id(), state.source_url());

        let caption = match self.source.fetch(state.source_url(), &self.locale).await {
            Ok(c) if c.trim().is_empty() => {
                warn!("No captions returned - job_id={}", state.job_id());
                NO_CAPTION.to_string()
            }
            Ok(c) => {
                let key = caption_key(state.user_id(), state.job_id());
                match self.artifacts.put_text(&key, &c).await {
                    Ok(()) => info!("Caption artifact stored - key={}", key),
                    Err(e) => warn!("Caption artifact store failed (ignored) - key={}, error={:#}", key, e),
                }
                c
            }
            Err(e) => {
                let sentinel = failure_sentinel(&e);
                error!("Caption extraction failed - job_id={}, error={:#}", state.job_id(), e);
                sentinel
            }
        };

        info!(
            "Caption extraction completed - duration={:.2}s, caption_length={} chars",
            start.elapsed().as_secs_f32(),
            caption.chars().count()
        );
        state.transcript = caption;
        Ok(())
    }
}
