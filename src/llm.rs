use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use awful_aj::{api::ask, config::AwfulJadeConfig, template::ChatTemplate};
use tracing::{debug, info};

/// System instructions plus the user turn for one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Single-message form for backends that only take one user turn.
    pub fn flatten(&self) -> String {
        if self.system.trim().is_empty() {
            self.user.clone()
        } else {
            format!("{}\n\n---\n\n{}", self.system.trim(), self.user)
        }
    }
}

/// Request/response model client shared by every stage. Implementations must
/// tolerate concurrent calls from independent jobs.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// awful_aj-backed client. Endpoint, model, key and request timeout come from
/// the awful_aj YAML config; the chat template supplies the base persona.
pub struct AwfulJadeModel {
    cfg: Arc<AwfulJadeConfig>,
    tpl: Arc<ChatTemplate>,
}

impl AwfulJadeModel {
    pub fn new(cfg: AwfulJadeConfig, tpl: ChatTemplate) -> Self {
        Self {
            cfg: Arc::new(cfg),
            tpl: Arc::new(tpl),
        }
    }
}

#[async_trait]
impl LanguageModel for AwfulJadeModel {
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let start = std::time::Instant::now();
        let user = prompt.flatten();
        debug!("LLM call starting - prompt_length={} chars", user.chars().count());

        let cfg = Arc::clone(&self.cfg);
        let tpl = Arc::clone(&self.tpl);
        let handle = tokio::runtime::Handle::current();

        // awful_aj hands back a non-Send boxed error; drive the call on a
        // blocking thread and flatten the error to text there.
        let answer = tokio::task::spawn_blocking(move || {
            handle
                .block_on(ask(&cfg, user, &tpl, None, None, false))
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| anyhow!("LLM task failed: {}", e))?
        .map_err(|e| anyhow!(e))?;

        info!(
            "LLM API call completed - duration={:.2}s, response_length={} chars",
            start.elapsed().as_secs_f32(),
            answer.chars().count()
        );

        Ok(answer)
    }
}
