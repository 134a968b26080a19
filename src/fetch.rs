use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::api_types::ApiCaptionResponse;

/* -------------------------------------------------------------------------- */
/* Video references                                                           */
/* -------------------------------------------------------------------------- */

/// A YouTube video id pulled out of one of the usual URL shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub video_id: String,
}

impl VideoRef {
    /// Accepts `watch?v=`, `youtu.be/`, `/shorts/` and `/embed/` URLs.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).with_context(|| format!("Invalid video URL: {}", raw))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("Video URL has no host: {}", raw))?
            .trim_start_matches("www.")
            .trim_start_matches("m.");

        let id = match host {
            "youtu.be" => url.path_segments().and_then(|mut s| s.next()).map(str::to_string),
            "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
                let mut segments = url.path_segments().map(|s| s.collect::<Vec<_>>()).unwrap_or_default();
                segments.retain(|s| !s.is_empty());
                match segments.as_slice() {
                    ["watch"] => url
                        .query_pairs()
                        .find(|(k, _)| k == "v")
                        .map(|(_, v)| v.into_owned()),
                    ["shorts", id, ..] | ["embed", id, ..] | ["live", id, ..] => Some(id.to_string()),
                    _ => None,
                }
            }
            other => bail!("Not a YouTube host: {}", other),
        };

        match id.filter(|s| is_video_id(s)) {
            Some(video_id) => Ok(Self { video_id }),
            None => bail!("No video id in URL: {}", raw),
        }
    }
}

fn is_video_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/* -------------------------------------------------------------------------- */
/* Caption sources                                                            */
/* -------------------------------------------------------------------------- */

/// Returns the plain caption text for a video, or an empty string when the
/// provider has none. Transport and HTTP failures are errors.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn fetch(&self, video_url: &str, locale: &str) -> Result<String>;
}

/// Vidcap caption API client.
pub struct VidcapCaptionSource {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl VidcapCaptionSource {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build caption HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CaptionSource for VidcapCaptionSource {
    async fn fetch(&self, video_url: &str, locale: &str) -> Result<String> {
        let start = std::time::Instant::now();
        debug!("Fetching captions - url={}, locale={}", video_url, locale);

        let mut req = self
            .client
            .get(&self.endpoint)
            .query(&[("url", video_url), ("locale", locale)]);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("Request failed for {}", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("HTTP error for {}", self.endpoint))?;

        let body: ApiCaptionResponse = resp
            .json()
            .await
            .with_context(|| format!("Decoding JSON for {}", self.endpoint))?;
        let content = body.content();

        info!(
            "Caption API fetch completed - duration={:.2}s, caption_length={} chars",
            start.elapsed().as_secs_f32(),
            content.chars().count()
        );
        Ok(content)
    }
}
