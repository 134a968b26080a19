mod api_types;
mod caption;
mod extract;
mod fetch;
mod llm;
mod models;
mod orchestrator;
mod out_models;
mod placement;
mod progress;
mod prompts;
mod render;
mod report;
mod segment;
mod service;
mod settings;
mod stage;
mod store;
mod summarize;
mod viz_analysis;
mod viz_generate;
mod viz_normalize;
mod viz_payload;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use awful_aj::{config, template};
use clap::Parser;
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::fetch::{VidcapCaptionSource, VideoRef};
use crate::llm::AwfulJadeModel;
use crate::orchestrator::ReportPipeline;
use crate::progress::ProgressStore;
use crate::service::ReportService;
use crate::settings::{AnalysisPromptVariant, PipelineSettings, PlacementStrategy, DEFAULT_CAPTION_API_URL};
use crate::store::{FsArtifactStore, FsJobStore};

/// Awful Video Report - turns YouTube captions into a visual report
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YouTube URLs to analyse; each runs as its own job
    #[arg(required = true, num_args = 1..)]
    urls: Vec<String>,

    /// Owner of the jobs and the stored artifacts
    #[arg(short, long, default_value = "local")]
    user_id: String,

    /// Output directory for reports, captions and job records (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Path to config file (overrides AJ_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<String>,

    /// Caption service endpoint
    #[arg(long, default_value = DEFAULT_CAPTION_API_URL)]
    caption_api_url: String,

    /// Caption service bearer token
    #[arg(long, env = "VIDCAP_API_KEY", hide_env_values = true, default_value = "")]
    caption_api_key: String,

    /// Caption request timeout in seconds
    #[arg(long, default_value_t = 30)]
    caption_timeout_secs: u64,

    /// How visualizations are anchored between report sections
    #[arg(long, value_enum, default_value_t = PlacementStrategy::Sequential)]
    placement: PlacementStrategy,

    /// Which visualization-analysis prompt to use
    #[arg(long, value_enum, default_value_t = AnalysisPromptVariant::Detailed)]
    analysis_prompt: AnalysisPromptVariant,
}

fn resolve_paths() -> Result<(PathBuf, PathBuf, PathBuf)> {
    // 1) Base config dir: AJ_CONFIG_DIR, else awful_aj::config_dir()
    let base_dir = if let Ok(dir) = std::env::var("AJ_CONFIG_DIR") {
        PathBuf::from(dir)
    } else {
        awful_aj::config_dir().map_err(|e| anyhow!(e.to_string()))?
    };

    // 2) Config file: AJ_CONFIG, else <base>/config.yaml
    let cfg_path = if let Ok(p) = std::env::var("AJ_CONFIG") {
        PathBuf::from(p)
    } else {
        base_dir.join("config.yaml")
    };

    // 3) Template dir: AJ_TEMPLATE_DIR, else <base>/templates
    let tpl_dir = if let Ok(p) = std::env::var("AJ_TEMPLATE_DIR") {
        PathBuf::from(p)
    } else {
        let d = base_dir.join("templates");
        // the awful_aj template loader reads this
        std::env::set_var("AJ_TEMPLATE_DIR", &d);
        d
    };

    Ok((base_dir, cfg_path, tpl_dir))
}

impl Args {
    fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            caption_api_url: self.caption_api_url.clone(),
            caption_api_key: self.caption_api_key.clone(),
            caption_timeout: Duration::from_secs(self.caption_timeout_secs),
            placement: self.placement,
            analysis_prompt: self.analysis_prompt,
            ..PipelineSettings::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting awful_video_report");

    let args = Args::parse();

    // Template dir is resolved either way so AJ_TEMPLATE_DIR gets its default.
    let (_base_dir, default_cfg_path, tpl_dir) = resolve_paths()?;
    let cfg_path = match args.config {
        Some(ref p) => {
            debug!("Using config file from --config argument: {}", p);
            PathBuf::from(p)
        }
        None => {
            debug!("Using config file from environment/default: {}", default_cfg_path.display());
            default_cfg_path
        }
    };
    debug!("Template directory: {}", tpl_dir.display());

    if !cfg_path.exists() {
        return Err(anyhow!(
            "awful_aj config not found at {}\n\
             Use --config to specify a config file, or set AJ_CONFIG environment variable.\n\
             Example config.yaml:\n\
             api_key: \"YOUR_KEY\"\napi_base: \"http://localhost:5001/v1\"\nmodel: \"qwen3_30b_a3\"\n",
            cfg_path.display()
        ));
    }

    let cfg = config::load_config(
        cfg_path
            .to_str()
            .ok_or_else(|| anyhow!("invalid config path"))?,
    )
    .map_err(|e| anyhow!(e.to_string()))?;

    let tpl_name = std::env::var("AJ_TEMPLATE_REPORT").unwrap_or_else(|_| "video_report_analyst".to_string());
    let tpl = template::load_template(&tpl_name)
        .await
        .map_err(|e| anyhow!(e.to_string()))?;

    let settings = args.settings();
    if settings.caption_api_key.is_empty() {
        debug!("VIDCAP_API_KEY not set - caption requests go out unauthenticated");
    }
    info!(
        "Configuration - jobs={}, user_id={}, output_dir={}, placement={:?}, analysis_prompt={:?}",
        args.urls.len(),
        args.user_id,
        args.output_dir,
        settings.placement,
        settings.analysis_prompt
    );

    let llm = Arc::new(AwfulJadeModel::new(cfg, tpl));
    let captions = Arc::new(VidcapCaptionSource::new(
        settings.caption_api_url.clone(),
        settings.caption_api_key.clone(),
        settings.caption_timeout,
    )?);
    let artifacts = Arc::new(FsArtifactStore::new(&args.output_dir));
    let jobs = Arc::new(FsJobStore::new(&args.output_dir));
    let progress = ProgressStore::new();

    let pipeline = ReportPipeline::standard(llm, captions, artifacts.clone(), Arc::new(progress.clone()), &settings)?;
    let service = Arc::new(ReportService::new(Arc::new(pipeline), artifacts, jobs, progress));

    for url in &args.urls {
        if let Err(e) = VideoRef::parse(url) {
            debug!("URL not recognised as a YouTube video, passing through - url={}, error={:#}", url, e);
        }
    }

    // One task per job.
    let handles: Vec<_> = args
        .urls
        .iter()
        .cloned()
        .map(|url| {
            let service = Arc::clone(&service);
            let user_id = args.user_id.clone();
            tokio::spawn(async move {
                let result = service.process_job(&user_id, &url).await;
                (url, result)
            })
        })
        .collect();

    let mut failed = 0usize;
    for joined in join_all(handles).await {
        match joined {
            Ok((url, r)) => {
                if !r.outcome.success {
                    failed += 1;
                }
                println!(
                    "{}\t{}\t{}\t{}",
                    r.job_id,
                    if r.outcome.success { "completed" } else { "failed" },
                    r.report_key.as_deref().unwrap_or("-"),
                    url
                );
            }
            Err(e) => {
                failed += 1;
                error!("Job task panicked - error={}", e);
            }
        }
    }

    info!("All jobs finished - total={}, failed={}", args.urls.len(), failed);
    Ok(())
}
