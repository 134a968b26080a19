use anyhow::Result;
use async_trait::async_trait;

use crate::models::PipelineState;

/// One step of the report pipeline.
///
/// A stage reads the fields of [`PipelineState`] written by earlier stages and
/// fills in its own. Expected failures (missing captions, model errors, bad
/// JSON) are absorbed inside `run` and recorded as sentinel values; an `Err`
/// means something unexpected happened and the orchestrator aborts the job.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Progress percentage and status message reported before the stage runs.
    fn checkpoint(&self) -> (i32, &'static str);

    async fn run(&self, state: &mut PipelineState) -> Result<()>;
}
