//! Duration probe step.

use async_trait::async_trait;
use vf_core::events::EventPayload;
use vf_core::{Error, Job, VideoId};

use crate::context::PipelineContext;
use crate::step::Step;

/// Probe a video's source file and store its duration.
///
/// When the record already has a duration the probe is skipped and the
/// stored value returned, unless `force` is set. Returns the duration in
/// seconds.
///
/// # Errors
///
/// [`Error::NotFound`] if the video does not exist, [`Error::Probe`] if it
/// has no source file or ffprobe fails.
pub async fn run_probe(ctx: &PipelineContext, video_id: VideoId, force: bool) -> vf_core::Result<f64> {
    let asset = ctx
        .store
        .get_video(video_id)?
        .ok_or_else(|| Error::not_found("video", video_id))?;

    if let (Some(existing), false) = (asset.duration_secs, force) {
        tracing::info!(video_id = %video_id, duration_secs = existing, "Duration already known; skipping probe");
        return Ok(existing);
    }

    let source = asset
        .source_path
        .as_deref()
        .ok_or_else(|| Error::probe(format!("video {video_id} has no source file")))?;

    let seconds = vf_av::probe_duration(&ctx.tools, source, ctx.config.probe.timeout()).await?;

    ctx.store.update_duration(video_id, seconds)?;
    tracing::info!(video_id = %video_id, duration_secs = seconds, "Stored probed duration");

    ctx.events.broadcast(EventPayload::DurationProbed {
        video_id,
        duration_secs: seconds,
    });

    Ok(seconds)
}

/// [`Step`] for probe jobs.
#[derive(Debug, Default)]
pub struct ProbeStep {
    /// Re-probe even if a duration is already stored.
    pub force: bool,
}

#[async_trait]
impl Step for ProbeStep {
    fn name(&self) -> &'static str {
        "Probe"
    }

    async fn execute(&self, ctx: &PipelineContext, job: &Job) -> vf_core::Result<()> {
        run_probe(ctx, job.video_id, self.force).await.map(|_| ())
    }
}
