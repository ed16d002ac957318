//! Record lifecycle hooks.
//!
//! Called from whatever creates or deletes video records. Both hooks only
//! submit jobs; they never wait for them, and a queue failure is logged
//! rather than propagated so the record operation itself always completes.

use vf_core::events::EventPayload;
use vf_core::{CleanupTarget, JobId, NewJob, VideoAsset};

use crate::context::PipelineContext;

/// Handles of the jobs queued for a new video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainHandles {
    pub probe: JobId,
    /// Runs only after `probe` has completed.
    pub transcode: JobId,
}

fn submit(ctx: &PipelineContext, job: NewJob) -> Option<JobId> {
    let (video_id, kind) = (job.video_id, job.kind);
    match ctx.queue.enqueue(job) {
        Ok(job_id) => {
            tracing::debug!(job_id = %job_id, video_id = %video_id, kind = %kind, "Job queued");
            ctx.events.broadcast(EventPayload::JobQueued {
                job_id,
                video_id,
                kind,
            });
            Some(job_id)
        }
        Err(e) => {
            tracing::error!(video_id = %video_id, kind = %kind, error = %e, "Failed to queue job");
            None
        }
    }
}

/// Queue probe → transcode for a newly created video.
///
/// Returns `None` if either submission failed. If the probe was queued but
/// the transcode was not, the probe still runs on its own.
pub fn on_create(ctx: &PipelineContext, asset: &VideoAsset) -> Option<ChainHandles> {
    let probe = submit(ctx, NewJob::probe(asset.id))?;
    let transcode = submit(ctx, NewJob::transcode(asset.id, probe))?;

    tracing::info!(
        video_id = %asset.id,
        probe_job = %probe,
        transcode_job = %transcode,
        "Queued processing chain"
    );
    Some(ChainHandles { probe, transcode })
}

/// Queue removal of a deleted video's files.
///
/// The paths are captured now, while `asset` still describes them.
pub fn on_delete(ctx: &PipelineContext, asset: &VideoAsset) -> Option<JobId> {
    let target = CleanupTarget::for_asset(asset, &ctx.config.media_root);
    let job_id = submit(ctx, NewJob::cleanup(asset.id, target))?;
    tracing::info!(video_id = %asset.id, job_id = %job_id, "Queued cleanup");
    Some(job_id)
}
