//! Queue consumer.
//!
//! Polls the job queue, runs the matching [`Step`](crate::Step) for each
//! claimed job, and records the outcome. One job at a time per worker.

use tokio_util::sync::CancellationToken;
use vf_core::events::EventPayload;

use crate::context::PipelineContext;
use crate::steps::step_for;

/// Tries at recording a job's outcome before the job is handed back to the
/// queue.
const STATUS_WRITE_ATTEMPTS: u32 = 3;

/// Run the worker loop until `cancel` is triggered.
///
/// Jobs this worker id left `processing` in an earlier run are requeued
/// first. When the queue is empty the loop sleeps for the configured poll
/// interval.
pub async fn run_worker(ctx: PipelineContext, cancel: CancellationToken) {
    let worker_id = ctx.config.worker.worker_id.clone();
    tracing::info!(worker_id = %worker_id, "Worker started");

    match ctx.queue.reset_orphaned(&worker_id) {
        Ok(0) => {}
        Ok(n) => tracing::warn!(worker_id = %worker_id, count = n, "Requeued orphaned jobs"),
        Err(e) => tracing::error!(worker_id = %worker_id, "Failed to requeue orphaned jobs: {e}"),
    }

    loop {
        if cancel.is_cancelled() {
            tracing::info!("Worker shutting down");
            break;
        }

        match process_next_job(&ctx).await {
            Ok(true) => {
                // Processed a job; immediately check for the next one.
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Worker error: {e}");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(ctx.config.worker.poll_interval()) => {}
            _ = cancel.cancelled() => { break; }
        }
    }

    tracing::info!(worker_id = %worker_id, "Worker stopped");
}

/// Claim and run the next runnable job.
///
/// Returns `Ok(true)` if a job was run (whatever its outcome), `Ok(false)` if
/// nothing was runnable. `Err` only for queue failures; a failing job is
/// recorded on the queue and does not produce an error here.
pub async fn process_next_job(ctx: &PipelineContext) -> vf_core::Result<bool> {
    let Some(job) = ctx.queue.dequeue_next(&ctx.config.worker.worker_id)? else {
        return Ok(false);
    };

    let (job_id, video_id, kind) = (job.id, job.video_id, job.kind);
    let step = step_for(kind);
    tracing::info!(job_id = %job_id, video_id = %video_id, kind = %kind, "Running {}", step.name());
    ctx.events.broadcast(EventPayload::JobStarted {
        job_id,
        video_id,
        kind,
    });

    match step.execute(ctx, &job).await {
        Ok(()) => {
            record_outcome(ctx, job_id, "completed", || ctx.queue.complete(job_id)).await?;
            tracing::info!(job_id = %job_id, video_id = %video_id, kind = %kind, "Job completed");
            ctx.events.broadcast(EventPayload::JobCompleted {
                job_id,
                video_id,
                kind,
            });
        }
        Err(e) => {
            let error = e.to_string();
            tracing::error!(
                job_id = %job_id,
                video_id = %video_id,
                kind = %kind,
                error_kind = e.kind(),
                error = %error,
                "Job failed"
            );
            if let vf_core::Error::Probe { stdout, stderr, .. } = &e {
                tracing::debug!(job_id = %job_id, %stdout, %stderr, "Probe output");
            }

            let cancelled =
                record_outcome(ctx, job_id, "failed", || ctx.queue.fail(job_id, &error)).await?;
            ctx.events.broadcast(EventPayload::JobFailed {
                job_id,
                video_id,
                kind,
                error,
            });

            if cancelled > 0 {
                tracing::warn!(job_id = %job_id, count = cancelled, "Cancelled dependent jobs");
                ctx.events.broadcast(EventPayload::JobsCancelled {
                    failed_job_id: job_id,
                    count: cancelled,
                });
            }
        }
    }

    Ok(true)
}

/// Write a finished job's status, retrying after a poll interval on error.
///
/// If every attempt fails the job is put back to `queued` (it would otherwise
/// stay `processing` and block its dependents until a restart) and the last
/// error is returned.
async fn record_outcome<T>(
    ctx: &PipelineContext,
    job_id: vf_core::JobId,
    status: &str,
    mut write: impl FnMut() -> vf_core::Result<T>,
) -> vf_core::Result<T> {
    let mut attempt = 1;
    loop {
        match write() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < STATUS_WRITE_ATTEMPTS => {
                tracing::warn!(job_id = %job_id, attempt, "Failed to mark job {status}: {e}");
                tokio::time::sleep(ctx.config.worker.poll_interval()).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, "Giving up marking job {status}: {e}");
                match ctx.queue.reset_orphaned(&ctx.config.worker.worker_id) {
                    Ok(n) => tracing::warn!(job_id = %job_id, count = n, "Requeued claimed jobs"),
                    Err(e) => tracing::error!(job_id = %job_id, "Failed to requeue job: {e}"),
                }
                return Err(e);
            }
        }
    }
}

/// Run jobs until none is runnable. Returns how many were run.
pub async fn run_until_idle(ctx: &PipelineContext) -> vf_core::Result<usize> {
    let mut count = 0;
    while process_next_job(ctx).await? {
        count += 1;
    }
    Ok(count)
}
