//! The [`Step`] trait: what a worker runs for one dequeued job.

use async_trait::async_trait;
use vf_core::Job;

use crate::context::PipelineContext;

/// A single kind of background work.
///
/// The worker picks the implementation for a job's kind with
/// [`step_for`](crate::steps::step_for), runs it, and records the outcome on
/// the queue. An error fails the job and cancels its dependents.
#[async_trait]
pub trait Step: Send + Sync {
    /// A short, human-readable name (e.g. "Probe").
    fn name(&self) -> &'static str;

    /// Perform the work for `job`.
    async fn execute(&self, ctx: &PipelineContext, job: &Job) -> vf_core::Result<()>;
}
