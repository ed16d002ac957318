//! # vf-pipeline
//!
//! The background side of the video catalog: turning record lifecycle events
//! into queued jobs and executing them.
//!
//! - **[`orchestrator`]** -- `on_create` / `on_delete` hooks that enqueue a
//!   probe → transcode chain or a cleanup job without waiting for either.
//! - **[`Step`]** trait and the built-in [`steps`] -- probe, transcode,
//!   cleanup.
//! - **[`worker`]** -- the queue consumer loop.
//! - **[`PipelineContext`]** -- config, tools, store, queue and event bus
//!   shared by all of the above.

pub mod context;
pub mod orchestrator;
pub mod step;
pub mod steps;
pub mod worker;

#[cfg(test)]
mod testing;

pub use context::PipelineContext;
pub use orchestrator::{on_create, on_delete, ChainHandles};
pub use step::Step;
pub use steps::step_for;
pub use worker::{process_next_job, run_until_idle, run_worker};
