//! Seams to the record store and the job queue.
//!
//! The pipeline only talks to these traits. `vf-db` provides SQLite-backed
//! implementations; tests may provide their own.

use std::path::Path;

use crate::ids::{JobId, VideoId};
use crate::jobs::{Job, NewJob};
use crate::video::VideoAsset;
use crate::Result;

/// Read/write access to video records.
pub trait VideoStore: Send + Sync {
    /// Look up a video. `Ok(None)` if it does not exist.
    fn get_video(&self, id: VideoId) -> Result<Option<VideoAsset>>;

    /// Store the probed duration.
    fn update_duration(&self, id: VideoId, seconds: f64) -> Result<()>;

    /// Delete the uploaded source file and clear the record's reference to it.
    /// A file that is already gone is not an error.
    fn delete_source_file(&self, id: VideoId, path: &Path) -> Result<()>;

    /// Flag the video as fully transcoded.
    fn mark_transcoded(&self, id: VideoId) -> Result<()>;
}

/// A FIFO job queue with single-edge dependencies.
pub trait JobQueue: Send + Sync {
    /// Submit a job and return its handle immediately.
    fn enqueue(&self, job: NewJob) -> Result<JobId>;

    /// Claim the oldest queued job whose dependency (if any) has completed.
    fn dequeue_next(&self, worker: &str) -> Result<Option<Job>>;

    /// Mark a job completed.
    fn complete(&self, id: JobId) -> Result<()>;

    /// Mark a job failed and cancel every queued job that depends on it,
    /// directly or transitively. Returns the number of cancelled jobs.
    fn fail(&self, id: JobId, error: &str) -> Result<usize>;

    /// Look up a job.
    fn get(&self, id: JobId) -> Result<Option<Job>>;

    /// Requeue jobs a previous run of `worker` left processing. Returns the
    /// number of jobs requeued.
    fn reset_orphaned(&self, worker: &str) -> Result<usize>;
}
