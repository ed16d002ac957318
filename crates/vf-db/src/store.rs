//! SQLite-backed implementations of the pipeline's store and queue seams.

use std::path::Path;

use vf_core::{Error, Job, JobId, JobQueue, NewJob, Result, VideoAsset, VideoId, VideoStore};

use crate::pool::{get_conn, DbPool};
use crate::queries::{jobs, videos};

/// [`VideoStore`] over the `videos` table.
#[derive(Clone)]
pub struct SqliteVideoStore {
    pool: DbPool,
}

impl SqliteVideoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl VideoStore for SqliteVideoStore {
    fn get_video(&self, id: VideoId) -> Result<Option<VideoAsset>> {
        let conn = get_conn(&self.pool)?;
        videos::get_video(&conn, id)
    }

    fn update_duration(&self, id: VideoId, seconds: f64) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        if !videos::update_duration(&conn, id, seconds)? {
            return Err(Error::not_found("video", id));
        }
        Ok(())
    }

    fn delete_source_file(&self, id: VideoId, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(video_id = %id, path = %path.display(), "Deleted source file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(video_id = %id, path = %path.display(), "Source file already gone");
            }
            Err(e) => return Err(e.into()),
        }

        let conn = get_conn(&self.pool)?;
        if !videos::clear_source_path(&conn, id)? {
            return Err(Error::not_found("video", id));
        }
        Ok(())
    }

    fn mark_transcoded(&self, id: VideoId) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        if !videos::mark_transcoded(&conn, id)? {
            return Err(Error::not_found("video", id));
        }
        Ok(())
    }
}

/// [`JobQueue`] over the `jobs` table.
#[derive(Clone)]
pub struct SqliteJobQueue {
    pool: DbPool,
}

impl SqliteJobQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl JobQueue for SqliteJobQueue {
    fn enqueue(&self, job: NewJob) -> Result<JobId> {
        let conn = get_conn(&self.pool)?;
        Ok(jobs::create_job(&conn, &job)?.id)
    }

    fn dequeue_next(&self, worker: &str) -> Result<Option<Job>> {
        let conn = get_conn(&self.pool)?;
        jobs::dequeue_next(&conn, worker)
    }

    fn complete(&self, id: JobId) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        if !jobs::complete_job(&conn, id)? {
            return Err(Error::not_found("job", id));
        }
        Ok(())
    }

    fn fail(&self, id: JobId, error: &str) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        jobs::fail_job(&conn, id, error)?.ok_or_else(|| Error::not_found("job", id))
    }

    fn get(&self, id: JobId) -> Result<Option<Job>> {
        let conn = get_conn(&self.pool)?;
        jobs::get_job(&conn, id)
    }

    fn reset_orphaned(&self, worker: &str) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        jobs::reset_orphaned_jobs(&conn, worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use vf_core::JobStatus;

    #[test]
    fn delete_source_file_removes_and_clears() {
        let pool = init_memory_pool().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("clip.mov");
        std::fs::write(&src, b"data").unwrap();

        let video = {
            let conn = pool.get().unwrap();
            videos::create_video(&conn, "clip", Some(src.as_path()), None).unwrap()
        };

        let store = SqliteVideoStore::new(pool);
        store.delete_source_file(video.id, &src).unwrap();
        assert!(!src.exists());
        assert!(store.get_video(video.id).unwrap().unwrap().source_path.is_none());

        // Already gone: still fine.
        store.delete_source_file(video.id, &src).unwrap();
    }

    #[test]
    fn update_duration_on_missing_video() {
        let store = SqliteVideoStore::new(init_memory_pool().unwrap());
        let err = store.update_duration(VideoId::new(5), 1.0).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn queue_roundtrip() {
        let queue = SqliteJobQueue::new(init_memory_pool().unwrap());
        let probe = queue.enqueue(NewJob::probe(VideoId::new(1))).unwrap();
        let transcode = queue
            .enqueue(NewJob::transcode(VideoId::new(1), probe))
            .unwrap();

        let job = queue.dequeue_next("w").unwrap().unwrap();
        assert_eq!(job.id, probe);
        assert_eq!(queue.fail(probe, "nope").unwrap(), 1);
        assert_eq!(
            queue.get(transcode).unwrap().unwrap().status,
            JobStatus::Cancelled
        );
        assert!(queue.dequeue_next("w").unwrap().is_none());
    }

    #[test]
    fn complete_unknown_job() {
        let queue = SqliteJobQueue::new(init_memory_pool().unwrap());
        assert!(queue.complete(JobId::new()).is_err());
    }
}
