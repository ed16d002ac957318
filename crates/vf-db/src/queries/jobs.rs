//! Job queue operations.
//!
//! Jobs are handed out strictly in insertion order (`rowid`). A job with a
//! `depends_on` edge stays invisible to [`dequeue_next`] until its dependency
//! is `completed`; [`fail_job`] cancels everything queued behind a failure.

use chrono::Utc;
use rusqlite::Connection;
use vf_core::{Error, Job, JobId, JobStatus, NewJob, Result, VideoId};

use crate::models::{job_from_row, JOB_COLS};

/// Create a new job.
///
/// A job whose dependency has already failed or been cancelled is stored as
/// `cancelled` straight away. The dependency lookup and the insert are one
/// statement, so a concurrent [`fail_job`] either sees the new row and cancels
/// it, or has already committed and the row is inserted cancelled.
pub fn create_job(conn: &Connection, new: &NewJob) -> Result<Job> {
    let id = JobId::new();
    let now = Utc::now().to_rfc3339();

    let payload = new
        .payload
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to encode job payload: {e}")))?;

    let inserted = conn.query_row(
        "INSERT INTO jobs (id, video_id, kind, status, depends_on, payload, created_at)
         SELECT ?1, ?2, ?3,
                CASE WHEN p.status IN ('failed', 'cancelled') THEN 'cancelled'
                     ELSE 'queued' END,
                ?4, ?5, ?6
         FROM (SELECT 1) AS one
         LEFT JOIN jobs p ON p.id = ?4
         WHERE ?4 IS NULL OR p.id IS NOT NULL
         RETURNING status",
        rusqlite::params![
            id.to_string(),
            new.video_id.get(),
            new.kind.as_str(),
            new.depends_on.map(|d| d.to_string()),
            payload,
            &now,
        ],
        |row| row.get::<_, String>(0),
    );

    let status: JobStatus = match inserted {
        Ok(s) => s.parse()?,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let dep = new
                .depends_on
                .ok_or_else(|| Error::Internal("job insert produced no row".into()))?;
            return Err(Error::not_found("job", dep));
        }
        Err(e) => return Err(Error::database(e.to_string())),
    };

    Ok(Job {
        id,
        video_id: new.video_id,
        kind: new.kind,
        status,
        depends_on: new.depends_on,
        payload: new.payload.clone(),
        error: None,
        locked_by: None,
        created_at: now,
        started_at: None,
        completed_at: None,
    })
}

/// Get a job by ID.
pub fn get_job(conn: &Connection, id: JobId) -> Result<Option<Job>> {
    let q = format!("SELECT {JOB_COLS} FROM jobs WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], job_from_row) {
        Ok(j) => Ok(Some(j)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List jobs, most recently queued first, optionally filtered by status.
pub fn list_jobs(conn: &Connection, status: Option<JobStatus>, limit: u32) -> Result<Vec<Job>> {
    let q = format!(
        "SELECT {JOB_COLS} FROM jobs
         WHERE ?1 IS NULL OR status = ?1
         ORDER BY rowid DESC LIMIT ?2"
    );
    let mut stmt = conn
        .prepare(&q)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map(
            rusqlite::params![status.map(|s| s.as_str()), limit],
            job_from_row,
        )
        .map_err(|e| Error::database(e.to_string()))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// All jobs for one video, in queue order.
pub fn jobs_for_video(conn: &Connection, video_id: VideoId) -> Result<Vec<Job>> {
    let q = format!("SELECT {JOB_COLS} FROM jobs WHERE video_id = ?1 ORDER BY rowid");
    let mut stmt = conn
        .prepare(&q)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([video_id.get()], job_from_row)
        .map_err(|e| Error::database(e.to_string()))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Atomically claim the oldest runnable job (status=queued, dependency
/// completed or absent).
pub fn dequeue_next(conn: &Connection, worker_id: &str) -> Result<Option<Job>> {
    let now = Utc::now().to_rfc3339();
    let q = format!(
        "UPDATE jobs SET status = 'processing', locked_by = ?1, started_at = ?2
         WHERE id = (
             SELECT j.id FROM jobs j
             LEFT JOIN jobs d ON d.id = j.depends_on
             WHERE j.status = 'queued'
               AND (j.depends_on IS NULL OR d.status = 'completed')
             ORDER BY j.rowid
             LIMIT 1
         ) AND status = 'queued'
         RETURNING {JOB_COLS}"
    );
    match conn.query_row(&q, rusqlite::params![worker_id, &now], job_from_row) {
        Ok(j) => Ok(Some(j)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Mark a job completed. Returns `false` if it does not exist.
pub fn complete_job(conn: &Connection, id: JobId) -> Result<bool> {
    let now = Utc::now().to_rfc3339();
    let n = conn
        .execute(
            "UPDATE jobs SET status = 'completed', completed_at = ?1, error = NULL
             WHERE id = ?2",
            rusqlite::params![&now, id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Mark a job failed and cancel every queued job depending on it, directly or
/// transitively.
///
/// Returns the number of cancelled dependents, or `None` if the job does not
/// exist.
pub fn fail_job(conn: &Connection, id: JobId, error: &str) -> Result<Option<usize>> {
    let now = Utc::now().to_rfc3339();
    let id = id.to_string();

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    let n = tx
        .execute(
            "UPDATE jobs SET status = 'failed', error = ?1, completed_at = ?2 WHERE id = ?3",
            rusqlite::params![error, &now, &id],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if n == 0 {
        return Ok(None);
    }

    let reason = format!("dependency {id} failed");
    let cancelled = tx
        .execute(
            "WITH RECURSIVE dependents(id) AS (
                 SELECT id FROM jobs WHERE depends_on = ?1
                 UNION
                 SELECT j.id FROM jobs j JOIN dependents d ON j.depends_on = d.id
             )
             UPDATE jobs SET status = 'cancelled', error = ?2, completed_at = ?3
             WHERE id IN (SELECT id FROM dependents) AND status = 'queued'",
            rusqlite::params![&id, &reason, &now],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    tx.commit()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(Some(cancelled))
}

/// Put jobs left `processing` by `worker_id` back in the queue.
///
/// Called when a worker starts, so work claimed before a crash is retried.
pub fn reset_orphaned_jobs(conn: &Connection, worker_id: &str) -> Result<usize> {
    conn.execute(
        "UPDATE jobs SET status = 'queued', locked_by = NULL, started_at = NULL
         WHERE status = 'processing' AND locked_by = ?1",
        [worker_id],
    )
    .map_err(|e| Error::database(e.to_string()))
}
