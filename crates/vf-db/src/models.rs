//! Row mapping for the `videos` and `jobs` tables.
//!
//! The domain types live in `vf-core`; these helpers build them from a
//! `rusqlite::Row` selected with the matching column list.

use std::path::PathBuf;
use std::str::FromStr;

use rusqlite::types::Type;
use vf_core::{CleanupTarget, Job, JobId, VideoAsset, VideoId};
use uuid::Uuid;

/// Columns selected for [`video_from_row`], in order.
pub const VIDEO_COLS: &str =
    "id, title, source_path, thumbnail_path, duration_secs, transcoded, created_at";

/// Columns selected for [`job_from_row`], in order.
pub const JOB_COLS: &str = "id, video_id, kind, status, depends_on, payload, error, \
     locked_by, created_at, started_at, completed_at";

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn conversion_failure(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| conversion_failure(idx, e))?;
    Ok(T::from(uuid))
}

fn parse_opt_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<T>> {
    let s: Option<String> = row.get(idx)?;
    match s {
        Some(v) => {
            let uuid = Uuid::parse_str(&v).map_err(|e| conversion_failure(idx, e))?;
            Ok(Some(T::from(uuid)))
        }
        None => Ok(None),
    }
}

/// Parse a text column through `FromStr` (job kind and status).
fn parse_enum<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = vf_core::Error>,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| conversion_failure(idx, e))
}

fn opt_path(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<PathBuf>> {
    Ok(row.get::<_, Option<String>>(idx)?.map(PathBuf::from))
}

// ---------------------------------------------------------------------------
// VideoAsset
// ---------------------------------------------------------------------------

pub fn video_from_row(row: &rusqlite::Row) -> rusqlite::Result<VideoAsset> {
    Ok(VideoAsset {
        id: VideoId::new(row.get(0)?),
        title: row.get(1)?,
        source_path: opt_path(row, 2)?,
        thumbnail_path: opt_path(row, 3)?,
        duration_secs: row.get(4)?,
        transcoded: row.get(5)?,
        created_at: row.get(6)?,
    })
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

pub fn job_from_row(row: &rusqlite::Row) -> rusqlite::Result<Job> {
    let payload: Option<String> = row.get(5)?;
    let payload = payload
        .map(|json| serde_json::from_str::<CleanupTarget>(&json))
        .transpose()
        .map_err(|e| conversion_failure(5, e))?;

    Ok(Job {
        id: parse_id::<JobId>(row, 0)?,
        video_id: VideoId::new(row.get(1)?),
        kind: parse_enum(row, 2)?,
        status: parse_enum(row, 3)?,
        depends_on: parse_opt_id(row, 4)?,
        payload,
        error: row.get(6)?,
        locked_by: row.get(7)?,
        created_at: row.get(8)?,
        started_at: row.get(9)?,
        completed_at: row.get(10)?,
    })
}
