//! Video record operations.

use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;
use vf_core::{Error, Result, VideoAsset, VideoId};

use crate::models::{video_from_row, VIDEO_COLS};

fn path_text(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.to_string_lossy().into_owned())
}

/// Create a video record. The id is assigned by SQLite.
pub fn create_video(
    conn: &Connection,
    title: &str,
    source_path: Option<&Path>,
    thumbnail_path: Option<&Path>,
) -> Result<VideoAsset> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO videos (title, source_path, thumbnail_path, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![title, path_text(source_path), path_text(thumbnail_path), &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(VideoAsset {
        id: VideoId::new(conn.last_insert_rowid()),
        title: title.to_string(),
        source_path: source_path.map(Path::to_path_buf),
        thumbnail_path: thumbnail_path.map(Path::to_path_buf),
        duration_secs: None,
        transcoded: false,
        created_at: now,
    })
}

/// Get a video by ID.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Option<VideoAsset>> {
    let q = format!("SELECT {VIDEO_COLS} FROM videos WHERE id = ?1");
    match conn.query_row(&q, [id.get()], video_from_row) {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List videos, newest first.
pub fn list_videos(conn: &Connection, limit: u32) -> Result<Vec<VideoAsset>> {
    let q = format!("SELECT {VIDEO_COLS} FROM videos ORDER BY id DESC LIMIT ?1");
    let mut stmt = conn
        .prepare(&q)
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([limit], video_from_row)
        .map_err(|e| Error::database(e.to_string()))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Store the probed duration. Returns `false` if the video does not exist.
pub fn update_duration(conn: &Connection, id: VideoId, seconds: f64) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE videos SET duration_secs = ?1 WHERE id = ?2",
            rusqlite::params![seconds, id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Forget the source upload after it has been deleted.
pub fn clear_source_path(conn: &Connection, id: VideoId) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE videos SET source_path = NULL WHERE id = ?1",
            [id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

pub fn mark_transcoded(conn: &Connection, id: VideoId) -> Result<bool> {
    let n = conn
        .execute("UPDATE videos SET transcoded = 1 WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Delete a video record. Files on disk are left to the cleanup job.
pub fn delete_video(conn: &Connection, id: VideoId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM videos WHERE id = ?1", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
