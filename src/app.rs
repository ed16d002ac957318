//! Wiring: database, tools and pipeline context in one place.
//!
//! [`App`] is what the binary and the integration tests build on. Its record
//! operations fire the pipeline hooks the same way the catalog backend does:
//! creating a video queues probe → transcode, deleting one queues cleanup.

use std::path::Path;
use std::sync::Arc;

use vf_av::ToolRegistry;
use vf_core::config::Config;
use vf_core::{Error, JobId, Result, VideoAsset, VideoId};
use vf_db::pool::{get_conn, init_memory_pool, init_pool, DbPool};
use vf_db::queries::videos;
use vf_db::{SqliteJobQueue, SqliteVideoStore};
use vf_pipeline::{on_create, on_delete, ChainHandles, PipelineContext};

/// A pipeline context backed by a SQLite pool.
pub struct App {
    pub ctx: PipelineContext,
    pub db: DbPool,
}

impl App {
    /// Open the database at `config.db_path` and discover tools on `PATH`.
    pub fn open(config: Config) -> Result<Self> {
        let db_path = config.db_path.to_string_lossy().into_owned();
        tracing::info!("Opening database at {db_path}");
        let db = init_pool(&db_path)?;
        let tools = ToolRegistry::discover(&config.tools);
        Ok(Self::with_pool(config, tools, db))
    }

    /// In-memory database with an explicit tool registry.
    pub fn in_memory(config: Config, tools: ToolRegistry) -> Result<Self> {
        let db = init_memory_pool()?;
        Ok(Self::with_pool(config, tools, db))
    }

    fn with_pool(config: Config, tools: ToolRegistry, db: DbPool) -> Self {
        let ctx = PipelineContext::new(
            config,
            tools,
            Arc::new(SqliteVideoStore::new(db.clone())),
            Arc::new(SqliteJobQueue::new(db.clone())),
        );
        Self { ctx, db }
    }

    /// Create a video record and queue its processing.
    ///
    /// The record is created even if queueing fails; the handles are `None`
    /// in that case.
    pub fn add_video(
        &self,
        title: &str,
        source: &Path,
        thumbnail: Option<&Path>,
    ) -> Result<(VideoAsset, Option<ChainHandles>)> {
        let conn = get_conn(&self.db)?;
        let video = videos::create_video(&conn, title, Some(source), thumbnail)?;
        drop(conn);

        tracing::info!(video_id = %video.id, title = %video.title, "Video created");
        let handles = on_create(&self.ctx, &video);
        Ok((video, handles))
    }

    /// Delete a video record and queue removal of its files.
    pub fn remove_video(&self, id: VideoId) -> Result<(VideoAsset, Option<JobId>)> {
        let conn = get_conn(&self.db)?;
        let video = videos::get_video(&conn, id)?.ok_or_else(|| Error::not_found("video", id))?;
        videos::delete_video(&conn, id)?;
        drop(conn);

        tracing::info!(video_id = %id, "Video deleted");
        let job = on_delete(&self.ctx, &video);
        Ok((video, job))
    }

    pub fn get_video(&self, id: VideoId) -> Result<Option<VideoAsset>> {
        let conn = get_conn(&self.db)?;
        videos::get_video(&conn, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vf_core::{JobKind, JobQueue};

    fn app() -> App {
        App::in_memory(Config::default(), ToolRegistry::empty()).unwrap()
    }

    #[test]
    fn add_queues_chain() {
        let app = app();
        let (video, handles) = app
            .add_video("My Clip", Path::new("/uploads/clip.mov"), None)
            .unwrap();
        let handles = handles.unwrap();

        let transcode = app.ctx.queue.get(handles.transcode).unwrap().unwrap();
        assert_eq!(transcode.video_id, video.id);
        assert_eq!(transcode.kind, JobKind::Transcode);
    }

    #[test]
    fn remove_queues_cleanup() {
        let app = app();
        let (video, _) = app
            .add_video("My Clip", Path::new("/uploads/clip.mov"), None)
            .unwrap();

        let (removed, job) = app.remove_video(video.id).unwrap();
        assert_eq!(removed.id, video.id);
        assert!(app.get_video(video.id).unwrap().is_none());

        let job = app.ctx.queue.get(job.unwrap()).unwrap().unwrap();
        assert_eq!(job.kind, JobKind::Cleanup);
    }

    #[test]
    fn remove_missing_video() {
        let err = app().remove_video(VideoId::new(42)).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
