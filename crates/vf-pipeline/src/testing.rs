//! Shared fixtures for unit tests.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use vf_av::ToolRegistry;
use vf_core::config::Config;
use vf_core::VideoAsset;
use vf_db::pool::{init_memory_pool, DbPool};
use vf_db::{SqliteJobQueue, SqliteVideoStore};

use crate::context::PipelineContext;

/// An in-memory database, a temporary media root and no external tools.
pub struct TestHarness {
    pub ctx: PipelineContext,
    pub pool: DbPool,
    _media: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let media = tempfile::tempdir().unwrap();
        let pool = init_memory_pool().unwrap();

        let mut config = Config::default();
        config.media_root = media.path().to_path_buf();
        config.worker.poll_interval_ms = 10;

        let ctx = PipelineContext::new(
            config,
            ToolRegistry::empty(),
            Arc::new(SqliteVideoStore::new(pool.clone())),
            Arc::new(SqliteJobQueue::new(pool.clone())),
        );

        Self {
            ctx,
            pool,
            _media: media,
        }
    }

    pub fn add_video(&self, title: &str, source: Option<&Path>) -> VideoAsset {
        let conn = self.pool.get().unwrap();
        vf_db::queries::videos::create_video(&conn, title, source, None).unwrap()
    }
}
