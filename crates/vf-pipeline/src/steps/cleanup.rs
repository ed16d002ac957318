//! Cleanup step: remove everything a deleted video left on disk.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use vf_core::events::EventPayload;
use vf_core::{CleanupTarget, Error, Job};

use crate::context::PipelineContext;
use crate::step::Step;

fn remove(path: &Path, dir: bool) -> io::Result<bool> {
    let result = if dir {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove the source upload, the output directory tree and the thumbnail.
///
/// Paths that do not exist are skipped, so running this twice is fine. A
/// failure on one path does not stop the others; the first failure is
/// returned after all paths have been attempted.
pub fn remove_targets(target: &CleanupTarget) -> vf_core::Result<()> {
    let paths = [
        (target.source_path.as_deref(), false),
        (Some(target.output_dir.as_path()), true),
        (target.thumbnail_path.as_deref(), false),
    ];

    let mut first_error = None;
    for (path, dir) in paths {
        let Some(path) = path else { continue };
        match remove(path, dir) {
            Ok(true) => tracing::debug!(path = %path.display(), "Removed"),
            Ok(false) => {}
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "Cleanup failed");
                if first_error.is_none() {
                    first_error = Some(Error::Cleanup {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// [`Step`] for cleanup jobs. The paths come from the job payload because the
/// video record is already gone.
#[derive(Debug)]
pub struct CleanupStep;

#[async_trait]
impl Step for CleanupStep {
    fn name(&self) -> &'static str {
        "Cleanup"
    }

    async fn execute(&self, ctx: &PipelineContext, job: &Job) -> vf_core::Result<()> {
        let target = job
            .payload
            .as_ref()
            .ok_or_else(|| Error::Validation(format!("cleanup job {} has no payload", job.id)))?;

        remove_targets(target)?;

        tracing::info!(video_id = %job.video_id, "Cleaned up video files");
        ctx.events.broadcast(EventPayload::VideoCleanedUp {
            video_id: job.video_id,
        });
        Ok(())
    }
}
