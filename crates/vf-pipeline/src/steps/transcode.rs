//! Multi-resolution HLS transcode step.
//!
//! Tiers are encoded one at a time in configured order. The master playlist
//! is only written once every tier has succeeded; a failed tier leaves the
//! earlier tiers' output in place and no master.

use std::path::PathBuf;

use async_trait::async_trait;
use vf_core::events::EventPayload;
use vf_core::{Error, Job, VideoId};
use vf_media::{write_master_playlist, MasterPlaylist};

use crate::context::PipelineContext;
use crate::step::Step;

/// Label used on transcode errors that are not tied to one tier.
const ALL_TIERS: &str = "all";

/// Transcode a video to every configured tier and write its master playlist.
///
/// On success the source upload is deleted (if configured) and the video is
/// marked transcoded. Returns the master playlist path.
///
/// # Errors
///
/// [`Error::Transcode`] if the video has no probed duration, no source file,
/// or a tier fails to encode. [`Error::PlaylistWrite`] if the master cannot be
/// written.
pub async fn run_transcode(ctx: &PipelineContext, video_id: VideoId) -> vf_core::Result<PathBuf> {
    let asset = ctx
        .store
        .get_video(video_id)?
        .ok_or_else(|| Error::not_found("video", video_id))?;

    if asset.duration_secs.is_none() {
        return Err(Error::transcode(
            ALL_TIERS,
            format!("video {video_id} has no probed duration"),
        ));
    }

    let source = asset
        .source_path
        .clone()
        .ok_or_else(|| Error::transcode(ALL_TIERS, format!("video {video_id} has no source file")))?;

    let config = &ctx.config.transcode;
    if config.tiers.is_empty() {
        return Err(Error::Validation("no resolution tiers configured".into()));
    }

    let output_dir = asset.output_dir(&ctx.config.media_root);
    tokio::fs::create_dir_all(&output_dir).await?;

    let total = config.tiers.len();
    for (index, tier) in config.tiers.iter().enumerate() {
        vf_av::transcode_tier(&ctx.tools, &source, &output_dir, video_id, tier, config).await?;

        tracing::info!(
            video_id = %video_id,
            tier = %tier.label(),
            "Tier {}/{} done",
            index + 1,
            total
        );
        ctx.events.broadcast(EventPayload::TierTranscoded {
            video_id,
            height: tier.height,
            index,
            total,
        });
    }

    let master = asset.master_playlist_path(&ctx.config.media_root);
    write_master_playlist(&master, &MasterPlaylist::from_tiers(video_id, &config.tiers))?;

    if config.delete_source_on_success {
        ctx.store.delete_source_file(video_id, &source)?;
    }
    ctx.store.mark_transcoded(video_id)?;

    tracing::info!(video_id = %video_id, master = %master.display(), "Transcoding complete");
    ctx.events.broadcast(EventPayload::VideoTranscoded { video_id });

    Ok(master)
}

/// [`Step`] for transcode jobs.
#[derive(Debug)]
pub struct TranscodeStep;

#[async_trait]
impl Step for TranscodeStep {
    fn name(&self) -> &'static str {
        "Transcode"
    }

    async fn execute(&self, ctx: &PipelineContext, job: &Job) -> vf_core::Result<()> {
        run_transcode(ctx, job.video_id).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHarness;
    use std::path::Path;
    use vf_core::VideoStore;

    #[tokio::test]
    async fn refuses_without_duration() {
        let h = TestHarness::new();
        let video = h.add_video("My Clip", Some(Path::new("/uploads/clip.mov")));

        let err = run_transcode(&h.ctx, video.id).await.unwrap_err();
        assert!(matches!(err, Error::Transcode { ref tier, .. } if tier == "all"));
        // Nothing was created.
        assert!(!video.output_dir(&h.ctx.config.media_root).exists());
    }

    #[tokio::test]
    async fn refuses_without_source() {
        let h = TestHarness::new();
        let video = h.add_video("My Clip", None);
        h.ctx.store.update_duration(video.id, 3.0).unwrap();

        let err = run_transcode(&h.ctx, video.id).await.unwrap_err();
        assert!(matches!(err, Error::Transcode { .. }));
    }

    #[tokio::test]
    async fn missing_ffmpeg_fails_first_tier() {
        let h = TestHarness::new();
        let video = h.add_video("My Clip", Some(Path::new("/uploads/clip.mov")));
        h.ctx.store.update_duration(video.id, 3.0).unwrap();

        let err = run_transcode(&h.ctx, video.id).await.unwrap_err();
        assert!(matches!(err, Error::Transcode { ref tier, .. } if tier == "360p"));

        let dir = video.output_dir(&h.ctx.config.media_root);
        assert!(dir.is_dir());
        assert!(!video.master_playlist_path(&h.ctx.config.media_root).exists());
        assert!(!h.ctx.store.get_video(video.id).unwrap().unwrap().transcoded);
    }
}
