//! Single-tier HLS encoding with ffmpeg.
//!
//! Each tier is one ffmpeg run that scales the first video stream, encodes
//! H.264/AAC with a fixed GOP so segment boundaries line up across tiers, and
//! muxes straight to an HLS VOD playlist. Produces, inside `output_dir`:
//! - `{id}_{height}p.m3u8`: media playlist
//! - `{id}_{height}p_000.ts`, `{id}_{height}p_001.ts`, ...: MPEG-TS segments

use std::path::{Path, PathBuf};

use vf_core::config::TranscodeConfig;
use vf_core::video::{media_playlist_name, segment_pattern};
use vf_core::{ResolutionTier, VideoId};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Build the ffmpeg invocation for one tier.
pub fn tier_command(
    ffmpeg: PathBuf,
    source: &Path,
    output_dir: &Path,
    video_id: VideoId,
    tier: &ResolutionTier,
    config: &TranscodeConfig,
) -> ToolCommand {
    let segments = output_dir.join(segment_pattern(video_id, tier));
    let playlist = output_dir.join(media_playlist_name(video_id, tier));
    let gop = config.keyframe_interval.to_string();

    let mut cmd = ToolCommand::new(ffmpeg);
    cmd.timeout(config.tier_timeout());
    cmd.args(["-y", "-hide_banner", "-nostdin", "-i"]);
    cmd.arg(source.to_string_lossy().as_ref());

    // First video stream, first audio stream if there is one.
    cmd.args(["-map", "0:v:0", "-map", "0:a:0?"]);
    cmd.args(["-vf", &format!("scale={}:{}", tier.width, tier.height)]);

    cmd.args(["-c:v", "libx264", "-preset", &config.video_preset]);
    match tier.bitrate_kbps {
        Some(kbps) => cmd.args(["-b:v", &format!("{kbps}k")]),
        None => cmd.args(["-crf", &config.crf.to_string()]),
    };

    // Fixed GOP, no scene-cut keyframes: every tier cuts segments at the
    // same timestamps.
    cmd.args(["-g", &gop, "-keyint_min", &gop, "-sc_threshold", "0"]);

    cmd.args([
        "-c:a",
        "aac",
        "-b:a",
        &format!("{}k", config.audio_bitrate_kbps),
        "-ar",
        &config.audio_sample_rate.to_string(),
    ]);

    cmd.args(["-f", "hls"]);
    cmd.args(["-hls_time", &config.segment_seconds.to_string()]);
    cmd.args(["-hls_playlist_type", "vod"]);
    cmd.args(["-hls_segment_filename", &segments.to_string_lossy()]);
    cmd.arg(playlist.to_string_lossy().as_ref());
    cmd
}

/// Encode one tier and return the path of its media playlist.
///
/// `output_dir` must already exist.
///
/// # Errors
///
/// Returns [`vf_core::Error::Transcode`] labelled with the tier when ffmpeg is
/// missing, fails to start, times out, or exits non-zero.
pub async fn transcode_tier(
    tools: &ToolRegistry,
    source: &Path,
    output_dir: &Path,
    video_id: VideoId,
    tier: &ResolutionTier,
    config: &TranscodeConfig,
) -> vf_core::Result<PathBuf> {
    let label = tier.label();
    let ffmpeg = tools
        .require("ffmpeg")
        .map_err(|e| vf_core::Error::transcode(&label, e.to_string()))?;

    tracing::info!(
        video_id = %video_id,
        tier = %label,
        "Encoding {}x{} ({}) -> {:?}",
        tier.width,
        tier.height,
        tier.bitrate_kbps
            .map(|k| format!("{k}k"))
            .unwrap_or_else(|| format!("crf {}", config.crf)),
        output_dir,
    );

    tier_command(ffmpeg.path.clone(), source, output_dir, video_id, tier, config)
        .execute()
        .await
        .map_err(|e| vf_core::Error::transcode(&label, e.to_string()))?;

    Ok(output_dir.join(media_playlist_name(video_id, tier)))
}
