//! Video records, resolution tiers, and the on-disk naming convention.
//!
//! Every artifact the pipeline writes lives under
//! `{media_root}/videos/{id}_{sanitized_title}/` and is prefixed with the
//! video id, so jobs for different videos never touch the same directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ids::VideoId;

/// Bandwidth advertised for a tier that has no configured bitrate (bits/s).
pub const DEFAULT_BANDWIDTH: u64 = 1_000_000;

/// Directory under the media root that holds per-video output directories.
pub const VIDEOS_DIR: &str = "videos";

// ---------------------------------------------------------------------------
// ResolutionTier
// ---------------------------------------------------------------------------

/// One output resolution/bitrate combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTier {
    pub width: u32,
    pub height: u32,
    /// Target video bitrate. When absent the encoder falls back to CRF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
}

impl ResolutionTier {
    /// Create a tier with a target bitrate.
    pub const fn new(width: u32, height: u32, bitrate_kbps: u32) -> Self {
        Self {
            width,
            height,
            bitrate_kbps: Some(bitrate_kbps),
        }
    }

    /// The default ladder, smallest to largest: 360p, 480p, 720p, 1080p.
    pub fn default_ladder() -> Vec<Self> {
        vec![
            Self::new(640, 360, 1000),
            Self::new(854, 480, 1500),
            Self::new(1280, 720, 3000),
            Self::new(1920, 1080, 5000),
        ]
    }

    /// Short label such as `720p`.
    pub fn label(&self) -> String {
        format!("{}p", self.height)
    }

    /// Advertised bandwidth in bits per second.
    pub fn bandwidth(&self) -> u64 {
        self.bitrate_kbps
            .map(|kbps| u64::from(kbps) * 1000)
            .unwrap_or(DEFAULT_BANDWIDTH)
    }
}

// ---------------------------------------------------------------------------
// Naming convention
// ---------------------------------------------------------------------------

/// Sanitize a title for use in a directory name: trim, then replace spaces
/// and path separators with underscores.
pub fn sanitize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Output directory for a video: `{media_root}/videos/{id}_{sanitized_title}`.
pub fn output_dir(media_root: &Path, id: VideoId, title: &str) -> PathBuf {
    media_root
        .join(VIDEOS_DIR)
        .join(format!("{id}_{}", sanitize_title(title)))
}

/// Media playlist filename for one tier, e.g. `7_720p.m3u8`.
pub fn media_playlist_name(id: VideoId, tier: &ResolutionTier) -> String {
    format!("{id}_{}p.m3u8", tier.height)
}

/// ffmpeg segment filename pattern for one tier, e.g. `7_720p_%03d.ts`.
pub fn segment_pattern(id: VideoId, tier: &ResolutionTier) -> String {
    format!("{id}_{}p_%03d.ts", tier.height)
}

/// Master playlist filename, e.g. `7_master.m3u8`.
pub fn master_playlist_name(id: VideoId) -> String {
    format!("{id}_master.m3u8")
}

// ---------------------------------------------------------------------------
// VideoAsset
// ---------------------------------------------------------------------------

/// The subset of a video record the pipeline works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub id: VideoId,
    pub title: String,
    /// The uploaded file. `None` once it has been deleted.
    pub source_path: Option<PathBuf>,
    pub thumbnail_path: Option<PathBuf>,
    /// Set once by the probe step.
    pub duration_secs: Option<f64>,
    /// Set when every tier and the master playlist have been written.
    pub transcoded: bool,
    pub created_at: String,
}

impl VideoAsset {
    /// This video's output directory under `media_root`.
    pub fn output_dir(&self, media_root: &Path) -> PathBuf {
        output_dir(media_root, self.id, &self.title)
    }

    /// Full path of this video's master playlist under `media_root`.
    pub fn master_playlist_path(&self, media_root: &Path) -> PathBuf {
        self.output_dir(media_root)
            .join(master_playlist_name(self.id))
    }
}
