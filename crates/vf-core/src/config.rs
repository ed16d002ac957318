//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for tools, probing, transcoding, and the worker. Every section
//! defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::video::ResolutionTier;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root under which `videos/{id}_{title}/` directories are created.
    pub media_root: PathBuf,
    /// SQLite file holding video records and the job queue.
    pub db_path: PathBuf,
    pub tools: ToolsConfig,
    pub probe: ProbeConfig,
    pub transcode: TranscodeConfig,
    pub worker: WorkerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("./media"),
            db_path: PathBuf::from("./vodforge.db"),
            tools: ToolsConfig::default(),
            probe: ProbeConfig::default(),
            transcode: TranscodeConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let tc = &self.transcode;

        if tc.tiers.is_empty() {
            warnings.push("transcode.tiers is empty; nothing will be encoded".into());
        }

        let mut seen = HashSet::new();
        for (i, tier) in tc.tiers.iter().enumerate() {
            if tier.width == 0 || tier.height == 0 {
                warnings.push(format!("transcode.tiers[{i}] has a zero dimension"));
            }
            if tier.width % 2 != 0 || tier.height % 2 != 0 {
                warnings.push(format!(
                    "transcode.tiers[{i}] ({}x{}) has an odd dimension; libx264 requires even sizes",
                    tier.width, tier.height
                ));
            }
            if tier.bitrate_kbps == Some(0) {
                warnings.push(format!("transcode.tiers[{i}].bitrate_kbps is 0"));
            }
            if !seen.insert(tier.height) {
                warnings.push(format!(
                    "transcode.tiers[{i}] repeats height {}; its files would overwrite an earlier tier",
                    tier.height
                ));
            }
        }

        for pair in tc.tiers.windows(2) {
            if pair[1].height < pair[0].height {
                warnings.push("transcode.tiers are not in ascending resolution order".into());
                break;
            }
        }

        if tc.segment_seconds == 0 {
            warnings.push("transcode.segment_seconds is 0".into());
        }
        if tc.keyframe_interval == 0 {
            warnings.push("transcode.keyframe_interval is 0".into());
        }
        if tc.tier_timeout_secs == 0 {
            warnings.push("transcode.tier_timeout_secs is 0; every encode will time out".into());
        }
        if self.probe.timeout_secs == 0 {
            warnings.push("probe.timeout_secs is 0; every probe will time out".into());
        }
        if self.worker.worker_id.trim().is_empty() {
            warnings.push("worker.worker_id is empty".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
}

/// Duration probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Encoder settings shared by all tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Output ladder in ascending resolution order.
    #[serde(default = "ResolutionTier::default_ladder")]
    pub tiers: Vec<ResolutionTier>,
    #[serde(default = "default_segment_seconds")]
    pub segment_seconds: u32,
    /// GOP length in frames; also used as the minimum keyframe interval.
    #[serde(default = "default_keyframe_interval")]
    pub keyframe_interval: u32,
    #[serde(default = "default_video_preset")]
    pub video_preset: String,
    /// Quality used for tiers that have no target bitrate.
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,
    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,
    #[serde(default = "default_tier_timeout")]
    pub tier_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub delete_source_on_success: bool,
}

fn default_segment_seconds() -> u32 {
    4
}
fn default_keyframe_interval() -> u32 {
    48
}
fn default_video_preset() -> String {
    "fast".into()
}
fn default_crf() -> u32 {
    23
}
fn default_audio_bitrate() -> u32 {
    128
}
fn default_audio_sample_rate() -> u32 {
    48_000
}
fn default_tier_timeout() -> u64 {
    360
}
fn default_true() -> bool {
    true
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            tiers: ResolutionTier::default_ladder(),
            segment_seconds: default_segment_seconds(),
            keyframe_interval: default_keyframe_interval(),
            video_preset: default_video_preset(),
            crf: default_crf(),
            audio_bitrate_kbps: default_audio_bitrate(),
            audio_sample_rate: default_audio_sample_rate(),
            tier_timeout_secs: default_tier_timeout(),
            delete_source_on_success: default_true(),
        }
    }
}

impl TranscodeConfig {
    pub fn tier_timeout(&self) -> Duration {
        Duration::from_secs(self.tier_timeout_secs)
    }
}

/// Queue consumer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Written to `locked_by` on claimed jobs.
    pub worker_id: String,
    pub poll_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: "vf-worker".into(),
            poll_interval_ms: 2000,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
