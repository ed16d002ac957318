//! Background job model.
//!
//! A [`Job`] is one unit of queued work for one video. Jobs may declare a
//! single dependency; the queue never hands out a job whose dependency has
//! not completed, and cancels it if the dependency fails.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ids::{JobId, VideoId};
use crate::video::VideoAsset;
use crate::Error;

/// What a job does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Probe,
    Transcode,
    Cleanup,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Transcode => "transcode",
            Self::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "probe" => Ok(Self::Probe),
            "transcode" => Ok(Self::Transcode),
            "cleanup" => Ok(Self::Cleanup),
            other => Err(Error::Validation(format!("unknown job kind: {other}"))),
        }
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    /// Never executed because a dependency failed or was cancelled.
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the job has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::Validation(format!("unknown job status: {other}"))),
        }
    }
}

/// Paths a cleanup job removes, captured when the record is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupTarget {
    pub source_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub thumbnail_path: Option<PathBuf>,
}

impl CleanupTarget {
    /// Snapshot the paths owned by `asset` under `media_root`.
    pub fn for_asset(asset: &VideoAsset, media_root: &std::path::Path) -> Self {
        Self {
            source_path: asset.source_path.clone(),
            output_dir: asset.output_dir(media_root),
            thumbnail_path: asset.thumbnail_path.clone(),
        }
    }
}

/// A job submission.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub video_id: VideoId,
    pub kind: JobKind,
    pub depends_on: Option<JobId>,
    pub payload: Option<CleanupTarget>,
}

impl NewJob {
    pub fn probe(video_id: VideoId) -> Self {
        Self {
            video_id,
            kind: JobKind::Probe,
            depends_on: None,
            payload: None,
        }
    }

    pub fn transcode(video_id: VideoId, after: JobId) -> Self {
        Self {
            video_id,
            kind: JobKind::Transcode,
            depends_on: Some(after),
            payload: None,
        }
    }

    pub fn cleanup(video_id: VideoId, target: CleanupTarget) -> Self {
        Self {
            video_id,
            kind: JobKind::Cleanup,
            depends_on: None,
            payload: Some(target),
        }
    }
}

/// A queued, running, or finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub video_id: VideoId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub depends_on: Option<JobId>,
    pub payload: Option<CleanupTarget>,
    pub error: Option<String>,
    pub locked_by: Option<String>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}
