//! Unified error type for the vodforge pipeline.
//!
//! All crates funnel their failures into [`Error`]. The pipeline-specific
//! variants ([`Error::Probe`], [`Error::Transcode`], [`Error::PlaylistWrite`],
//! [`Error::Cleanup`]) carry enough context to diagnose a failed job from
//! its log line alone.

use std::fmt;
use std::path::PathBuf;

/// Unified error type covering all failure modes in vodforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "job").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input data or configuration failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffmpeg, ffprobe) could not be run or returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Duration probing failed: the probe exited non-zero, timed out, or
    /// printed something that is not a usable duration.
    #[error("Probe error: {message}")]
    Probe {
        /// Human-readable error description.
        message: String,
        /// Raw standard output of the probe process.
        stdout: String,
        /// Raw standard error of the probe process.
        stderr: String,
    },

    /// An encoder invocation for one resolution tier failed.
    #[error("Transcode error [{tier}]: {message}")]
    Transcode {
        /// The tier label (e.g. "720p"), or "all" for pre-flight checks.
        tier: String,
        /// Human-readable error description.
        message: String,
    },

    /// Writing the master playlist failed.
    #[error("Playlist write error [{}]: {source}", path.display())]
    PlaylistWrite {
        /// Destination path of the playlist.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Removing a file or directory during cleanup failed for a reason other
    /// than the path being absent.
    #[error("Cleanup error [{}]: {source}", path.display())]
    Cleanup {
        /// The path that could not be removed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// A stable short name for this error's variant, used in job records and
    /// structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation",
            Error::Database { .. } => "database",
            Error::Io { .. } => "io",
            Error::Tool { .. } => "tool",
            Error::Probe { .. } => "probe",
            Error::Transcode { .. } => "transcode",
            Error::PlaylistWrite { .. } => "playlist_write",
            Error::Cleanup { .. } => "cleanup",
            Error::Internal(_) => "internal",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Probe`] without captured output.
    pub fn probe(message: impl Into<String>) -> Self {
        Error::Probe {
            message: message.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Convenience constructor for [`Error::Transcode`].
    pub fn transcode(tier: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Transcode {
            tier: tier.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("video", 42);
        assert_eq!(err.to_string(), "video not found: 42");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("title is empty".into());
        assert_eq!(err.to_string(), "Validation error: title is empty");
    }

    #[test]
    fn database_display() {
        let err = Error::database("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.kind(), "database");
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffmpeg", "exit code 1");
        assert_eq!(err.to_string(), "Tool error [ffmpeg]: exit code 1");
    }

    #[test]
    fn probe_keeps_raw_output() {
        let err = Error::Probe {
            message: "unparseable duration".into(),
            stdout: "N/A\n".into(),
            stderr: "".into(),
        };
        assert_eq!(err.to_string(), "Probe error: unparseable duration");
        match err {
            Error::Probe { stdout, .. } => assert_eq!(stdout, "N/A\n"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transcode_display() {
        let err = Error::transcode("720p", "ffmpeg exited with status 1");
        assert_eq!(
            err.to_string(),
            "Transcode error [720p]: ffmpeg exited with status 1"
        );
        assert_eq!(err.kind(), "transcode");
    }

    #[test]
    fn playlist_write_display() {
        let err = Error::PlaylistWrite {
            path: PathBuf::from("/media/videos/7_x/7_master.m3u8"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("7_master.m3u8"));
        assert_eq!(err.kind(), "playlist_write");
    }

    #[test]
    fn cleanup_display() {
        let err = Error::Cleanup {
            path: PathBuf::from("/media/thumbs/7.jpg"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("Cleanup error [/media/thumbs/7.jpg]"));
    }
}
