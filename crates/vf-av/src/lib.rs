//! # vf-av
//!
//! External tool management and invocation for the vodforge pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ffprobe, honoring configured overrides.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes without a shell.
//! - **Duration probing** ([`probe_duration`]) -- ffprobe invocation and
//!   parsing of the container duration.
//! - **Tier encoding** ([`transcode_tier`]) -- one ffmpeg invocation that
//!   produces an HLS media playlist and its segments for a single tier.

pub mod command;
pub mod probe;
pub mod tools;
pub mod transcode;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use probe::{parse_duration, probe_duration};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transcode::{tier_command, transcode_tier};
