use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vodforge")]
#[command(author, version, about = "Background HLS transcoding pipeline for uploaded videos")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the job worker until interrupted
    Worker,

    /// Run queued jobs until none is runnable, then exit
    Drain,

    /// Register an uploaded video and queue its processing
    Add {
        /// Uploaded source file
        #[arg(required = true)]
        source: PathBuf,

        /// Video title (defaults to the file stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Thumbnail image belonging to the video
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },

    /// Delete a video record and queue removal of its files
    Remove {
        /// Video ID
        id: i64,
    },

    /// Probe a video's duration now, bypassing the queue
    Probe {
        /// Video ID
        id: i64,

        /// Probe again even if a duration is already stored
        #[arg(long)]
        force: bool,
    },

    /// List jobs in the queue
    Jobs {
        /// Only show jobs with this status
        #[arg(long)]
        status: Option<String>,

        /// Maximum number of jobs to show
        #[arg(long, default_value = "50")]
        limit: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
