//! vf-media: HLS master playlist composition.
//!
//! The per-tier media playlists and segments are written by ffmpeg; this
//! crate renders the master manifest that ties them together and writes it
//! atomically next to them.
//!
//! # Modules
//!
//! - [`hls`] - HLS master playlist types, rendering, and atomic writing

pub mod hls;

// Re-export commonly used items at the crate root.
pub use hls::{generate_master_playlist, write_master_playlist, MasterPlaylist, Variant};
