//! HLS master playlist generation.
//!
//! This module renders M3U8 master playlists listing one variant per
//! resolution tier, in tier order, and persists them with an atomic
//! replace so readers never observe a half-written manifest.

mod generator;
mod types;

pub use generator::{generate_master_playlist, write_master_playlist};
pub use types::{MasterPlaylist, Variant};
