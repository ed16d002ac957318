//! vodforge - background HLS transcoding for uploaded videos
//!
//! This library crate wires the workspace crates together for the binary and
//! for integration testing.

pub mod app;

pub use app::App;
