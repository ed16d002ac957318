//! vf-core: shared types, IDs, errors, configuration, and event system.
//!
//! This crate is the foundational dependency for all other vf-* crates,
//! providing type-safe identifiers, a unified error type, the video and job
//! domain types, the record-store and queue seams, application configuration,
//! and a broadcast event bus.

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod jobs;
pub mod store;
pub mod video;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
pub use jobs::{CleanupTarget, Job, JobKind, JobStatus, NewJob};
pub use store::{JobQueue, VideoStore};
pub use video::{ResolutionTier, VideoAsset};
