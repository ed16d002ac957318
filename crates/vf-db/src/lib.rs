//! vf-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed row mapping, query modules for video records
//! and the job queue, and implementations of the [`vf_core::VideoStore`] and
//! [`vf_core::JobQueue`] seams on top of them.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;

pub use store::{SqliteJobQueue, SqliteVideoStore};
