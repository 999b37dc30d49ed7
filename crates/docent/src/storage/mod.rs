//! Durable catalog of documents and chunks

pub mod database;

pub use database::{ChunkRecord, Database};
