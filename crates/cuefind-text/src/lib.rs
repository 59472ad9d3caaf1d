//! cuefind-text
//!
//! Tantivy-backed transcript index. Stores each transcript's flat text and its
//! segment table, and answers queries with per-term byte offsets so the core
//! can map matches back to timestamps.

pub mod tantivy_utils;
pub mod index;

pub use index::{index_dir, TranscriptIndex};
