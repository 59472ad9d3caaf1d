//! cuefind-core
//!
//! Maps full-text match offsets back onto timed transcript segments and ranks
//! them. The engine producing the offsets lives behind [`traits::HitSource`];
//! see `cuefind-text` for the tantivy implementation.

#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod aggregate;
pub mod config;
pub mod corpus;
pub mod encoder;
pub mod error;
pub mod rank;
pub mod search;
pub mod segments;
pub mod traits;
pub mod types;

pub use aggregate::{aggregate, assemble};
pub use encoder::TranscriptEncoder;
pub use error::{Error, Result};
pub use rank::{rank, rank_with, ScoringMode};
pub use search::TranscriptSearch;
pub use segments::{decode_segments, locate};
pub use types::{Cue, DocumentHits, RawHit, ScoredSegment, Segment, SegmentHit, StoredValue, TranscriptDocument};
