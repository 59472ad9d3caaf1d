use crate::types::{RawHit, TranscriptDocument};

/// A full-text engine able to report where query terms matched.
pub trait HitSource: Send + Sync {
    /// Top `limit` documents for `query`, each with its match locations and
    /// stored segment table.
    fn raw_hits(&self, query: &str, limit: usize) -> anyhow::Result<Vec<RawHit>>;
}

/// Storage side of the engine: accepts encoded transcripts for indexing.
pub trait TranscriptSink: Send + Sync {
    fn add_transcripts(&self, documents: &[TranscriptDocument]) -> anyhow::Result<usize>;
}
