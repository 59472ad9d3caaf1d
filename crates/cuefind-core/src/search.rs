use tracing::debug;

use crate::aggregate::assemble;
use crate::error::Result;
use crate::rank::{rank_with, ScoringMode};
use crate::traits::HitSource;
use crate::types::{RawHit, ScoredSegment};

/// Query → raw hits → per-segment hits → ranked list.
pub struct TranscriptSearch<S> where S: HitSource {
    source: S,
    scoring: ScoringMode,
    limit: usize,
}

impl<S> TranscriptSearch<S> where S: HitSource {
    pub fn new(source: S) -> Self { Self { source, scoring: ScoringMode::default(), limit: 50 } }

    #[must_use]
    pub fn scoring(mut self, scoring: ScoringMode) -> Self { self.scoring = scoring; self }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self { self.limit = limit; self }

    pub fn fetch(&self, query: &str) -> anyhow::Result<Vec<RawHit>> {
        let hits = self.source.raw_hits(query, self.limit)?;
        debug!(query, documents = hits.len(), "fetched raw hits");
        Ok(hits)
    }

    /// Aggregate and rank a complete raw hit set.
    pub fn resolve(&self, raw_hits: &[RawHit]) -> Result<Vec<ScoredSegment>> {
        let documents = assemble(raw_hits)?;
        Ok(rank_with(&documents, self.scoring))
    }

    pub fn search(&self, query: &str) -> anyhow::Result<Vec<ScoredSegment>> {
        let raw_hits = self.fetch(query)?;
        Ok(self.resolve(&raw_hits)?)
    }
}
