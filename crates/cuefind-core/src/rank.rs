//! Scoring and the orderings that make results reproducible.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::{DocumentHits, ScoredSegment, SegmentHit};

/// How a document's relevance is spread over its matching segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// `relevance × distinct_term_count`.
    #[default]
    Multiplicative,
    /// `relevance × number of matched occurrences`, i.e. the document score
    /// summed once per (term, offset) pair.
    Additive,
}

impl ScoringMode {
    #[allow(clippy::cast_precision_loss)]
    pub fn score(self, relevance_score: f64, hit: &SegmentHit) -> f64 {
        let weight = match self {
            Self::Multiplicative => hit.distinct_term_count(),
            Self::Additive => hit.terms.len(),
        };
        relevance_score * weight as f64
    }
}

/// Per-document order: more distinct terms first, then earlier segments.
/// Remaining ties fall back to end time and terms so the order is total.
pub fn compare_segment_hits(a: &SegmentHit, b: &SegmentHit) -> Ordering {
    b.distinct_term_count()
        .cmp(&a.distinct_term_count())
        .then_with(|| a.start_time.cmp(&b.start_time))
        .then_with(|| a.end_time.cmp(&b.end_time))
        .then_with(|| a.terms.cmp(&b.terms))
}

/// Global order: score descending, then document id, then start time.
/// Remaining ties fall back to end time and terms so the order is total.
pub fn compare_scored(a: &ScoredSegment, b: &ScoredSegment) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.document_id.cmp(&b.document_id))
        .then_with(|| a.start_time.cmp(&b.start_time))
        .then_with(|| a.end_time.cmp(&b.end_time))
        .then_with(|| a.sorted_terms.cmp(&b.sorted_terms))
}

pub fn rank(documents: &[DocumentHits]) -> Vec<ScoredSegment> {
    rank_with(documents, ScoringMode::default())
}

/// Score every segment hit, flatten across documents and sort with [`compare_scored`].
pub fn rank_with(documents: &[DocumentHits], mode: ScoringMode) -> Vec<ScoredSegment> {
    let mut scored: Vec<ScoredSegment> = documents
        .iter()
        .flat_map(|doc| {
            doc.segments.iter().map(move |hit| {
                let mut sorted_terms = hit.terms.clone();
                sorted_terms.sort_unstable();
                ScoredSegment {
                    document_id: doc.document_id.clone(),
                    start_time: hit.start_time,
                    end_time: hit.end_time,
                    sorted_terms,
                    score: mode.score(doc.relevance_score, hit),
                }
            })
        })
        .collect();
    scored.sort_by(compare_scored);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn hit(start: u64, terms: &[&str]) -> SegmentHit {
        SegmentHit {
            start_time: Duration::from_secs(start),
            end_time: Duration::from_secs(start + 5),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn scored(id: &str, start: u64, score: f64) -> ScoredSegment {
        ScoredSegment {
            document_id: id.into(),
            start_time: Duration::from_secs(start),
            end_time: Duration::from_secs(start + 5),
            sorted_terms: vec!["t".into()],
            score,
        }
    }

    #[test]
    fn segment_order_prefers_distinct_terms() {
        let many_repeats = hit(0, &["a", "a", "a"]);
        let two_distinct = hit(30, &["a", "b"]);
        assert_eq!(compare_segment_hits(&two_distinct, &many_repeats), Ordering::Less);
        assert_eq!(compare_segment_hits(&hit(5, &["a"]), &hit(10, &["b"])), Ordering::Less);
        assert_eq!(compare_segment_hits(&hit(5, &["a"]), &hit(5, &["a"])), Ordering::Equal);
    }

    #[test]
    fn scored_order_breaks_ties() {
        assert_eq!(compare_scored(&scored("b", 50, 4.0), &scored("a", 0, 2.0)), Ordering::Less);
        assert_eq!(compare_scored(&scored("a", 50, 2.0), &scored("b", 0, 2.0)), Ordering::Less);
        assert_eq!(compare_scored(&scored("a", 0, 2.0), &scored("a", 50, 2.0)), Ordering::Less);
        assert_eq!(compare_scored(&scored("a", 0, 2.0), &scored("a", 0, 2.0)), Ordering::Equal);
    }

    #[test]
    fn rank_flattens_and_orders() {
        let docs = vec![
            DocumentHits { document_id: "zeta".into(), relevance_score: 1.0, segments: vec![hit(0, &["x"]), hit(20, &["x", "y"])] },
            DocumentHits { document_id: "alpha".into(), relevance_score: 1.0, segments: vec![hit(40, &["y"])] },
        ];
        let ranked = rank(&docs);
        let keys: Vec<(&str, u64, f64)> =
            ranked.iter().map(|s| (s.document_id.as_str(), s.start_time.as_secs(), s.score)).collect();
        assert_eq!(keys, vec![("zeta", 20, 2.0), ("alpha", 40, 1.0), ("zeta", 0, 1.0)]);
    }

    #[test]
    fn additive_mode_counts_occurrences() {
        let docs = vec![DocumentHits { document_id: "v".into(), relevance_score: 1.5, segments: vec![hit(0, &["rome", "rome", "caesar"])] }];
        assert_eq!(rank_with(&docs, ScoringMode::Additive)[0].score, 4.5);
        assert_eq!(rank_with(&docs, ScoringMode::Multiplicative)[0].score, 3.0);
    }

    #[test]
    fn scoring_mode_parses_lowercase() {
        let mode: ScoringMode = serde_json::from_str("\"additive\"").expect("mode");
        assert_eq!(mode, ScoringMode::Additive);
    }
}
