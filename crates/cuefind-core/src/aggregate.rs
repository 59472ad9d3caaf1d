use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::rank::compare_segment_hits;
use crate::segments::{decode_segments, locate};
use crate::types::{DocumentHits, Locations, RawHit, Segment, SegmentHit};

/// Name of the stored field holding a document's segment table.
pub const SEGMENTS_FIELD: &str = "segments";

/// Group one document's match locations by segment.
///
/// Every (term, offset) pair lands in exactly one [`SegmentHit`]; several
/// matches inside one segment share a record. Terms are sorted and the hits
/// ordered by [`compare_segment_hits`], so the result does not depend on the
/// iteration order of `locations`. Any offset that cannot be resolved fails
/// the whole document.
pub fn aggregate(document_id: &str, relevance_score: f64, locations: &Locations, segments: &[Segment]) -> Result<DocumentHits> {
    let mut by_segment: HashMap<usize, SegmentHit> = HashMap::new();
    for (term, offsets) in locations {
        for &offset in offsets {
            let index = locate(segments, offset).map_err(|e| e.in_document(document_id))?;
            by_segment
                .entry(index)
                .or_insert_with(|| SegmentHit::new(&segments[index]))
                .terms
                .push(term.clone());
        }
    }

    let mut hits: Vec<SegmentHit> = by_segment.into_values().collect();
    for hit in &mut hits {
        hit.terms.sort_unstable();
    }
    hits.sort_by(compare_segment_hits);
    debug!(document = document_id, segments = hits.len(), "aggregated hits");

    Ok(DocumentHits { document_id: document_id.to_string(), relevance_score, segments: hits })
}

/// Decode and aggregate every hit of a query, keeping engine order.
///
/// The first failing document aborts the whole query.
pub fn assemble(raw_hits: &[RawHit]) -> Result<Vec<DocumentHits>> {
    raw_hits
        .iter()
        .map(|hit| {
            let stored = hit.stored_segments.as_deref().ok_or_else(|| Error::MissingField {
                document_id: hit.document_id.clone(),
                field: SEGMENTS_FIELD.to_string(),
            })?;
            let segments = decode_segments(stored)?;
            aggregate(&hit.document_id, hit.relevance_score, &hit.locations, &segments)
        })
        .collect()
}
