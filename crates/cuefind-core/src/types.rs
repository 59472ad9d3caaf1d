//! Domain types shared by the encoder, the aggregator and the ranker.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

pub type DocumentId = String;

/// Term → offsets at which the engine matched it, as reported by the engine.
pub type Locations = HashMap<String, HashSet<i64>>;

/// One already-parsed, time-coded subtitle line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    #[serde(with = "secs")]
    pub start: Duration,
    #[serde(with = "secs")]
    pub end: Duration,
    pub text: String,
}

impl Cue {
    pub fn new(start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self { start, end, text: text.into() }
    }
}

/// A cue's span inside the flat transcript text.
///
/// `end_offset` is the exclusive upper bound of the segment: the byte index of
/// the first byte after the segment's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start_time: Duration,
    pub end_time: Duration,
    pub end_offset: usize,
}

impl Segment {
    /// Stored form: `(start_seconds, end_seconds, end_offset)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_triple(&self) -> [f64; 3] {
        [self.start_time.as_secs_f64(), self.end_time.as_secs_f64(), self.end_offset as f64]
    }
}

/// One video's transcript. Built by [`crate::encoder::TranscriptEncoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptDocument {
    id: DocumentId,
    text: String,
    segments: Vec<Segment>,
}

impl TranscriptDocument {
    pub(crate) fn new(id: DocumentId, text: String, segments: Vec<Segment>) -> Self {
        Self { id, text, segments }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn text(&self) -> &str { &self.text }
    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// Flat triple table as persisted next to the indexed text.
    pub fn stored_segments(&self) -> Vec<f64> {
        self.segments.iter().flat_map(Segment::to_triple).collect()
    }
}

/// A single entry of a stored segment table as it comes back from a document
/// store. Anything that is not a number is kept only by its type name.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Number(f64),
    Other(String),
}

impl From<f64> for StoredValue {
    fn from(v: f64) -> Self { Self::Number(v) }
}

impl From<&serde_json::Value> for StoredValue {
    fn from(v: &serde_json::Value) -> Self {
        match v.as_f64() {
            Some(n) => Self::Number(n),
            None => Self::Other(
                match v {
                    serde_json::Value::Null => "null",
                    serde_json::Value::Bool(_) => "bool",
                    serde_json::Value::String(_) => "string",
                    serde_json::Value::Array(_) => "array",
                    serde_json::Value::Object(_) => "object",
                    serde_json::Value::Number(_) => "number",
                }
                .to_string(),
            ),
        }
    }
}

/// One document's worth of engine output for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub document_id: DocumentId,
    pub relevance_score: f64,
    pub locations: Locations,
    /// The stored segment table fetched alongside the hit, if the engine returned it.
    pub stored_segments: Option<Vec<StoredValue>>,
}

impl RawHit {
    pub fn new(document_id: impl Into<DocumentId>, relevance_score: f64) -> Self {
        Self { document_id: document_id.into(), relevance_score, locations: Locations::new(), stored_segments: None }
    }

    #[must_use]
    pub fn with_location(mut self, term: impl Into<String>, offset: i64) -> Self {
        self.add_location(term, offset);
        self
    }

    #[must_use]
    pub fn with_stored_segments<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<StoredValue>,
    {
        self.stored_segments = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_location(&mut self, term: impl Into<String>, offset: i64) {
        self.locations.entry(term.into()).or_default().insert(offset);
    }
}

/// Matches accumulated for one segment of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentHit {
    pub start_time: Duration,
    pub end_time: Duration,
    /// One entry per (term, offset) pair that fell in this segment.
    pub terms: Vec<String>,
}

impl SegmentHit {
    pub fn new(segment: &Segment) -> Self {
        Self { start_time: segment.start_time, end_time: segment.end_time, terms: Vec::new() }
    }

    pub fn distinct_term_count(&self) -> usize {
        self.terms.iter().collect::<HashSet<_>>().len()
    }
}

/// Aggregated hits of one document, segments in per-document order.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHits {
    pub document_id: DocumentId,
    pub relevance_score: f64,
    pub segments: Vec<SegmentHit>,
}

/// Final, externally visible result unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSegment {
    pub document_id: DocumentId,
    #[serde(with = "secs")]
    pub start_time: Duration,
    #[serde(with = "secs")]
    pub end_time: Duration,
    pub sorted_terms: Vec<String>,
    pub score: f64,
}

/// (De)serializes a `Duration` as floating point seconds.
mod secs {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(|e| D::Error::custom(format!("invalid duration {secs}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_term_count_ignores_repeats() {
        let seg = Segment { start_time: Duration::ZERO, end_time: Duration::from_secs(1), end_offset: 10 };
        let mut hit = SegmentHit::new(&seg);
        hit.terms = vec!["rome".into(), "rome".into(), "caesar".into()];
        assert_eq!(hit.distinct_term_count(), 2);
        assert_eq!(hit.terms.len(), 3);
    }

    #[test]
    fn cue_reads_seconds_from_json() {
        let cue: Cue = serde_json::from_str(r#"{"start": 1.5, "end": 3, "text": "hello"}"#).expect("cue");
        assert_eq!(cue.start, Duration::from_millis(1500));
        assert_eq!(cue.end, Duration::from_secs(3));
        assert!(serde_json::from_str::<Cue>(r#"{"start": -1, "end": 3, "text": "x"}"#).is_err());
    }

    #[test]
    fn scored_segment_serializes_seconds() {
        let s = ScoredSegment {
            document_id: "vid1".into(),
            start_time: Duration::from_secs(5),
            end_time: Duration::from_millis(10_500),
            sorted_terms: vec!["caesar".into(), "rome".into()],
            score: 4.0,
        };
        let json = serde_json::to_value(&s).expect("json");
        assert_eq!(json["start_time"], 5.0);
        assert_eq!(json["end_time"], 10.5);
        assert_eq!(json["sorted_terms"][1], "rome");
    }

    #[test]
    fn stored_value_from_json() {
        assert_eq!(StoredValue::from(&serde_json::json!(2.5)), StoredValue::Number(2.5));
        assert_eq!(StoredValue::from(&serde_json::json!("x")), StoredValue::Other("string".into()));
    }
}
