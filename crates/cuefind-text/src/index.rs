use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use cuefind_core::aggregate::SEGMENTS_FIELD;
use cuefind_core::traits::{HitSource, TranscriptSink};
use cuefind_core::{Error, RawHit, StoredValue, TranscriptDocument};

use crate::tantivy_utils::{build_schema, register_tokenizer, ID_FIELD, TEXT_FIELD};

/// Location of the index for `lang` inside a channel folder.
pub fn index_dir(folder: &Path, lang: &str) -> PathBuf { folder.join(format!("{lang}.tantivy")) }

pub struct TranscriptIndex {
	index: Index,
	reader: IndexReader,
	id_field: Field,
	text_field: Field,
	segments_field: Field,
}

impl TranscriptIndex {
	/// Build a brand-new index at `index_dir`, replacing any existing one.
	pub fn create(index_dir: &Path, lang: &str) -> Result<Self> {
		if index_dir.exists() { std::fs::remove_dir_all(index_dir)?; }
		std::fs::create_dir_all(index_dir)?;
		let index = Index::create_in_dir(index_dir, build_schema())?;
		info!(dir = %index_dir.display(), lang, "created transcript index");
		Self::from_index(index, lang)
	}

	pub fn open(index_dir: &Path, lang: &str) -> Result<Self> {
		let index = Index::open_in_dir(index_dir).with_context(|| format!("opening index {}", index_dir.display()))?;
		info!(dir = %index_dir.display(), lang, "opened transcript index");
		Self::from_index(index, lang)
	}

	/// Open the index if one exists, otherwise create an empty one. The flag
	/// tells whether the index was just created and still needs documents.
	pub fn open_or_create(index_dir: &Path, lang: &str) -> Result<(Self, bool)> {
		match Self::open(index_dir, lang) {
			Ok(index) => Ok((index, false)),
			Err(e) => {
				debug!(error = %format!("{e:#}"), "no usable index, creating one");
				Ok((Self::create(index_dir, lang)?, true))
			}
		}
	}

	pub fn in_ram(lang: &str) -> Result<Self> { Self::from_index(Index::create_in_ram(build_schema()), lang) }

	fn from_index(index: Index, lang: &str) -> Result<Self> {
		register_tokenizer(&index, lang);
		let schema = index.schema();
		let id_field = schema.get_field(ID_FIELD)?;
		let text_field = schema.get_field(TEXT_FIELD)?;
		let segments_field = schema.get_field(SEGMENTS_FIELD)?;
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		Ok(Self { index, reader, id_field, text_field, segments_field })
	}

	pub fn num_docs(&self) -> u64 { self.reader.searcher().num_docs() }

	fn to_document(&self, transcript: &TranscriptDocument) -> TantivyDocument {
		let mut doc = TantivyDocument::default();
		doc.add_text(self.id_field, transcript.id());
		doc.add_text(self.text_field, transcript.text());
		for value in transcript.stored_segments() { doc.add_f64(self.segments_field, value); }
		doc
	}

	/// Byte offsets of every token of `text` that equals one of `terms`.
	fn term_offsets(&self, text: &str, terms: &HashSet<String>, hit: &mut RawHit) -> Result<()> {
		let mut analyzer = self.index.tokenizer_for_field(self.text_field)?;
		let mut stream = analyzer.token_stream(text);
		while stream.advance() {
			let token = stream.token();
			if terms.contains(&token.text) {
				hit.add_location(token.text.clone(), i64::try_from(token.offset_from)?);
			}
		}
		Ok(())
	}
}

impl TranscriptSink for TranscriptIndex {
	/// Index (or re-index, keyed by video id) the given transcripts.
	fn add_transcripts(&self, documents: &[TranscriptDocument]) -> Result<usize> {
		let mut index_writer: IndexWriter = self.index.writer(50_000_000)?;
		for transcript in documents {
			index_writer.delete_term(Term::from_field_text(self.id_field, transcript.id()));
			index_writer.add_document(self.to_document(transcript))?;
		}
		index_writer.commit()?;
		self.reader.reload()?;
		info!(documents = documents.len(), "indexed transcripts");
		Ok(documents.len())
	}
}

impl HitSource for TranscriptIndex {
	fn raw_hits(&self, query: &str, limit: usize) -> Result<Vec<RawHit>> {
		// TopDocs panics on a zero limit.
		if limit == 0 { return Ok(Vec::new()); }
		let searcher = self.reader.searcher();
		let qp = QueryParser::for_index(&self.index, vec![self.text_field]);
		let q = qp.parse_query(query)?;

		let mut terms = HashSet::new();
		q.query_terms(&mut |term, _| {
			if term.field() == self.text_field {
				if let Some(text) = term.value().as_str() { terms.insert(text.to_string()); }
			}
		});

		let top_docs = searcher.search(&q, &TopDocs::with_limit(limit))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let Some(id) = doc.get_first(self.id_field).and_then(|v| v.as_str()).map(str::to_string) else {
				return Err(Error::MissingField { document_id: format!("{addr:?}"), field: ID_FIELD.to_string() }.into());
			};
			let Some(text) = doc.get_first(self.text_field).and_then(|v| v.as_str()) else {
				return Err(Error::MissingField { document_id: id, field: TEXT_FIELD.to_string() }.into());
			};
			let mut hit = RawHit::new(id, f64::from(score));
			let stored: Vec<StoredValue> = doc
				.get_all(self.segments_field)
				.map(|v| v.as_f64().map_or_else(|| StoredValue::Other("non-numeric value".to_string()), StoredValue::Number))
				.collect();
			if !stored.is_empty() { hit.stored_segments = Some(stored); }
			self.term_offsets(text, &terms, &mut hit)?;
			hits.push(hit);
		}
		debug!(query, documents = hits.len(), terms = terms.len(), "collected raw hits");
		Ok(hits)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cuefind_core::{Cue, TranscriptEncoder};
	use std::time::Duration;

	fn transcript(id: &str, lines: &[&str]) -> TranscriptDocument {
		let cues: Vec<Cue> = lines
			.iter()
			.enumerate()
			.map(|(i, text)| Cue::new(Duration::from_secs(5 * i as u64), Duration::from_secs(5 * i as u64 + 5), *text))
			.collect();
		TranscriptEncoder::new().encode(id, &cues).expect("encode")
	}

	#[test]
	fn raw_hits_report_byte_offsets_and_segments() {
		let index = TranscriptIndex::in_ram("en").expect("index");
		let doc = transcript("vid1", &["Rome was not built", "in a day said Caesar"]);
		index.add_transcripts(std::slice::from_ref(&doc)).expect("add");

		let hits = index.raw_hits("caesar rome", 10).expect("search");
		assert_eq!(hits.len(), 1);
		let hit = &hits[0];
		assert_eq!(hit.document_id, "vid1");
		assert!(hit.relevance_score > 0.0);
		let caesar = doc.text().find("Caesar").expect("present") as i64;
		assert_eq!(hit.locations["caesar"], HashSet::from([caesar]));
		assert_eq!(hit.locations["rome"], HashSet::from([0]));
		let expected: Vec<StoredValue> = doc.stored_segments().into_iter().map(StoredValue::Number).collect();
		assert_eq!(hit.stored_segments.as_deref(), Some(expected.as_slice()));
	}

	#[test]
	fn reindexing_replaces_document() {
		let index = TranscriptIndex::in_ram("en").expect("index");
		index.add_transcripts(&[transcript("vid1", &["gaul is divided"])]).expect("add");
		index.add_transcripts(&[transcript("vid1", &["gaul is divided into three parts"])]).expect("add");
		assert_eq!(index.num_docs(), 1);
	}

	#[test]
	fn zero_limit_returns_no_hits() {
		let index = TranscriptIndex::in_ram("en").expect("index");
		index.add_transcripts(&[transcript("vid1", &["hail caesar"])]).expect("add");
		assert!(index.raw_hits("caesar", 0).expect("search").is_empty());
		assert_eq!(index.raw_hits("caesar", 1).expect("search").len(), 1);
	}

	#[test]
	fn document_without_id_is_rejected() {
		let index = TranscriptIndex::in_ram("en").expect("index");
		let mut doc = TantivyDocument::default();
		doc.add_text(index.text_field, "hail caesar");
		for value in [0.0, 2.0, 11.0] { doc.add_f64(index.segments_field, value); }
		let mut writer: IndexWriter = index.index.writer(50_000_000).expect("writer");
		writer.add_document(doc).expect("add");
		writer.commit().expect("commit");
		index.reader.reload().expect("reload");

		let err = index.raw_hits("caesar", 10).unwrap_err();
		assert!(matches!(err.downcast_ref::<Error>(), Some(Error::MissingField { field, .. }) if field == ID_FIELD));
	}

	#[test]
	fn invalid_query_is_an_error() {
		let index = TranscriptIndex::in_ram("en").expect("index");
		assert!(index.raw_hits("text:(", 10).is_err());
	}
}
