use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

use cuefind_core::aggregate::SEGMENTS_FIELD;

pub const ID_FIELD: &str = "id";
pub const TEXT_FIELD: &str = "text";
pub const TRANSCRIPT_TOKENIZER: &str = "transcript";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_text_field(ID_FIELD, STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TRANSCRIPT_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
	schema_builder.add_text_field(TEXT_FIELD, text_options);
	// Flat (start_seconds, end_seconds, end_offset) triples, stored only.
	schema_builder.add_f64_field(SEGMENTS_FIELD, STORED);
	schema_builder.build()
}

const ENGLISH_STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

pub fn stemmer_language(lang: &str) -> Option<Language> {
	match lang {
		"en" => Some(Language::English),
		"fr" => Some(Language::French),
		"de" => Some(Language::German),
		"es" => Some(Language::Spanish),
		"it" => Some(Language::Italian),
		"pt" => Some(Language::Portuguese),
		"nl" => Some(Language::Dutch),
		"ru" => Some(Language::Russian),
		"sv" => Some(Language::Swedish),
		_ => None,
	}
}

pub fn transcript_analyzer(lang: &str) -> TextAnalyzer {
	match (lang, stemmer_language(lang)) {
		("en", _) => TextAnalyzer::builder(SimpleTokenizer::default())
			.filter(RemoveLongFilter::limit(40))
			.filter(LowerCaser)
			.filter(StopWordFilter::remove(ENGLISH_STOP_WORDS.iter().map(|s| s.to_string())))
			.filter(Stemmer::new(Language::English))
			.build(),
		(_, Some(language)) => TextAnalyzer::builder(SimpleTokenizer::default())
			.filter(RemoveLongFilter::limit(40))
			.filter(LowerCaser)
			.filter(Stemmer::new(language))
			.build(),
		(_, None) => TextAnalyzer::builder(SimpleTokenizer::default())
			.filter(RemoveLongFilter::limit(40))
			.filter(LowerCaser)
			.build(),
	}
}

pub fn register_tokenizer(index: &Index, lang: &str) {
	index.tokenizers().register(TRANSCRIPT_TOKENIZER, transcript_analyzer(lang));
}
