use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Cue, Segment, TranscriptDocument};

/// Flattens parsed cues into one searchable text plus its segment table.
///
/// Cues are joined with `separator`. A segment's `end_offset` is the byte
/// length of the flat text right after its cue, so the separator that follows
/// belongs to no segment and an offset equal to a boundary resolves to the
/// next segment.
#[derive(Debug, Clone)]
pub struct TranscriptEncoder {
    separator: char,
    skip_empty_cues: bool,
}

impl Default for TranscriptEncoder {
    fn default() -> Self {
        Self { separator: '\n', skip_empty_cues: false }
    }
}

impl TranscriptEncoder {
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Drop cues without text instead of failing the whole transcript.
    #[must_use]
    pub fn skip_empty_cues(mut self, skip: bool) -> Self {
        self.skip_empty_cues = skip;
        self
    }

    /// Fails for separators a tokenizer would read as part of a word.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_alphanumeric() {
            return Err(Error::InvalidSeparator(self.separator));
        }
        Ok(())
    }

    pub fn encode(&self, id: impl Into<String>, cues: &[Cue]) -> Result<TranscriptDocument> {
        self.validate()?;
        let id = id.into();
        let mut text = String::new();
        let mut segments = Vec::with_capacity(cues.len());
        for (index, cue) in cues.iter().enumerate() {
            if cue.text.trim().is_empty() {
                if self.skip_empty_cues {
                    debug!(document = %id, cue = index, "skipping empty cue");
                    continue;
                }
                return Err(Error::EmptyCue { index });
            }
            if !segments.is_empty() {
                text.push(self.separator);
            }
            text.push_str(&cue.text);
            segments.push(Segment { start_time: cue.start, end_time: cue.end, end_offset: text.len() });
        }
        if segments.is_empty() {
            return Err(Error::EmptyTranscript);
        }
        Ok(TranscriptDocument::new(id, text, segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cue(start: u64, end: u64, text: &str) -> Cue {
        Cue::new(Duration::from_secs(start), Duration::from_secs(end), text)
    }

    #[test]
    fn boundaries_exclude_separator() {
        let doc = TranscriptEncoder::new()
            .encode("vid", &[cue(0, 2, "hello there"), cue(2, 4, "general"), cue(4, 5, "kenobi")])
            .expect("encode");
        assert_eq!(doc.text(), "hello there\ngeneral\nkenobi");
        let ends: Vec<usize> = doc.segments().iter().map(|s| s.end_offset).collect();
        assert_eq!(ends, vec![11, 19, 26]);
        assert_eq!(&doc.text()[12..19], "general");
    }

    #[test]
    fn offsets_count_bytes() {
        let doc = TranscriptEncoder::new().encode("vid", &[cue(0, 1, "café"), cue(1, 2, "au lait")]).expect("encode");
        assert_eq!(doc.segments()[0].end_offset, "café".len());
        assert_eq!(doc.segments()[1].end_offset, doc.text().len());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(TranscriptEncoder::new().encode("vid", &[]), Err(Error::EmptyTranscript)));
    }

    #[test]
    fn empty_cue_fails_unless_skipped() {
        let cues = [cue(0, 1, "one"), cue(1, 2, "  "), cue(2, 3, "three")];
        assert!(matches!(TranscriptEncoder::new().encode("vid", &cues), Err(Error::EmptyCue { index: 1 })));

        let doc = TranscriptEncoder::new().skip_empty_cues(true).encode("vid", &cues).expect("encode");
        assert_eq!(doc.text(), "one\nthree");
        assert_eq!(doc.segments().len(), 2);
        assert_eq!(doc.segments()[1].start_time, Duration::from_secs(2));

        let only_empty = [cue(0, 1, "")];
        assert!(matches!(
            TranscriptEncoder::new().skip_empty_cues(true).encode("vid", &only_empty),
            Err(Error::EmptyTranscript)
        ));
    }

    #[test]
    fn word_character_separator_is_rejected() {
        let encoder = TranscriptEncoder::new().separator('x');
        assert!(matches!(encoder.validate(), Err(Error::InvalidSeparator('x'))));
        assert!(matches!(encoder.encode("vid", &[cue(0, 1, "rome"), cue(1, 2, "caesar")]), Err(Error::InvalidSeparator('x'))));
        assert!(TranscriptEncoder::new().separator('7').validate().is_err());
        assert!(TranscriptEncoder::new().separator('|').validate().is_ok());
    }

    #[test]
    fn custom_separator() {
        let doc = TranscriptEncoder::new().separator(' ').encode("vid", &[cue(0, 1, "a b"), cue(1, 2, "c")]).expect("encode");
        assert_eq!(doc.text(), "a b c");
        assert_eq!(doc.stored_segments(), vec![0.0, 1.0, 3.0, 1.0, 2.0, 5.0]);
    }
}
