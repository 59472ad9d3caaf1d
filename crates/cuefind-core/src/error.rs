use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transcript has no cues")]
    EmptyTranscript,

    #[error("separator {0:?} would merge words across cues")]
    InvalidSeparator(char),

    #[error("cue {index} has no text")]
    EmptyCue { index: usize },

    #[error("malformed segment table at position {position}: {reason}")]
    MalformedBoundary { position: usize, reason: String },

    #[error("invalid offset {offset} in document '{document_id}'")]
    InvalidOffset { document_id: String, offset: i64 },

    #[error("offset {offset} in document '{document_id}' is past the last segment boundary ({last_boundary})")]
    SegmentNotFound { document_id: String, offset: i64, last_boundary: usize },

    #[error("document '{document_id}' is missing stored field '{field}'")]
    MissingField { document_id: String, field: String },
}

impl Error {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        Self::MalformedBoundary { position, reason: reason.into() }
    }
}

/// Failure of a single offset lookup. Carries no document identity; the
/// aggregator attaches it with [`LocateError::in_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateError {
    InvalidOffset { offset: i64 },
    SegmentNotFound { offset: i64, last_boundary: usize },
}

impl LocateError {
    pub fn in_document(self, document_id: &str) -> Error {
        let document_id = document_id.to_string();
        match self {
            Self::InvalidOffset { offset } => Error::InvalidOffset { document_id, offset },
            Self::SegmentNotFound { offset, last_boundary } => Error::SegmentNotFound { document_id, offset, last_boundary },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
