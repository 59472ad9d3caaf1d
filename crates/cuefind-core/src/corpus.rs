//! Loading already-parsed cue files from a channel folder.
//!
//! A channel folder holds one `<video-id>.<lang>.json` file per video. Each
//! file is either `{ "cues": [...] }` or a bare array of cues.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::encoder::TranscriptEncoder;
use crate::types::{Cue, TranscriptDocument};

#[derive(Deserialize)]
#[serde(untagged)]
enum CueFile {
    Wrapped { cues: Vec<Cue> },
    Bare(Vec<Cue>),
}

impl CueFile {
    fn into_cues(self) -> Vec<Cue> {
        match self {
            Self::Wrapped { cues } | Self::Bare(cues) => cues,
        }
    }
}

pub struct CorpusLoader {
    lang: String,
    encoder: TranscriptEncoder,
}

impl CorpusLoader {
    pub fn new(lang: impl Into<String>, encoder: TranscriptEncoder) -> Self {
        Self { lang: lang.into(), encoder }
    }

    /// Video id of a cue file name for this loader's language, if it is one.
    pub fn document_id(&self, file_name: &str) -> Option<String> {
        let parts: Vec<&str> = file_name.split('.').collect();
        if parts.len() <= 2 || parts[parts.len() - 2] != self.lang || parts[0].is_empty() {
            return None;
        }
        Some(parts[0].to_string())
    }

    pub fn list_files(&self, folder: &Path) -> Vec<(String, PathBuf)> {
        let mut files: Vec<(String, PathBuf)> = walkdir::WalkDir::new(folder)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
            .filter_map(|e| {
                let id = self.document_id(e.file_name().to_str()?)?;
                Some((id, e.into_path()))
            })
            .collect();
        files.sort();
        files
    }

    pub fn load_file(&self, id: &str, path: &Path) -> Result<TranscriptDocument> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let cues = serde_json::from_str::<CueFile>(&raw)
            .with_context(|| format!("parsing cues in {}", path.display()))?
            .into_cues();
        self.encoder
            .encode(id, &cues)
            .with_context(|| format!("encoding {}", path.display()))
    }

    /// Encode every cue file of the folder. Files that fail are logged and skipped.
    pub fn load_dir(&self, folder: &Path) -> Result<Vec<TranscriptDocument>> {
        if !folder.is_dir() {
            anyhow::bail!("{} is not a directory", folder.display());
        }
        let files = self.list_files(folder);
        let mut documents = Vec::with_capacity(files.len());
        for (id, path) in &files {
            match self.load_file(id, path) {
                Ok(doc) => documents.push(doc),
                Err(e) => warn!(file = %path.display(), error = %format!("{e:#}"), "skipping transcript"),
            }
        }
        info!(folder = %folder.display(), loaded = documents.len(), found = files.len(), "loaded transcripts");
        Ok(documents)
    }
}
