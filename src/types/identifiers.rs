use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::note::Note;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteIdError {
    #[error("Source path is outside the ingestion root")]
    OutsideRoot,
    #[error("Path involves invalid UTF-8")]
    InvalidUtf8,
}

impl NoteId {
    /// Create a NoteId from a source path and a single ingestion root.
    pub fn from_path(root: &Path, source: &Path) -> Result<Self, NoteIdError> {
        let rel = source
            .strip_prefix(root)
            .map_err(|_| NoteIdError::OutsideRoot)?;

        let s = rel.to_str().ok_or(NoteIdError::InvalidUtf8)?;

        Ok(Self::from_relative(s))
    }

    /// Create a NoteId from an already root-relative path.
    pub fn from_relative(relative_path: &str) -> Self {
        NoteId(normalize_path(relative_path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backslashes become `/`, a leading `./` is dropped, everything is lowercased.
pub(crate) fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches("./")
        .trim_start_matches('/')
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseId(String);

impl BaseId {
    pub fn new(id: impl Into<String>) -> Self {
        BaseId(id.into())
    }

    /// Derive a BaseId from the path of the document the Base was read from.
    /// The extension is dropped: `views/Projects.base` becomes `views/projects`.
    pub fn from_source(source: &str) -> Self {
        let normalized = normalize_path(source);
        let stem = match normalized.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem.to_string(),
            _ => normalized,
        };
        BaseId(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hash of a whole note snapshot.
///
/// Two snapshots share a version only when they hold the same notes, in the
/// same order, with the same content, front matter and file statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionVersion(String);

impl CollectionVersion {
    pub fn from_notes(notes: &[Note]) -> Self {
        let mut hasher = Sha256::new();

        for note in notes {
            hasher.update(note.id.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(note.title.as_bytes());
            hasher.update([0u8]);
            hasher.update(note.relative_path.as_bytes());
            hasher.update([0u8]);
            hasher.update(note.content.as_bytes());
            hasher.update([0u8]);
            // Authored key order is part of the version
            let front_matter = serde_json::to_vec(&note.front_matter).unwrap_or_default();
            hasher.update(&front_matter);
            hasher.update([0u8]);
            let stats = serde_json::to_vec(&note.file_stats).unwrap_or_default();
            hasher.update(&stats);
            hasher.update([0xffu8]);
        }

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        CollectionVersion(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
