use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::front_matter::FrontMatter;
use super::parser::{parse_front_matter, split_fence, FrontMatterError};
use crate::types::identifiers::{NoteId, NoteIdError};

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Content must be valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid note path: {0}")]
    InvalidPath(#[from] NoteIdError),
    #[error("Invalid front matter: {0}")]
    FrontMatter(#[from] FrontMatterError),
}

/// File statistics resolved by the caller. Every field may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileStats {
    pub size: Option<u64>,
    pub mtime: Option<DateTime<Utc>>,
    pub ctime: Option<DateTime<Utc>>,
}

/// A single document record: the unit the engine filters, annotates and orders.
///
/// Notes are treated as an immutable snapshot. Computed properties never
/// land here; they live in an [`AnnotatedNote`](super::AnnotatedNote) overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub path: String,
    pub relative_path: String,
    pub folder_path: String,
    pub content: String,
    pub front_matter: FrontMatter,
    #[serde(default)]
    pub file_stats: FileStats,
}

impl Note {
    /// Ingest raw bytes read by the caller into a Note.
    ///
    /// Validates UTF-8, splits an optional `---` front matter block off the
    /// body and derives identity, title and folder from the root-relative path.
    pub fn ingest(
        root: &Path,
        source: &Path,
        raw_content: Vec<u8>,
        file_stats: FileStats,
    ) -> Result<Self, NoteError> {
        let id = NoteId::from_path(root, source)?;
        let relative_path = source
            .strip_prefix(root)
            .map_err(|_| NoteIdError::OutsideRoot)?
            .to_str()
            .ok_or(NoteIdError::InvalidUtf8)?
            .replace('\\', "/");

        let text = String::from_utf8(raw_content)?;
        let split = split_fence(&text)?;
        let front_matter = match split.header {
            Some(header) => parse_front_matter(header)?,
            None => FrontMatter::new(),
        };
        let content = split.body.to_string();

        let mut note = Note::new(relative_path)
            .with_content(content)
            .with_front_matter(front_matter)
            .with_file_stats(file_stats);
        note.id = id;
        note.path = source.to_string_lossy().replace('\\', "/");
        Ok(note)
    }

    /// Build a note from an already resolved root-relative path.
    ///
    /// The title defaults to the file stem and is replaced by a string
    /// `title` front matter entry when one is supplied later.
    pub fn new(relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into().replace('\\', "/");
        let relative_path = relative_path.trim_start_matches("./").to_string();

        let (folder_path, file_name) = match relative_path.rsplit_once('/') {
            Some((folder, name)) => (folder.to_string(), name),
            None => (String::new(), relative_path.as_str()),
        };
        let title = match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file_name.to_string(),
        };

        Note {
            id: NoteId::from_relative(&relative_path),
            title,
            path: relative_path.clone(),
            relative_path,
            folder_path,
            content: String::new(),
            front_matter: FrontMatter::new(),
            file_stats: FileStats::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_front_matter(mut self, front_matter: FrontMatter) -> Self {
        if let Some(title) = front_matter.get("title").and_then(|v| v.as_str()) {
            if !title.trim().is_empty() {
                self.title = title.to_string();
            }
        }
        self.front_matter = front_matter;
        self
    }

    pub fn with_file_stats(mut self, file_stats: FileStats) -> Self {
        self.file_stats = file_stats;
        self
    }

    pub fn tags(&self) -> Vec<String> {
        self.front_matter.tags()
    }

    /// `starred` or `pinned`, whichever is truthy.
    pub fn is_starred(&self) -> bool {
        ["starred", "pinned"]
            .iter()
            .any(|key| self.front_matter.get(key).is_some_and(|v| v.is_truthy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::FrontMatterValue;

    #[test]
    fn new_derives_title_and_folder() {
        let note = Note::new("Projects/Work/Alpha.md");
        assert_eq!(note.title, "Alpha");
        assert_eq!(note.folder_path, "Projects/Work");
        assert_eq!(note.id.as_str(), "projects/work/alpha.md");

        let root = Note::new("Inbox.md");
        assert_eq!(root.folder_path, "");
    }

    #[test]
    fn front_matter_title_wins() {
        let note = Note::new("a.md").with_front_matter(FrontMatter::new().with("title", "Real Title"));
        assert_eq!(note.title, "Real Title");
    }

    #[test]
    fn ingest_splits_front_matter() {
        let raw = b"---\ntitle: Alpha\ntags: [project]\n---\nBody text\n".to_vec();
        let note = Note::ingest(
            Path::new("/vault"),
            Path::new("/vault/notes/alpha.md"),
            raw,
            FileStats::default(),
        )
        .unwrap();

        assert_eq!(note.title, "Alpha");
        assert_eq!(note.relative_path, "notes/alpha.md");
        assert_eq!(note.folder_path, "notes");
        assert_eq!(note.content, "Body text\n");
        assert_eq!(
            note.front_matter.get("tags"),
            Some(&FrontMatterValue::List(vec!["project".into()]))
        );
    }

    #[test]
    fn ingest_rejects_invalid_utf8() {
        let result = Note::ingest(
            Path::new("/vault"),
            Path::new("/vault/bad.md"),
            vec![0, 159, 146, 150],
            FileStats::default(),
        );
        assert!(matches!(result, Err(NoteError::InvalidUtf8(_))));
    }

    #[test]
    fn starred_reads_pinned_too() {
        let pinned = Note::new("a.md").with_front_matter(FrontMatter::new().with("pinned", true));
        assert!(pinned.is_starred());
        assert!(!Note::new("b.md").is_starred());
    }
}
