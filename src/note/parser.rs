//! Splitting a `---` fenced YAML header off a document body.
//!
//! Shared by note ingestion and Base parsing. The body is never interpreted.

use thiserror::Error;

use super::front_matter::FrontMatter;

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("Front matter block opened with `---` is never closed")]
    Unterminated,
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A document cut into its optional fenced header and its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub header: Option<&'a str>,
    pub body: &'a str,
}

/// Split off a leading `---` block closed by `---` or `...`.
///
/// A document that does not open with a fence is all body.
pub fn split_fence(text: &str) -> Result<SplitDocument<'_>, FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(rest) = strip_opening_fence(text) else {
        return Ok(SplitDocument {
            header: None,
            body: text,
        });
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(|c| c == '\n' || c == '\r');
        if trimmed == "---" || trimmed == "..." {
            return Ok(SplitDocument {
                header: Some(&rest[..offset]),
                body: &rest[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

fn strip_opening_fence(text: &str) -> Option<&str> {
    let line_end = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    let first = text[..line_end].trim_end();
    if first == "---" {
        Some(&text[line_end..])
    } else {
        None
    }
}

/// Parse a YAML header into front matter. A blank header is empty front matter.
pub fn parse_front_matter(header: &str) -> Result<FrontMatter, FrontMatterError> {
    if header.trim().is_empty() {
        return Ok(FrontMatter::new());
    }
    Ok(serde_yaml::from_str(header)?)
}
