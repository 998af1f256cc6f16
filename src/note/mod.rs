pub mod annotated;
pub mod front_matter;
pub mod note;
pub mod parser;

pub use crate::types::identifiers::NoteId;
pub use annotated::{AnnotatedNote, Computed};
pub use front_matter::{parse_date, FrontMatter, FrontMatterValue, COMPUTED_KEY};
pub use note::{FileStats, Note, NoteError};
pub use parser::{parse_front_matter, split_fence, FrontMatterError, SplitDocument};
