pub mod identifiers;
pub mod query_result;

pub use identifiers::{BaseId, CollectionVersion, NoteId};
pub use query_result::{QueryResult, ResultRow, ViewMetadata, ViewResult};
