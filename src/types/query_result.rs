use serde::{Deserialize, Serialize};

use crate::base::ViewType;
use crate::note::Computed;
use crate::types::identifiers::{BaseId, NoteId};

/// One note in a view's output, with the computed values presentation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: NoteId,
    pub computed: Computed,
}

/// Counts describing how a view narrowed the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMetadata {
    pub notes_considered: usize,
    pub notes_matched_base: usize,
    pub notes_matched_view: usize,
    pub formulas_applied: usize,
}

/// The ordered output of one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResult {
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    /// Display columns, passed through from the view unmodified.
    pub order: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub metadata: ViewMetadata,
}

impl ViewResult {
    pub fn note_ids(&self) -> Vec<&NoteId> {
        self.rows.iter().map(|row| &row.id).collect()
    }
}

/// The result of evaluating a Base over a note snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub base: BaseId,
    /// Notes passing the Base filter, in collection order.
    pub matched_notes: Vec<NoteId>,
    pub views: Vec<ViewResult>,
}

impl QueryResult {
    pub fn view(&self, name: &str) -> Option<&ViewResult> {
        self.views.iter().find(|view| view.name == name)
    }
}
