use crate::note::{AnnotatedNote, Note};
use crate::predicate::Predicate;

/// Notes passing `filter`, in input order. No filter passes everything.
pub fn filter_notes<'a>(filter: Option<&Predicate>, notes: &'a [Note]) -> Vec<&'a Note> {
    match filter {
        None => notes.iter().collect(),
        Some(predicate) => notes.iter().filter(|note| predicate.matches(note)).collect(),
    }
}

/// Same as [`filter_notes`], over notes that already carry computed values.
pub fn filter_annotated<'a>(
    filter: Option<&Predicate>,
    notes: Vec<AnnotatedNote<'a>>,
) -> Vec<AnnotatedNote<'a>> {
    match filter {
        None => notes,
        Some(predicate) => notes
            .into_iter()
            .filter(|note| predicate.evaluate(note))
            .collect(),
    }
}
