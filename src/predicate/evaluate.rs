use super::condition::evaluate_condition;
use super::expression::evaluate_expression;
use super::Predicate;
use crate::note::{AnnotatedNote, Note};

/// Evaluate a predicate tree against a note. Total: never fails.
///
/// `And([])` is `true` and `Or([])` is `false`.
pub fn evaluate(predicate: &Predicate, note: &AnnotatedNote<'_>) -> bool {
    match predicate {
        Predicate::And(children) => children.iter().all(|child| evaluate(child, note)),
        Predicate::Or(children) => children.iter().any(|child| evaluate(child, note)),
        Predicate::Not(inner) => !evaluate(inner, note),
        Predicate::StringExpr(text) => evaluate_expression(text, note),
        Predicate::Keyed(condition) => evaluate_condition(condition, note),
    }
}

impl Predicate {
    /// Evaluate against a note carrying a computed-property overlay.
    pub fn evaluate(&self, note: &AnnotatedNote<'_>) -> bool {
        evaluate(self, note)
    }

    /// Evaluate against a bare note.
    pub fn matches(&self, note: &Note) -> bool {
        evaluate(self, &AnnotatedNote::new(note))
    }
}
