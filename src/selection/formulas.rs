use crate::base::Formula;
use crate::formula::FormulaEvaluator;
use crate::note::{AnnotatedNote, Note};

/// Wrap each note in a fresh overlay and evaluate every formula into it,
/// in declaration order, so a formula can read the ones before it.
pub fn process_formulas<'a, F>(evaluator: &F, formulas: &[Formula], notes: Vec<&'a Note>) -> Vec<AnnotatedNote<'a>>
where
    F: FormulaEvaluator + ?Sized,
{
    notes
        .into_iter()
        .map(|note| {
            let mut annotated = AnnotatedNote::new(note);
            for formula in formulas {
                let value = evaluator.evaluate(&formula.formula, &annotated);
                log::trace!("{} {} = {:?}", note.id, formula.name, value);
                annotated.set_computed(formula.name.clone(), value);
            }
            annotated
        })
        .collect()
}
