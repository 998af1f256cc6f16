pub mod filters;
pub mod formulas;
pub mod sorting;

use std::borrow::Cow;

use crate::base::{Base, View};
use crate::config::EngineConfig;
use crate::formula::{FormulaEvaluator, RestrictedFormulaEvaluator};
use crate::note::{AnnotatedNote, Note};
use crate::types::query_result::{QueryResult, ResultRow, ViewMetadata, ViewResult};
pub use filters::{filter_annotated, filter_notes};
pub use formulas::process_formulas;
pub use sorting::{compare_values, sort_notes, sort_value, SortValue};

/// Runs a Base over a note snapshot:
/// filter, then formulas, then per-view filter and sort.
///
/// Evaluation never fails. Bad rules degrade to exclusion for the notes
/// they touch; the rest of the Base is unaffected.
pub struct QueryEngine<F = RestrictedFormulaEvaluator> {
    evaluator: F,
    config: EngineConfig,
}

impl Default for QueryEngine<RestrictedFormulaEvaluator> {
    fn default() -> Self {
        Self::with_config(EngineConfig::v0())
    }
}

impl QueryEngine<RestrictedFormulaEvaluator> {
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            evaluator: RestrictedFormulaEvaluator::new(&config),
            config,
        }
    }
}

impl<F> QueryEngine<F>
where
    F: FormulaEvaluator,
{
    pub fn new(evaluator: F, config: EngineConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The Base's views, or a single default table when it declares none.
    pub fn views<'b>(&self, base: &'b Base) -> Cow<'b, [View]> {
        if base.views.is_empty() {
            Cow::Owned(vec![View::table(self.config.default_view_name.clone())])
        } else {
            Cow::Borrowed(&base.views)
        }
    }

    /// Base filter followed by formula annotation, in collection order.
    pub fn annotate<'a>(&self, base: &Base, notes: &'a [Note]) -> Vec<AnnotatedNote<'a>> {
        let matched = filter_notes(base.filters.as_ref(), notes);
        log::debug!(
            "base `{}`: {} of {} note(s) matched",
            base.id,
            matched.len(),
            notes.len()
        );
        process_formulas(&self.evaluator, &base.formulas, matched)
    }

    /// View filter and sort over already annotated notes.
    pub fn apply_view<'a>(&self, view: &View, annotated: Vec<AnnotatedNote<'a>>) -> Vec<AnnotatedNote<'a>> {
        let filtered = filter_annotated(view.filter.as_ref(), annotated);
        sort_notes(filtered, &view.sort)
    }

    /// Evaluate one view. `None` selects the first view; an unknown name
    /// yields `None`.
    pub fn query_view(&self, base: &Base, view_name: Option<&str>, notes: &[Note]) -> Option<ViewResult> {
        let views = self.views(base);
        let view = match view_name {
            Some(name) => views.iter().find(|view| view.name == name)?,
            None => views.first()?,
        };

        let annotated = self.annotate(base, notes);
        Some(self.render_view(base, view, annotated, notes.len()))
    }

    /// Evaluate every view of the Base.
    pub fn query(&self, base: &Base, notes: &[Note]) -> QueryResult {
        let annotated = self.annotate(base, notes);
        let matched_notes = annotated.iter().map(|note| note.note().id.clone()).collect();

        let views = self
            .views(base)
            .iter()
            .map(|view| self.render_view(base, view, annotated.clone(), notes.len()))
            .collect();

        QueryResult {
            base: base.id.clone(),
            matched_notes,
            views,
        }
    }

    fn render_view(
        &self,
        base: &Base,
        view: &View,
        annotated: Vec<AnnotatedNote<'_>>,
        notes_considered: usize,
    ) -> ViewResult {
        let notes_matched_base = annotated.len();
        let ordered = self.apply_view(view, annotated);

        log::debug!(
            "base `{}` view `{}`: {} row(s)",
            base.id,
            view.name,
            ordered.len()
        );

        let rows: Vec<ResultRow> = ordered
            .iter()
            .map(|note| ResultRow {
                id: note.note().id.clone(),
                computed: note.merged_computed(),
            })
            .collect();

        ViewResult {
            name: view.name.clone(),
            view_type: view.view_type,
            order: view.order.clone(),
            metadata: ViewMetadata {
                notes_considered,
                notes_matched_base,
                notes_matched_view: rows.len(),
                formulas_applied: base.formulas.len(),
            },
            rows,
        }
    }
}
