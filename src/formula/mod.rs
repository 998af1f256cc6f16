//! Computed properties.
//!
//! A formula is substituted (see [`substitute`]) and then evaluated under
//! exactly one of two restricted grammars (see [`parser`]). There is no path
//! to general code execution. A formula outside both grammars is its own
//! value: the original text is returned unchanged.

pub mod parser;
pub mod substitute;

use crate::config::EngineConfig;
use crate::error::EvalFailure;
use crate::note::{AnnotatedNote, FrontMatterValue};

pub use parser::{parse, BinaryOp, Expr, FormulaError, Literal};
pub use substitute::substitute;

pub trait FormulaEvaluator {
    /// Compute a value for `formula` against `note`. Never fails.
    fn evaluate(&self, formula: &str, note: &AnnotatedNote<'_>) -> FrontMatterValue;
}

/// The two-grammar evaluator.
#[derive(Debug, Clone)]
pub struct RestrictedFormulaEvaluator {
    max_depth: usize,
    max_length: usize,
    division_by_zero: String,
}

impl RestrictedFormulaEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_depth: config.max_formula_depth,
            max_length: config.max_formula_length,
            division_by_zero: config.division_by_zero.clone(),
        }
    }

    pub fn try_evaluate(&self, formula: &str, note: &AnnotatedNote<'_>) -> Result<Literal, FormulaError> {
        if formula.len() > self.max_length {
            return Err(FormulaError::TooLong(self.max_length));
        }
        let substituted = substitute(formula, note);
        if substituted.len() > self.max_length {
            return Err(FormulaError::TooLong(self.max_length));
        }
        parse(substituted.trim(), self.max_depth)?.eval()
    }
}

impl Default for RestrictedFormulaEvaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::v0())
    }
}

impl FormulaEvaluator for RestrictedFormulaEvaluator {
    fn evaluate(&self, formula: &str, note: &AnnotatedNote<'_>) -> FrontMatterValue {
        match self.try_evaluate(formula, note) {
            Ok(Literal::Number(n)) => FrontMatterValue::Number(n),
            Ok(Literal::Text(s)) => FrontMatterValue::String(s),
            Err(FormulaError::DivisionByZero) => {
                log::warn!("division by zero in formula `{formula}` for {}", note.note().id);
                FrontMatterValue::String(self.division_by_zero.clone())
            }
            Err(error) => {
                EvalFailure::EvaluationFailure(format!("`{formula}` ({error})")).log();
                FrontMatterValue::String(formula.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{FileStats, FrontMatter, Note};

    fn eval(formula: &str, note: &Note) -> FrontMatterValue {
        RestrictedFormulaEvaluator::default().evaluate(formula, &AnnotatedNote::new(note))
    }

    #[test]
    fn concatenates_with_title() {
        let note = Note::new("Alpha.md");
        assert_eq!(eval(r#""Note: " + file.name"#, &note), FrontMatterValue::from("Note: Alpha"));
    }

    #[test]
    fn arithmetic() {
        let note = Note::new("a.md")
            .with_front_matter(FrontMatter::new().with("price", 10i64).with("qty", 3i64))
            .with_file_stats(FileStats {
                size: Some(2048),
                ..FileStats::default()
            });
        assert_eq!(eval("2 * (3 + 1)", &note), FrontMatterValue::Number(8.0));
        assert_eq!(eval("price * qty", &note), FrontMatterValue::Number(30.0));
        assert_eq!(eval("file.size / 1024", &note), FrontMatterValue::Number(2.0));
    }

    #[test]
    fn unsupported_formulas_are_returned_verbatim() {
        let note = Note::new("a.md").with_front_matter(FrontMatter::new().with("label", "x"));
        assert_eq!(eval("foo(bar)", &note), FrontMatterValue::from("foo(bar)"));
        assert_eq!(eval("label * 2", &note), FrontMatterValue::from("label * 2"));
        assert_eq!(eval("missing + 1", &note), FrontMatterValue::from("missing + 1"));
    }

    #[test]
    fn division_by_zero_yields_configured_value() {
        let note = Note::new("a.md");
        assert_eq!(eval("1 / 0", &note), FrontMatterValue::from("#DIV/0!"));

        let config = EngineConfig {
            division_by_zero: "n/a".into(),
            ..EngineConfig::v0()
        };
        let evaluator = RestrictedFormulaEvaluator::new(&config);
        assert_eq!(
            evaluator.evaluate("4 / (2 - 2)", &AnnotatedNote::new(&note)),
            FrontMatterValue::from("n/a")
        );
    }

    #[test]
    fn overlong_formulas_are_not_evaluated() {
        let config = EngineConfig {
            max_formula_length: 8,
            ..EngineConfig::v0()
        };
        let note = Note::new("a.md");
        let evaluator = RestrictedFormulaEvaluator::new(&config);
        let formula = "1 + 1 + 1 + 1";
        assert_eq!(
            evaluator.evaluate(formula, &AnnotatedNote::new(&note)),
            FrontMatterValue::from(formula)
        );
    }
}
