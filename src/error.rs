//! Evaluation failures.
//!
//! Nothing in query evaluation is fatal. Comparators return
//! `Result<bool, EvalFailure>` internally and the failure is absorbed at the
//! smallest scope (one condition, one formula) by [`EvalFailure::absorb`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalFailure {
    /// A string filter matched no known pattern.
    #[error("unrecognized filter expression: {0}")]
    ParseFailure(String),

    /// A formula fits neither restricted grammar, or arithmetic is malformed.
    #[error("formula not evaluated: {0}")]
    EvaluationFailure(String),

    /// A referenced file statistic or front matter value is absent.
    #[error("missing value for `{0}`")]
    MissingData(String),

    /// A comparator received a value of the wrong shape.
    #[error("type mismatch on `{property}`: {detail}")]
    TypeMismatch { property: String, detail: String },
}

impl EvalFailure {
    pub fn type_mismatch(property: &str, detail: impl Into<String>) -> Self {
        EvalFailure::TypeMismatch {
            property: property.to_string(),
            detail: detail.into(),
        }
    }

    /// Log at the level the failure class warrants. Missing data is the
    /// common case and stays silent.
    pub fn log(&self) {
        match self {
            EvalFailure::ParseFailure(_) | EvalFailure::EvaluationFailure(_) => {
                log::warn!("{self}")
            }
            EvalFailure::TypeMismatch { .. } => log::debug!("{self}"),
            EvalFailure::MissingData(_) => {}
        }
    }

    /// Resolve a condition outcome: failures become `false`.
    pub fn absorb(result: Result<bool, EvalFailure>) -> bool {
        match result {
            Ok(matched) => matched,
            Err(failure) => {
                failure.log();
                false
            }
        }
    }
}
