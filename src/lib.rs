//! Deterministic filter, formula and sort engine for note collections.
//!
//! `bases-core` evaluates a Base (a filter predicate, named formulas and one
//! or more views) over an immutable snapshot of notes and produces ordered,
//! annotated note lists for presentation. All operations are pure and
//! synchronous; file metadata is resolved by the caller beforehand.
//!
//! Evaluation never fails: unrecognized expressions, malformed formulas and
//! missing values degrade locally and are reported through the `log` facade.

pub mod base;
pub mod cache;
pub mod config;
pub mod error;
pub mod formula;
pub mod note;
pub mod predicate;
pub mod selection;
pub mod types;

pub use base::{Base, BaseError, Direction, Formula, SortRule, View, ViewType};
pub use config::EngineConfig;
pub use note::{AnnotatedNote, FileStats, FrontMatter, FrontMatterValue, Note};
pub use predicate::Predicate;
pub use selection::QueryEngine;
