//! Keyed condition evaluation.
//!
//! A condition is dispatched on its property to one comparator family:
//!
//! | Property | Comparator |
//! |---|---|
//! | `file.hasTag`, `file.tag`, `file.tags` | tag membership |
//! | `file.name`, `file.path`, `file.folder` | string |
//! | `file.size` | number |
//! | `file.mtime`, `file.ctime` | date |
//! | `file.inFolder` | folder prefix |
//! | `file.starred` | boolean (`starred` or `pinned`) |
//! | anything else | front matter value |
//!
//! Every comparator is total. Failures surface as [`EvalFailure`] and are
//! absorbed into `false` for the one condition that raised them.

use chrono::{DateTime, Utc};
use regex::RegexBuilder;

use super::property::FileProperty;
use super::{ConditionValue, KeyedCondition, Operator, OperatorMap};
use crate::error::EvalFailure;
use crate::note::front_matter::normalize_tag;
use crate::note::{parse_date, AnnotatedNote, FrontMatterValue};

pub fn evaluate_condition(condition: &KeyedCondition, note: &AnnotatedNote<'_>) -> bool {
    EvalFailure::absorb(check_condition(condition, note))
}

pub(crate) fn check_condition(
    condition: &KeyedCondition,
    note: &AnnotatedNote<'_>,
) -> Result<bool, EvalFailure> {
    let property = condition.property.as_str();
    let value = &condition.value;
    let source = note.note();

    if let ConditionValue::Operators(ops) = value {
        if let Some(name) = ops.unrecognized().first() {
            return Err(EvalFailure::type_mismatch(property, format!("unknown operator `{name}`")));
        }
    }

    match FileProperty::classify(property) {
        Some(FileProperty::Tags) => compare_tags(property, &source.tags(), value),
        Some(FileProperty::Name) => compare_string(property, &source.title, value),
        Some(FileProperty::Path) => compare_string(property, &source.relative_path, value),
        Some(FileProperty::Folder) => compare_string(property, &source.folder_path, value),
        Some(FileProperty::Size) => {
            compare_number(property, source.file_stats.size.map(|s| s as f64), value)
        }
        Some(FileProperty::MTime) => compare_date(property, source.file_stats.mtime, value),
        Some(FileProperty::CTime) => compare_date(property, source.file_stats.ctime, value),
        Some(FileProperty::InFolder) => in_folder(property, &source.folder_path, value),
        Some(FileProperty::Starred) => compare_bool(property, Some(source.is_starred()), value),
        None => compare_front_matter(property, note.lookup(property), value),
    }
}

fn all_pass(
    operators: &OperatorMap,
    mut check: impl FnMut(Operator, &FrontMatterValue) -> Result<bool, EvalFailure>,
) -> Result<bool, EvalFailure> {
    for (op, target) in operators.iter() {
        if !check(op, target)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn unsupported(property: &str, op: Operator, family: &str) -> EvalFailure {
    EvalFailure::type_mismatch(property, format!("operator `{op}` does not apply to {family}"))
}

// ---------------------------------------------------------------------------
// String
// ---------------------------------------------------------------------------

fn compare_string(property: &str, actual: &str, expected: &ConditionValue) -> Result<bool, EvalFailure> {
    match expected {
        ConditionValue::Scalar(FrontMatterValue::List(items)) => {
            Ok(items.iter().any(|item| item.to_text() == actual))
        }
        ConditionValue::Scalar(FrontMatterValue::Null) => Ok(false),
        ConditionValue::Scalar(target) => Ok(actual == target.to_text()),
        ConditionValue::Operators(ops) => {
            all_pass(ops, |op, target| string_op(property, actual, op, &target.to_text()))
        }
    }
}

fn string_op(property: &str, actual: &str, op: Operator, target: &str) -> Result<bool, EvalFailure> {
    match op {
        Operator::Contains => Ok(actual.to_lowercase().contains(&target.to_lowercase())),
        Operator::StartsWith => Ok(actual.to_lowercase().starts_with(&target.to_lowercase())),
        Operator::EndsWith => Ok(actual.to_lowercase().ends_with(&target.to_lowercase())),
        Operator::Matches => {
            // Compiled per call: no match state outlives one evaluation.
            let regex = RegexBuilder::new(target)
                .size_limit(1 << 20)
                .build()
                .map_err(|e| EvalFailure::type_mismatch(property, format!("invalid pattern: {e}")))?;
            Ok(regex.is_match(actual))
        }
        Operator::Eq => Ok(actual == target),
        Operator::Ne => Ok(actual != target),
        other => Err(unsupported(property, other, "text")),
    }
}

// ---------------------------------------------------------------------------
// Number
// ---------------------------------------------------------------------------

fn compare_number(
    property: &str,
    actual: Option<f64>,
    expected: &ConditionValue,
) -> Result<bool, EvalFailure> {
    let actual = actual.ok_or_else(|| EvalFailure::MissingData(property.to_string()))?;

    match expected {
        ConditionValue::Scalar(target) => match target.as_number() {
            Some(n) => Ok(actual == n),
            None => Err(EvalFailure::type_mismatch(property, "expected a number")),
        },
        ConditionValue::Operators(ops) => all_pass(ops, |op, target| number_op(property, actual, op, target)),
    }
}

/// A target that does not parse as a number is skipped, not failed.
fn number_op(property: &str, actual: f64, op: Operator, target: &FrontMatterValue) -> Result<bool, EvalFailure> {
    let Some(target) = target.as_number() else {
        log::trace!("skipping `{property} {op}`: comparison value is not numeric");
        return Ok(true);
    };

    match op {
        Operator::Eq => Ok(actual == target),
        Operator::Ne => Ok(actual != target),
        Operator::Gt => Ok(actual > target),
        Operator::Ge => Ok(actual >= target),
        Operator::Lt => Ok(actual < target),
        Operator::Le => Ok(actual <= target),
        other => Err(unsupported(property, other, "numbers")),
    }
}

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

fn compare_date(
    property: &str,
    actual: Option<DateTime<Utc>>,
    expected: &ConditionValue,
) -> Result<bool, EvalFailure> {
    let actual = actual.ok_or_else(|| EvalFailure::MissingData(property.to_string()))?;

    match expected {
        ConditionValue::Scalar(target) => date_op(property, actual, Operator::On, target),
        ConditionValue::Operators(ops) => all_pass(ops, |op, target| date_op(property, actual, op, target)),
    }
}

fn date_op(
    property: &str,
    actual: DateTime<Utc>,
    op: Operator,
    target: &FrontMatterValue,
) -> Result<bool, EvalFailure> {
    let target = target
        .as_date()
        .ok_or_else(|| EvalFailure::type_mismatch(property, format!("unparseable date `{}`", target.to_text())))?;

    match op {
        Operator::Eq | Operator::On => Ok(same_day(actual, target)),
        Operator::Ne => Ok(!same_day(actual, target)),
        Operator::Gt | Operator::After => Ok(actual > target),
        Operator::Ge => Ok(actual >= target),
        Operator::Lt | Operator::Before => Ok(actual < target),
        Operator::Le => Ok(actual <= target),
        other => Err(unsupported(property, other, "dates")),
    }
}

/// Same UTC calendar day, regardless of time of day.
pub(crate) fn same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

// ---------------------------------------------------------------------------
// Boolean
// ---------------------------------------------------------------------------

fn compare_bool(property: &str, actual: Option<bool>, expected: &ConditionValue) -> Result<bool, EvalFailure> {
    let actual = actual.ok_or_else(|| EvalFailure::MissingData(property.to_string()))?;

    match expected {
        ConditionValue::Scalar(target) => bool_op(property, actual, Operator::Eq, target),
        ConditionValue::Operators(ops) => all_pass(ops, |op, target| bool_op(property, actual, op, target)),
    }
}

fn bool_op(property: &str, actual: bool, op: Operator, target: &FrontMatterValue) -> Result<bool, EvalFailure> {
    let target = target
        .as_bool()
        .ok_or_else(|| EvalFailure::type_mismatch(property, "expected true or false"))?;

    match op {
        Operator::Eq => Ok(actual == target),
        Operator::Ne => Ok(actual != target),
        other => Err(unsupported(property, other, "booleans")),
    }
}

// ---------------------------------------------------------------------------
// Tags and folders
// ---------------------------------------------------------------------------

fn targets(value: &FrontMatterValue) -> Vec<String> {
    match value {
        FrontMatterValue::List(items) => items.iter().map(FrontMatterValue::to_text).collect(),
        other => vec![other.to_text()],
    }
}

fn compare_tags(property: &str, tags: &[String], expected: &ConditionValue) -> Result<bool, EvalFailure> {
    let has_any = |value: &FrontMatterValue| {
        targets(value)
            .iter()
            .map(|t| normalize_tag(t))
            .any(|t| tags.contains(&t))
    };

    match expected {
        ConditionValue::Scalar(FrontMatterValue::Null) => Ok(tags.is_empty()),
        ConditionValue::Scalar(target) => Ok(has_any(target)),
        ConditionValue::Operators(ops) => all_pass(ops, |op, target| match op {
            Operator::Contains | Operator::Eq => Ok(has_any(target)),
            Operator::Ne => Ok(!has_any(target)),
            other => Err(unsupported(property, other, "tags")),
        }),
    }
}

fn in_folder(property: &str, folder: &str, expected: &ConditionValue) -> Result<bool, EvalFailure> {
    let folder = folder.trim_matches('/');
    let inside = |value: &FrontMatterValue| {
        targets(value).iter().any(|target| {
            let target = target.replace('\\', "/");
            let target = target.trim().trim_matches('/');
            target.is_empty() || folder == target || folder.starts_with(&format!("{target}/"))
        })
    };

    match expected {
        ConditionValue::Scalar(FrontMatterValue::Null) => Err(EvalFailure::type_mismatch(property, "expected a folder")),
        ConditionValue::Scalar(target) => Ok(inside(target)),
        ConditionValue::Operators(ops) => all_pass(ops, |op, target| match op {
            Operator::Eq => Ok(inside(target)),
            Operator::Ne => Ok(!inside(target)),
            other => Err(unsupported(property, other, "folders")),
        }),
    }
}

// ---------------------------------------------------------------------------
// Front matter
// ---------------------------------------------------------------------------

fn compare_front_matter(
    property: &str,
    actual: Option<&FrontMatterValue>,
    expected: &ConditionValue,
) -> Result<bool, EvalFailure> {
    let actual = actual.filter(|v| !v.is_null());

    match expected {
        // Absent matches only an explicit null
        ConditionValue::Scalar(target) => match actual {
            None => Ok(target.is_null()),
            Some(_) if target.is_null() => Ok(false),
            Some(actual) => Ok(values_equal(actual, target)),
        },
        ConditionValue::Operators(ops) => {
            let actual = actual.ok_or_else(|| EvalFailure::MissingData(property.to_string()))?;
            all_pass(ops, |op, target| typed_op(property, actual, op, target))
        }
    }
}

/// Pick the comparator from the shape of the note's value.
fn typed_op(
    property: &str,
    actual: &FrontMatterValue,
    op: Operator,
    target: &FrontMatterValue,
) -> Result<bool, EvalFailure> {
    match actual {
        FrontMatterValue::Number(n) => number_op(property, *n, op, target),
        FrontMatterValue::Date(d) => date_op(property, *d, op, target),
        FrontMatterValue::Bool(b) => bool_op(property, *b, op, target),
        FrontMatterValue::List(items) => {
            let wanted = targets(target);
            let present = items
                .iter()
                .map(FrontMatterValue::to_text)
                .any(|item| wanted.contains(&item));
            match op {
                Operator::Contains | Operator::Eq => Ok(present),
                Operator::Ne => Ok(!present),
                other => Err(unsupported(property, other, "lists")),
            }
        }
        FrontMatterValue::String(s) => match op {
            Operator::Before | Operator::After | Operator::On => {
                let date = parse_date(s)
                    .ok_or_else(|| EvalFailure::type_mismatch(property, format!("`{s}` is not a date")))?;
                date_op(property, date, op, target)
            }
            Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le => {
                if let (Some(a), Some(_)) = (actual.as_number(), target.as_number()) {
                    number_op(property, a, op, target)
                } else if let (Some(a), Some(_)) = (parse_date(s), target.as_date()) {
                    date_op(property, a, op, target)
                } else {
                    Err(EvalFailure::type_mismatch(property, "ordering needs numbers or dates"))
                }
            }
            _ => string_op(property, s, op, &target.to_text()),
        },
        FrontMatterValue::Null => Err(EvalFailure::MissingData(property.to_string())),
        FrontMatterValue::Map(_) => Err(EvalFailure::type_mismatch(property, "cannot compare a mapping")),
    }
}

fn values_equal(a: &FrontMatterValue, b: &FrontMatterValue) -> bool {
    match (a, b) {
        (FrontMatterValue::Date(x), FrontMatterValue::String(s))
        | (FrontMatterValue::String(s), FrontMatterValue::Date(x)) => parse_date(s) == Some(*x),
        (FrontMatterValue::List(xs), FrontMatterValue::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{FileStats, FrontMatter, Note};
    use chrono::TimeZone;

    fn sample() -> Note {
        Note::new("Projects/Work/Alpha.md")
            .with_front_matter(
                FrontMatter::new()
                    .with("status", "open")
                    .with("rating", 4i64)
                    .with("due", "2024-03-01")
                    .with("done", false)
                    .with("aliases", vec!["first", "primary"]),
            )
            .with_file_stats(FileStats {
                size: Some(2048),
                mtime: Some(Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 0).unwrap()),
                ctime: None,
            })
    }

    fn check(note: &Note, condition: KeyedCondition) -> bool {
        evaluate_condition(&condition, &AnnotatedNote::new(note))
    }

    fn ops(property: &str, op: Operator, value: impl Into<FrontMatterValue>) -> KeyedCondition {
        KeyedCondition::with_operators(property, OperatorMap::new().with(op, value))
    }

    #[test]
    fn unknown_operator_fails_only_its_condition() {
        let note = sample();
        let bad = KeyedCondition::with_operators(
            "status",
            OperatorMap::new().with(Operator::Eq, "open").with_unrecognized("like"),
        );
        assert!(!check(&note, bad.clone()));
        assert!(crate::predicate::Predicate::not(crate::predicate::Predicate::keyed(bad)).matches(&note));
        assert!(check(&note, ops("status", Operator::Eq, "open")));
    }

    #[test]
    fn string_operators_are_case_insensitive() {
        let note = sample();
        assert!(check(&note, ops("file.name", Operator::Contains, "LPH")));
        assert!(check(&note, ops("file.name", Operator::StartsWith, "al")));
        assert!(check(&note, ops("file.path", Operator::EndsWith, "ALPHA.MD")));
        assert!(!check(&note, ops("file.name", Operator::Eq, "alpha")));
        assert!(check(&note, KeyedCondition::equals("file.name", "Alpha")));
    }

    #[test]
    fn invalid_regex_is_false() {
        let note = sample();
        assert!(check(&note, ops("file.name", Operator::Matches, "^Al.*a$")));
        assert!(!check(&note, ops("file.name", Operator::Matches, "(unclosed")));
    }

    #[test]
    fn number_skips_non_numeric_targets() {
        let note = sample();
        assert!(check(&note, ops("file.size", Operator::Gt, 1000i64)));
        assert!(!check(&note, ops("file.size", Operator::Lt, 1000i64)));
        assert!(check(&note, ops("file.size", Operator::Gt, "lots")));
        assert!(!check(&note, ops("file.ctime", Operator::After, "2020-01-01")));
    }

    #[test]
    fn missing_size_is_false() {
        let note = Note::new("a.md");
        assert!(!check(&note, ops("file.size", Operator::Gt, "lots")));
    }

    #[test]
    fn date_on_ignores_time_of_day() {
        let note = sample();
        assert!(check(&note, ops("file.mtime", Operator::On, "2024-01-05")));
        assert!(!check(&note, ops("file.mtime", Operator::On, "2024-01-06")));
        assert!(check(&note, ops("file.mtime", Operator::Ne, "2024-01-06")));
        assert!(check(&note, ops("file.mtime", Operator::After, "2024-01-05")));
        assert!(check(&note, ops("file.mtime", Operator::Before, "2024-01-06")));
        assert!(!check(&note, ops("file.mtime", Operator::Before, "not a date")));
    }

    #[test]
    fn multiple_operators_are_conjoined() {
        let note = sample();
        let range = OperatorMap::new()
            .with(Operator::Ge, "2024-01-01")
            .with(Operator::Lt, "2024-02-01");
        assert!(check(&note, KeyedCondition::with_operators("file.mtime", range)));

        let closed = OperatorMap::new()
            .with(Operator::Ge, "2024-01-01")
            .with(Operator::Lt, "2024-01-02");
        assert!(!check(&note, KeyedCondition::with_operators("file.mtime", closed)));
    }

    #[test]
    fn in_folder_is_a_prefix_on_segments() {
        let note = sample();
        assert!(check(&note, KeyedCondition::equals("file.inFolder", "Projects")));
        assert!(check(&note, KeyedCondition::equals("file.inFolder", "Projects/Work/")));
        assert!(!check(&note, KeyedCondition::equals("file.inFolder", "Proj")));
        assert!(!check(&note, KeyedCondition::equals("file.inFolder", "Archive")));
    }

    #[test]
    fn starred_compares_booleans() {
        let note = sample();
        assert!(check(&note, KeyedCondition::equals("file.starred", false)));
        assert!(check(&note, ops("file.starred", Operator::Ne, true)));
        assert!(!check(&note, ops("file.starred", Operator::Gt, true)));
    }

    #[test]
    fn front_matter_equality_and_absence() {
        let note = sample();
        assert!(check(&note, KeyedCondition::equals("status", "open")));
        assert!(check(&note, KeyedCondition::equals("frontmatter.status", "open")));
        assert!(!check(&note, KeyedCondition::equals("status", "closed")));
        assert!(!check(&note, KeyedCondition::equals("owner", "me")));
        assert!(check(&note, KeyedCondition::equals("owner", FrontMatterValue::Null)));
        assert!(!check(&note, KeyedCondition::equals("status", FrontMatterValue::Null)));
    }

    #[test]
    fn front_matter_operator_maps_follow_value_type() {
        let note = sample();
        assert!(check(&note, ops("rating", Operator::Ge, 4i64)));
        assert!(check(&note, ops("due", Operator::Before, "2024-04-01")));
        assert!(check(&note, ops("due", Operator::Gt, "2024-02-01")));
        assert!(check(&note, ops("status", Operator::StartsWith, "OP")));
        assert!(check(&note, ops("aliases", Operator::Contains, "primary")));
        assert!(!check(&note, ops("status", Operator::Gt, 3i64)));
        assert!(!check(&note, ops("owner", Operator::Eq, "me")));
    }

    #[test]
    fn tags_membership() {
        let note = Note::new("a.md").with_front_matter(FrontMatter::new().with("tags", vec!["project", "urgent"]));
        assert!(check(&note, KeyedCondition::equals("file.hasTag", "project")));
        assert!(check(&note, KeyedCondition::equals("file.hasTag", "#urgent")));
        assert!(!check(&note, KeyedCondition::equals("file.hasTag", "archived")));
        assert!(check(&note, KeyedCondition::equals("file.tags", vec!["archived", "urgent"])));
        assert!(check(&note, ops("file.tags", Operator::Ne, "archived")));
    }

    #[test]
    fn same_day_uses_calendar_date() {
        let late = Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 1, 5, 0, 1, 0).unwrap();
        assert!(same_day(late, early));
    }
}
