use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::base::{Direction, SortRule};
use crate::note::{AnnotatedNote, FrontMatterValue};
use crate::predicate::FileProperty;

/// A property resolved for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Missing,
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Number(_) => 1,
            SortValue::Date(_) => 2,
            SortValue::Text(_) => 3,
        }
    }
}

pub fn sort_value(note: &AnnotatedNote<'_>, property: &str) -> SortValue {
    let source = note.note();
    match FileProperty::classify(property) {
        Some(FileProperty::Name) => SortValue::Text(source.title.clone()),
        Some(FileProperty::Path) => SortValue::Text(source.relative_path.clone()),
        Some(FileProperty::Folder) => SortValue::Text(source.folder_path.clone()),
        Some(FileProperty::MTime) => source.file_stats.mtime.map_or(SortValue::Missing, SortValue::Date),
        Some(FileProperty::CTime) => source.file_stats.ctime.map_or(SortValue::Missing, SortValue::Date),
        Some(FileProperty::Size) => source
            .file_stats
            .size
            .map_or(SortValue::Missing, |size| SortValue::Number(size as f64)),
        Some(FileProperty::Tags) => SortValue::Text(source.tags().join(", ")),
        Some(FileProperty::Starred) => SortValue::Text(source.is_starred().to_string()),
        Some(FileProperty::InFolder) => SortValue::Missing,
        None => match note.lookup(property) {
            None | Some(FrontMatterValue::Null) => SortValue::Missing,
            Some(FrontMatterValue::Number(n)) => SortValue::Number(*n),
            Some(FrontMatterValue::Date(d)) => SortValue::Date(*d),
            Some(value @ FrontMatterValue::String(_)) => {
                if let Some(n) = value.as_number() {
                    SortValue::Number(n)
                } else if let Some(date) = value.as_date() {
                    SortValue::Date(date)
                } else {
                    SortValue::Text(value.to_text())
                }
            }
            Some(other) => SortValue::Text(other.to_text()),
        },
    }
}

/// Total order over sort values. Values of one kind compare naturally:
/// dates by instant, numbers numerically, text case-insensitively. Mixed
/// kinds order as missing, then numbers, then dates, then text.
pub fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(y),
        (SortValue::Date(x), SortValue::Date(y)) => x.cmp(y),
        (SortValue::Text(x), SortValue::Text(y)) => locale_compare(x, y),
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Case-insensitive first; among case variants lowercase sorts first.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Stable multi-key sort. Rules cascade in order; notes equal under every
/// rule keep their input order.
pub fn sort_notes<'a>(notes: Vec<AnnotatedNote<'a>>, rules: &[SortRule]) -> Vec<AnnotatedNote<'a>> {
    if rules.is_empty() {
        return notes;
    }

    let mut keyed: Vec<(Vec<SortValue>, AnnotatedNote<'a>)> = notes
        .into_iter()
        .map(|note| {
            let keys = rules.iter().map(|rule| sort_value(&note, &rule.property)).collect();
            (keys, note)
        })
        .collect();

    // `sort_by` is stable
    keyed.sort_by(|(a, _), (b, _)| {
        for (index, rule) in rules.iter().enumerate() {
            let ord = compare_values(&a[index], &b[index]);
            if ord != Ordering::Equal {
                return match rule.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                };
            }
        }
        Ordering::Equal
    });

    keyed.into_iter().map(|(_, note)| note).collect()
}
