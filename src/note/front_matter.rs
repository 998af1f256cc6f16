use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key under which formula results live inside a note's front matter.
pub const COMPUTED_KEY: &str = "computed";

/// A single front matter value.
///
/// Variant order matters for untagged deserialization: a string that is a
/// valid RFC 3339 timestamp becomes `Date`, anything else stays `String`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontMatterValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    String(String),
    List(Vec<FrontMatterValue>),
    Map(IndexMap<String, FrontMatterValue>),
}

impl FrontMatterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FrontMatterValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontMatterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value. Strings are accepted when they parse as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FrontMatterValue::Number(n) => Some(*n),
            FrontMatterValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FrontMatterValue::Bool(b) => Some(*b),
            FrontMatterValue::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Date view of the value. Strings are accepted when [`parse_date`] accepts them.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FrontMatterValue::Date(d) => Some(*d),
            FrontMatterValue::String(s) => parse_date(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FrontMatterValue]> {
        match self {
            FrontMatterValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, FrontMatterValue>> {
        match self {
            FrontMatterValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// JavaScript-like truthiness, used for flags such as `starred` and `pinned`.
    pub fn is_truthy(&self) -> bool {
        match self {
            FrontMatterValue::Null => false,
            FrontMatterValue::Bool(b) => *b,
            FrontMatterValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FrontMatterValue::String(s) => !s.is_empty(),
            FrontMatterValue::Date(_) | FrontMatterValue::List(_) | FrontMatterValue::Map(_) => true,
        }
    }

    /// Plain text rendering used for string comparison and sorting.
    pub fn to_text(&self) -> String {
        match self {
            FrontMatterValue::Null => String::new(),
            FrontMatterValue::Bool(b) => b.to_string(),
            FrontMatterValue::Number(n) => format_number(*n),
            FrontMatterValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            FrontMatterValue::String(s) => s.clone(),
            FrontMatterValue::List(items) => items
                .iter()
                .map(FrontMatterValue::to_text)
                .collect::<Vec<_>>()
                .join(", "),
            FrontMatterValue::Map(map) => serde_json::to_string(map).unwrap_or_default(),
        }
    }
}

/// Integers print without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Parse an ISO-8601 date or date-time.
///
/// Accepts RFC 3339 timestamps, naive date-times (read as UTC) and bare
/// `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<&str> for FrontMatterValue {
    fn from(value: &str) -> Self {
        FrontMatterValue::String(value.to_string())
    }
}

impl From<String> for FrontMatterValue {
    fn from(value: String) -> Self {
        FrontMatterValue::String(value)
    }
}

impl From<f64> for FrontMatterValue {
    fn from(value: f64) -> Self {
        FrontMatterValue::Number(value)
    }
}

impl From<i64> for FrontMatterValue {
    fn from(value: i64) -> Self {
        FrontMatterValue::Number(value as f64)
    }
}

impl From<bool> for FrontMatterValue {
    fn from(value: bool) -> Self {
        FrontMatterValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FrontMatterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FrontMatterValue::Date(value)
    }
}

impl<T: Into<FrontMatterValue>> From<Vec<T>> for FrontMatterValue {
    fn from(values: Vec<T>) -> Self {
        FrontMatterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Front matter keys and values, in authored order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrontMatter {
    inner: IndexMap<String, FrontMatterValue>,
}

impl FrontMatter {
    pub fn new() -> Self {
        FrontMatter {
            inner: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FrontMatterValue>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FrontMatterValue>) -> Self {
        self.insert(key, value);
        self
    }

    // Keys present in `other` win; existing keys keep their position
    pub fn merge(&mut self, other: FrontMatter) {
        for (k, v) in other.inner {
            self.inner.insert(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FrontMatterValue> {
        self.inner.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FrontMatterValue)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The nested `computed` map, if the note carries one.
    pub fn computed(&self) -> Option<&IndexMap<String, FrontMatterValue>> {
        self.inner.get(COMPUTED_KEY).and_then(FrontMatterValue::as_map)
    }

    /// Tags normalized to a list: a scalar becomes a one-element list, a
    /// leading `#` is stripped, empty entries are dropped.
    pub fn tags(&self) -> Vec<String> {
        let raw: Vec<String> = match self.inner.get("tags") {
            None | Some(FrontMatterValue::Null) => Vec::new(),
            Some(FrontMatterValue::List(items)) => items.iter().map(FrontMatterValue::to_text).collect(),
            Some(other) => vec![other.to_text()],
        };

        raw.iter()
            .map(|tag| normalize_tag(tag))
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn keys_keep_authored_order() {
        let front_matter: FrontMatter = serde_yaml::from_str("zeta: 1\nalpha: 2\nmid: {b: 1, a: 2}\n").unwrap();
        let keys: Vec<_> = front_matter.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&front_matter).unwrap(),
            r#"{"zeta":1.0,"alpha":2.0,"mid":{"b":1.0,"a":2.0}}"#
        );
    }

    #[test]
    fn parse_date_accepts_iso_forms() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-01-05"), Some(midnight));
        assert_eq!(
            parse_date("2024-01-05T23:59:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-01-05T10:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-01-05 10:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap())
        );
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn number_formatting_drops_integral_fraction() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn tags_are_normalized_to_a_list() {
        let fm = FrontMatter::new().with("tags", vec!["#project", "urgent", ""]);
        assert_eq!(fm.tags(), vec!["project".to_string(), "urgent".to_string()]);

        let single = FrontMatter::new().with("tags", "solo");
        assert_eq!(single.tags(), vec!["solo".to_string()]);

        assert!(FrontMatter::new().tags().is_empty());
    }

    #[test]
    fn untagged_yaml_values() {
        let fm: FrontMatter = serde_yaml::from_str(
            "title: Alpha\nrating: 4\ndone: true\nwhen: 2024-01-05T10:00:00Z\nday: 2024-01-05\nnothing:\ntags: [a, b]\n",
        )
        .unwrap();

        assert_eq!(fm.get("title"), Some(&FrontMatterValue::String("Alpha".into())));
        assert_eq!(fm.get("rating"), Some(&FrontMatterValue::Number(4.0)));
        assert_eq!(fm.get("done"), Some(&FrontMatterValue::Bool(true)));
        assert!(matches!(fm.get("when"), Some(FrontMatterValue::Date(_))));
        assert_eq!(fm.get("day").and_then(FrontMatterValue::as_date), parse_date("2024-01-05"));
        assert_eq!(fm.get("nothing"), Some(&FrontMatterValue::Null));
        assert_eq!(fm.tags(), vec!["a".to_string(), "b".to_string()]);
    }
}
