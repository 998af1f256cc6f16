//! Filter predicates.
//!
//! A predicate is parsed once into a closed set of variants and evaluated by
//! one exhaustive match. Structured filters arrive as YAML/JSON:
//!
//! ```text
//! { and: [P...] } | { or: [P...] } | { not: P } | { not: [P...] }
//! | { <property>: <scalar> | { <operator>: <value>, ... } }
//! | "string expression" | [P...]
//! ```
//!
//! An object with several entries and a bare list are both conjunctions.
//! `not` over a list holds when none of the children match.

pub mod condition;
pub mod evaluate;
pub mod expression;
pub mod property;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::note::FrontMatterValue;

pub use condition::evaluate_condition;
pub use evaluate::evaluate;
pub use expression::{evaluate_expression, parse_expression};
pub use property::FileProperty;

/// Maximum nesting depth accepted when parsing a structured predicate.
pub const MAX_PREDICATE_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredicateError {
    #[error("`{0}` expects a list of predicates")]
    ExpectedList(String),
    #[error("Invalid predicate: {0}")]
    InvalidShape(String),
    #[error("Predicate nesting exceeds maximum depth of {MAX_PREDICATE_DEPTH}")]
    TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Before,
    After,
    On,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::Matches => "matches",
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Before => "before",
            Operator::After => "after",
            Operator::On => "on",
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "contains" => Operator::Contains,
            "startsWith" => Operator::StartsWith,
            "endsWith" => Operator::EndsWith,
            "matches" => Operator::Matches,
            "=" | "==" => Operator::Eq,
            "!=" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            "before" => Operator::Before,
            "after" => Operator::After,
            "on" => Operator::On,
            other => return Err(other.to_string()),
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator entries of one keyed condition. All entries must pass.
///
/// Operator names outside the vocabulary are kept aside; a map holding any
/// of them never matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperatorMap {
    entries: Vec<(Operator, FrontMatterValue)>,
    unrecognized: Vec<String>,
}

impl OperatorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, op: Operator, value: impl Into<FrontMatterValue>) -> Self {
        self.entries.push((op, value.into()));
        self
    }

    pub fn with_unrecognized(mut self, name: impl Into<String>) -> Self {
        self.unrecognized.push(name.into());
        self
    }

    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    pub fn iter(&self) -> impl Iterator<Item = (Operator, &FrontMatterValue)> {
        self.entries.iter().map(|(op, value)| (*op, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unrecognized.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Scalar(FrontMatterValue),
    Operators(OperatorMap),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyedCondition {
    pub property: String,
    pub value: ConditionValue,
}

impl KeyedCondition {
    pub fn equals(property: impl Into<String>, value: impl Into<FrontMatterValue>) -> Self {
        Self {
            property: property.into(),
            value: ConditionValue::Scalar(value.into()),
        }
    }

    pub fn with_operators(property: impl Into<String>, operators: OperatorMap) -> Self {
        Self {
            property: property.into(),
            value: ConditionValue::Operators(operators),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    StringExpr(String),
    Keyed(KeyedCondition),
}

impl Predicate {
    pub fn not(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    pub fn expr(text: impl Into<String>) -> Self {
        Predicate::StringExpr(text.into())
    }

    pub fn keyed(condition: KeyedCondition) -> Self {
        Predicate::Keyed(condition)
    }

    /// Parse a structured predicate from a JSON value.
    pub fn from_value(value: &Value) -> Result<Self, PredicateError> {
        parse_predicate(value, 0)
    }
}

fn parse_predicate(value: &Value, depth: usize) -> Result<Predicate, PredicateError> {
    if depth > MAX_PREDICATE_DEPTH {
        return Err(PredicateError::TooDeep);
    }

    match value {
        Value::String(text) => Ok(Predicate::StringExpr(text.clone())),
        Value::Array(items) => Ok(Predicate::And(parse_list(items, depth)?)),
        Value::Object(map) => {
            let mut parts = map
                .iter()
                .map(|(key, value)| parse_entry(key, value, depth))
                .collect::<Result<Vec<_>, _>>()?;
            if parts.len() == 1 {
                Ok(parts.remove(0))
            } else {
                Ok(Predicate::And(parts))
            }
        }
        Value::Null => Err(PredicateError::InvalidShape("null".into())),
        other => Err(PredicateError::InvalidShape(other.to_string())),
    }
}

fn parse_list(items: &[Value], depth: usize) -> Result<Vec<Predicate>, PredicateError> {
    items
        .iter()
        .map(|item| parse_predicate(item, depth + 1))
        .collect()
}

fn parse_entry(key: &str, value: &Value, depth: usize) -> Result<Predicate, PredicateError> {
    match key {
        "and" | "or" => {
            let Value::Array(items) = value else {
                return Err(PredicateError::ExpectedList(key.to_string()));
            };
            let children = parse_list(items, depth)?;
            Ok(if key == "and" {
                Predicate::And(children)
            } else {
                Predicate::Or(children)
            })
        }
        "not" => match value {
            Value::Array(items) => Ok(Predicate::not(Predicate::Or(parse_list(items, depth)?))),
            other => Ok(Predicate::not(parse_predicate(other, depth + 1)?)),
        },
        property => Ok(Predicate::Keyed(KeyedCondition {
            property: property.to_string(),
            value: parse_condition_value(property, value)?,
        })),
    }
}

fn parse_condition_value(property: &str, value: &Value) -> Result<ConditionValue, PredicateError> {
    let Value::Object(map) = value else {
        return Ok(ConditionValue::Scalar(to_front_matter_value(value)?));
    };

    let mut operators = OperatorMap::new();
    for (key, target) in map {
        operators = match key.parse::<Operator>() {
            Ok(op) => operators.with(op, to_front_matter_value(target)?),
            Err(name) => {
                log::warn!("unknown operator `{name}` on `{property}`; the condition will not match");
                operators.with_unrecognized(name)
            }
        };
    }
    Ok(ConditionValue::Operators(operators))
}

fn to_front_matter_value(value: &Value) -> Result<FrontMatterValue, PredicateError> {
    serde_json::from_value(value.clone()).map_err(|e| PredicateError::InvalidShape(e.to_string()))
}

impl<'de> Deserialize<'de> for Predicate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Predicate::from_value(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_logical_nodes() {
        let predicate = Predicate::from_value(&json!({
            "or": [
                "file.hasTag(\"project\")",
                { "not": { "status": "done" } }
            ]
        }))
        .unwrap();

        assert_eq!(
            predicate,
            Predicate::Or(vec![
                Predicate::expr("file.hasTag(\"project\")"),
                Predicate::not(Predicate::keyed(KeyedCondition::equals("status", "done"))),
            ])
        );
    }

    #[test]
    fn parses_operator_maps() {
        let predicate = Predicate::from_value(&json!({ "file.size": { ">": 10, "<=": 100 } })).unwrap();
        let Predicate::Keyed(condition) = predicate else {
            panic!("expected keyed condition");
        };
        let ConditionValue::Operators(ops) = condition.value else {
            panic!("expected operator map");
        };
        let ops: Vec<_> = ops.iter().map(|(op, v)| (op, v.clone())).collect();
        assert_eq!(
            ops,
            vec![
                (Operator::Gt, FrontMatterValue::Number(10.0)),
                (Operator::Le, FrontMatterValue::Number(100.0)),
            ]
        );
    }

    #[test]
    fn multiple_properties_are_conjoined() {
        let predicate = Predicate::from_value(&json!({ "a": 1, "b": 2 })).unwrap();
        assert!(matches!(predicate, Predicate::And(ref parts) if parts.len() == 2));
    }

    #[test]
    fn not_over_list_is_none_of() {
        let predicate = Predicate::from_value(&json!({ "not": ["x", "y"] })).unwrap();
        assert_eq!(
            predicate,
            Predicate::not(Predicate::Or(vec![Predicate::expr("x"), Predicate::expr("y")]))
        );
    }

    #[test]
    fn keeps_unknown_operators_aside() {
        let predicate = Predicate::from_value(&json!({ "status": { "like": "x", "contains": "o" } })).unwrap();
        let Predicate::Keyed(condition) = predicate else {
            panic!("expected keyed condition");
        };
        let ConditionValue::Operators(ops) = condition.value else {
            panic!("expected operator map");
        };
        assert_eq!(ops.unrecognized(), ["like".to_string()]);
        assert_eq!(ops.len(), 1);
        assert!(!ops.is_empty());
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert_eq!(
            Predicate::from_value(&json!({ "and": "x" })).unwrap_err(),
            PredicateError::ExpectedList("and".into())
        );
        assert!(matches!(
            Predicate::from_value(&json!(42)),
            Err(PredicateError::InvalidShape(_))
        ));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut value = json!("x");
        for _ in 0..(MAX_PREDICATE_DEPTH + 2) {
            value = json!({ "not": value });
        }
        assert_eq!(Predicate::from_value(&value).unwrap_err(), PredicateError::TooDeep);
    }

    #[test]
    fn deserializes_from_yaml() {
        let predicate: Predicate = serde_yaml::from_str("and:\n  - file.inFolder(\"Projects\")\n  - status: open\n").unwrap();
        assert_eq!(
            predicate,
            Predicate::And(vec![
                Predicate::expr("file.inFolder(\"Projects\")"),
                Predicate::keyed(KeyedCondition::equals("status", "open")),
            ])
        );
    }
}
