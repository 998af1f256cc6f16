//! String filter expressions.
//!
//! Recognized forms, tried in this order (first match wins):
//!
//! ```text
//! file.hasTag("tag"[, "tag"...])
//! file.inFolder("folder")
//! file.name   (==|!=|contains|startsWith|endsWith) "value"
//! file.path   (==|!=|contains|startsWith|endsWith) "value"
//! file.size   (==|!=|>|>=|<|<=) N
//! file.(mtime|ctime) (==|!=|>|>=|<|<=|before|after|on) "ISO-8601-date"
//! file.starred (==|!=) (true|false)
//! ```
//!
//! A recognized expression is lowered to a [`KeyedCondition`] and handed to
//! the condition evaluator. Anything else evaluates to `false`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::condition::evaluate_condition;
use super::{KeyedCondition, Operator, OperatorMap};
use crate::error::EvalFailure;
use crate::note::{AnnotatedNote, FrontMatterValue};

const QUOTED: &str = r#""((?:[^"\\]|\\.)*)""#;

// `Regex` carries no match position between calls, so shared statics are safe.
static HAS_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^file\.hasTag\((.*)\)$").expect("valid hasTag pattern"));
static TAG_ARGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\s*{QUOTED}\s*(?:,\s*{QUOTED}\s*)*$")).expect("valid argument list pattern")
});
static QUOTED_ARG: Lazy<Regex> = Lazy::new(|| Regex::new(QUOTED).expect("valid string literal pattern"));
static IN_FOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^file\.inFolder\(\s*{QUOTED}\s*\)$")).expect("valid inFolder pattern")
});
static TEXT_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^file\.(name|path)\s*(==|!=|contains|startsWith|endsWith)\s*{QUOTED}$"
    ))
    .expect("valid text comparison pattern")
});
static SIZE_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^file\.size\s*(==|!=|>=|<=|>|<)\s*(-?\d+(?:\.\d+)?)$").expect("valid size pattern")
});
static DATE_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^file\.(mtime|ctime)\s*(==|!=|>=|<=|>|<|before|after|on)\s*{QUOTED}$"
    ))
    .expect("valid date pattern")
});
static STARRED_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^file\.starred\s*(==|!=)\s*(true|false)$").expect("valid starred pattern")
});

/// Evaluate a string filter against a note. Unrecognized text is `false`.
pub fn evaluate_expression(text: &str, note: &AnnotatedNote<'_>) -> bool {
    match parse_expression(text) {
        Ok(condition) => evaluate_condition(&condition, note),
        Err(failure) => {
            failure.log();
            false
        }
    }
}

/// Lower a string filter to the keyed condition it denotes.
pub fn parse_expression(text: &str) -> Result<KeyedCondition, EvalFailure> {
    let text = text.trim();
    let unrecognized = || EvalFailure::ParseFailure(text.to_string());

    if let Some(caps) = HAS_TAG.captures(text) {
        let args = &caps[1];
        if !TAG_ARGS.is_match(args) {
            return Err(unrecognized());
        }
        let mut tags: Vec<FrontMatterValue> = QUOTED_ARG
            .captures_iter(args)
            .map(|c| FrontMatterValue::String(unescape(&c[1])))
            .collect();
        let value = if tags.len() == 1 {
            tags.remove(0)
        } else {
            FrontMatterValue::List(tags)
        };
        return Ok(KeyedCondition::equals("file.hasTag", value));
    }

    if let Some(caps) = IN_FOLDER.captures(text) {
        return Ok(KeyedCondition::equals("file.inFolder", unescape(&caps[1])));
    }

    if let Some(caps) = TEXT_COMPARISON.captures(text) {
        let op = parse_operator(&caps[2]).ok_or_else(unrecognized)?;
        return Ok(comparison(&format!("file.{}", &caps[1]), op, unescape(&caps[3])));
    }

    if let Some(caps) = SIZE_COMPARISON.captures(text) {
        let op = parse_operator(&caps[1]).ok_or_else(unrecognized)?;
        let size: f64 = caps[2].parse().map_err(|_| unrecognized())?;
        return Ok(comparison("file.size", op, size));
    }

    if let Some(caps) = DATE_COMPARISON.captures(text) {
        let op = parse_operator(&caps[2]).ok_or_else(unrecognized)?;
        return Ok(comparison(&format!("file.{}", &caps[1]), op, unescape(&caps[3])));
    }

    if let Some(caps) = STARRED_COMPARISON.captures(text) {
        let op = parse_operator(&caps[1]).ok_or_else(unrecognized)?;
        return Ok(comparison("file.starred", op, &caps[2] == "true"));
    }

    Err(unrecognized())
}

fn parse_operator(token: &str) -> Option<Operator> {
    token.parse::<Operator>().ok()
}

fn comparison(property: &str, op: Operator, value: impl Into<FrontMatterValue>) -> KeyedCondition {
    KeyedCondition::with_operators(property, OperatorMap::new().with(op, value))
}

fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
