//! Reading a Base from its source document.
//!
//! The document is YAML or JSON, optionally fenced with `---`. Text after the
//! fence is free-form and becomes the description when none is declared.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use super::base::{Base, Formula, SortRule, View, ViewType};
use crate::config::EngineConfig;
use crate::note::{split_fence, FrontMatterError};
use crate::predicate::Predicate;
use crate::types::identifiers::BaseId;

#[derive(Debug, Error)]
pub enum BaseError {
    #[error("Invalid document fence: {0}")]
    Fence(#[from] FrontMatterError),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Formula `{0}` must be a text expression")]
    InvalidFormula(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBase {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    filters: Option<Predicate>,
    views: Vec<RawView>,
    properties: BTreeMap<String, serde_json::Value>,
    formulas: RawFormulas,
}

#[derive(Debug, Deserialize)]
struct RawView {
    #[serde(rename = "type", default)]
    view_type: ViewType,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sort: Vec<SortRule>,
    #[serde(default, alias = "filters")]
    filter: Option<Predicate>,
    #[serde(default)]
    order: Vec<String>,
}

/// `formulas` is either an ordered `name: text` mapping or a list of
/// `{name, formula}` entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFormulas {
    List(Vec<Formula>),
    Map(serde_yaml::Mapping),
}

impl Default for RawFormulas {
    fn default() -> Self {
        RawFormulas::List(Vec::new())
    }
}

impl RawFormulas {
    fn into_formulas(self) -> Result<Vec<Formula>, BaseError> {
        match self {
            RawFormulas::List(list) => Ok(list),
            RawFormulas::Map(mapping) => mapping
                .into_iter()
                .map(|(name, text)| {
                    let name = scalar_text(&name).ok_or_else(|| BaseError::InvalidFormula(format!("{name:?}")))?;
                    let text = scalar_text(&text).ok_or_else(|| BaseError::InvalidFormula(name.clone()))?;
                    Ok(Formula::new(name, text))
                })
                .collect(),
        }
    }
}

/// A blank string filter is no filter at all.
fn present(filter: Option<Predicate>) -> Option<Predicate> {
    filter.filter(|predicate| !matches!(predicate, Predicate::StringExpr(text) if text.trim().is_empty()))
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Base {
    /// Parse a Base document with the default engine configuration.
    pub fn parse(source: &str, text: &str) -> Result<Self, BaseError> {
        Self::parse_with(source, text, &EngineConfig::v0())
    }

    /// Parse a Base document. `source` names where it came from and seeds
    /// the id when the document does not declare one.
    pub fn parse_with(source: &str, text: &str, config: &EngineConfig) -> Result<Self, BaseError> {
        let split = split_fence(text)?;
        let (header, body) = match split.header {
            Some(header) => (header, split.body),
            None => (split.body, ""),
        };

        let raw: RawBase = if header.trim().is_empty() {
            RawBase::default()
        } else if header.trim_start().starts_with('{') {
            serde_json::from_str(header)?
        } else {
            serde_yaml::from_str(header)?
        };

        let id = match raw.id {
            Some(id) => BaseId::new(id),
            None => BaseId::from_source(source),
        };

        let mut base = Base::new(id);
        if let Some(title) = raw.title.filter(|t| !t.trim().is_empty()) {
            base.title = title;
        }
        base.description = raw
            .description
            .unwrap_or_else(|| body.trim().to_string());
        base.filters = present(raw.filters);
        base.properties = raw.properties;
        base.formulas = raw.formulas.into_formulas()?;

        base.views = raw
            .views
            .into_iter()
            .enumerate()
            .map(|(index, raw)| View {
                name: raw
                    .name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| format!("{} {}", raw.view_type, index + 1)),
                view_type: raw.view_type,
                sort: raw.sort,
                filter: present(raw.filter),
                order: raw.order,
            })
            .collect();

        if base.views.is_empty() {
            base.views.push(View::table(config.default_view_name.clone()));
        }

        log::debug!(
            "parsed base `{}`: {} view(s), {} formula(s), filters {}",
            base.id,
            base.views.len(),
            base.formulas.len(),
            if base.filters.is_some() { "present" } else { "absent" }
        );

        Ok(base)
    }
}
