use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::predicate::Predicate;
use crate::types::identifiers::BaseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    #[default]
    Table,
    Cards,
    Calendar,
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewType::Table => "Table",
            ViewType::Cards => "Cards",
            ViewType::Calendar => "Calendar",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            other => Err(serde::de::Error::unknown_variant(other, &["ASC", "DESC"])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRule {
    #[serde(alias = "column")]
    pub property: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortRule {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
        }
    }
}

/// A named formula. Formulas are evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    #[serde(alias = "formulaText", alias = "expression")]
    pub formula: String,
}

impl Formula {
    pub fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
        }
    }
}

/// One rendering configuration of a Base.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub view_type: ViewType,
    pub name: String,
    pub sort: Vec<SortRule>,
    /// Applied in addition to the Base filter.
    pub filter: Option<Predicate>,
    /// Display columns, passed through to presentation.
    pub order: Vec<String>,
}

impl View {
    pub fn new(view_type: ViewType, name: impl Into<String>) -> Self {
        Self {
            view_type,
            name: name.into(),
            sort: Vec::new(),
            filter: None,
            order: Vec::new(),
        }
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::new(ViewType::Table, name)
    }

    pub fn with_sort(mut self, rule: SortRule) -> Self {
        self.sort.push(rule);
        self
    }

    pub fn with_filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_order(mut self, columns: Vec<String>) -> Self {
        self.order = columns;
        self
    }
}

/// A declarative view over a note collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub id: BaseId,
    pub title: String,
    pub description: String,
    pub filters: Option<Predicate>,
    pub views: Vec<View>,
    pub properties: BTreeMap<String, serde_json::Value>,
    pub formulas: Vec<Formula>,
}

impl Base {
    pub fn new(id: BaseId) -> Self {
        let title = id.as_str().rsplit('/').next().unwrap_or_default().to_string();
        Self {
            id,
            title,
            description: String::new(),
            filters: None,
            views: Vec::new(),
            properties: BTreeMap::new(),
            formulas: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: Predicate) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.views.push(view);
        self
    }

    pub fn with_formula(mut self, formula: Formula) -> Self {
        self.formulas.push(formula);
        self
    }

    /// First view with the given name.
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|view| view.name == name)
    }
}
