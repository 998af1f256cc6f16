use serde::{Deserialize, Serialize};

/// Engine limits and fallback values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nesting bound for the formula parser.
    pub max_formula_depth: usize,
    /// Formulas longer than this many bytes are returned verbatim.
    pub max_formula_length: usize,
    /// Value produced by arithmetic division by zero.
    pub division_by_zero: String,
    /// Name of the view synthesized for a Base that declares none.
    pub default_view_name: String,
}

impl EngineConfig {
    pub fn v0() -> Self {
        Self {
            max_formula_depth: 64,
            max_formula_length: 4096,
            division_by_zero: "#DIV/0!".into(),
            default_view_name: "Table".into(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::v0()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"max_formula_depth": 8}"#).unwrap();
        assert_eq!(config.max_formula_depth, 8);
        assert_eq!(config.division_by_zero, "#DIV/0!");
        assert_eq!(config.default_view_name, "Table");
    }
}
