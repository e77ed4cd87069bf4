//! Prior configuration.
//!
//! A configuration is an ordered YAML mapping from rule key to that rule's
//! parameters, either one mapping or a list of them:
//!
//! ```yaml
//! length:
//!   min_: 4
//!   max_: 30
//! relational:
//!   - targets: [x1]
//!     effectors: [log]
//!     relationship: child
//!   - targets: [const]
//!     effectors: [add]
//!     relationship: sibling
//!     on: false
//! trig: {}
//! ```
//!
//! Every entry accepts an `on` flag, defaulting to `true`. Remaining keys are
//! checked against the rule's parameter struct.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::binding::PositionMode;
use crate::error::PriorError;
use crate::relational::Relationship;

/// Ordered rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PriorConfig {
    rules: Mapping,
}

impl PriorConfig {
    pub fn new(rules: Mapping) -> Self {
        Self { rules }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, PriorError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PriorError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// `(rule key, parameters)` in file order.
    pub fn rules(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One token name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TokenNames {
    One(String),
    Many(Vec<String>),
}

impl TokenNames {
    pub fn as_slice(&self) -> &[String] {
        match self {
            TokenNames::One(name) => std::slice::from_ref(name),
            TokenNames::Many(names) => names,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationalParams {
    pub targets: TokenNames,
    pub effectors: TokenNames,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LengthParams {
    #[serde(default, rename = "min_", alias = "min")]
    pub min: Option<usize>,
    #[serde(default, rename = "max_", alias = "max")]
    pub max: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepeatParams {
    pub tokens: TokenNames,
    #[serde(default, rename = "min_", alias = "min")]
    pub min: Option<usize>,
    #[serde(default, rename = "max_", alias = "max")]
    pub max: Option<usize>,
}

/// Parameters of rules that take none.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoftLengthParams {
    #[serde(default)]
    pub loc: Option<f32>,
    #[serde(default)]
    pub scale: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequencePositionsParams {
    pub menu_file: PathBuf,
    #[serde(default)]
    pub mode: PositionMode,
    #[serde(default)]
    pub biasing_factor: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageModelParams {
    /// Missing means `1.0`; an explicit `null` leaves the weight unset.
    #[serde(default = "default_weight")]
    pub weight: Option<f32>,
}

fn default_weight() -> Option<f32> {
    Some(1.0)
}

/// Remove the `on` flag from an entry, defaulting to `true`.
pub(crate) fn take_switch(rule: &str, args: &mut Mapping) -> Result<bool, PriorError> {
    match args.remove("on") {
        None => Ok(true),
        Some(Value::Bool(on)) => Ok(on),
        Some(other) => Err(PriorError::invalid(
            rule,
            format!("'on' must be a boolean, got {other:?}"),
        )),
    }
}

/// Deserialize an entry's remaining keys into `T`.
pub(crate) fn parse<T: DeserializeOwned>(rule: &str, args: Mapping) -> Result<T, PriorError> {
    serde_yaml::from_value(Value::Mapping(args)).map_err(|e| PriorError::invalid(rule, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_rules_keep_file_order() {
        let config = PriorConfig::from_yaml_str("trig: {}\nlength: {max_: 5}\nconst: {}\n").unwrap();
        let keys: Vec<&str> = config.rules().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["trig", "length", "const"]);
        assert_eq!(config.len(), 3);
    }

    #[test]
    fn test_switch_defaults_on() {
        let mut args = mapping("max_: 5");
        assert!(take_switch("LengthConstraint", &mut args).unwrap());

        let mut args = mapping("max_: 5\non: false");
        assert!(!take_switch("LengthConstraint", &mut args).unwrap());
        assert!(!args.contains_key("on"));

        let mut args = mapping("on: maybe");
        assert!(take_switch("LengthConstraint", &mut args).is_err());
    }

    #[test]
    fn test_length_aliases() {
        let params: LengthParams = parse("LengthConstraint", mapping("min: 2\nmax_: 9")).unwrap();
        assert_eq!(params.min, Some(2));
        assert_eq!(params.max, Some(9));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<LengthParams, _> = parse("LengthConstraint", mapping("maximum: 9"));
        assert!(matches!(result, Err(PriorError::InvalidParameters { .. })));
    }

    #[test]
    fn test_token_names() {
        let params: RepeatParams = parse("RepeatConstraint", mapping("tokens: const\nmax_: 1")).unwrap();
        assert_eq!(params.tokens.as_slice(), ["const"]);

        let params: RelationalParams = parse(
            "RelationalConstraint",
            mapping("targets: [x1, x2]\neffectors: log\nrelationship: uchild"),
        )
        .unwrap();
        assert_eq!(params.targets.as_slice().len(), 2);
        assert_eq!(params.relationship, Relationship::UniqueChild);
    }

    #[test]
    fn test_language_model_weight() {
        let params: LanguageModelParams = parse("LanguageModelPrior", Mapping::new()).unwrap();
        assert_eq!(params.weight, Some(1.0));
        let params: LanguageModelParams = parse("LanguageModelPrior", mapping("weight: null")).unwrap();
        assert_eq!(params.weight, None);
    }

    #[test]
    fn test_seq_positions_mode() {
        let params: SequencePositionsParams =
            parse("SequencePositionsConstraint", mapping("menu_file: menu.yaml\nmode: short")).unwrap();
        assert_eq!(params.mode, PositionMode::Short);
        assert_eq!(params.biasing_factor, 0.0);

        let result: Result<SequencePositionsParams, _> =
            parse("SequencePositionsConstraint", mapping("menu_file: m.yaml\nmode: partial"));
        assert!(result.is_err());
    }
}
