//! Block kinds, parameter values, catalog templates and placed instances.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::ids::{InstanceId, TemplateId};

/// The three block families. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Indicator,
    Condition,
    Action,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Indicator, BlockKind::Condition, BlockKind::Action];

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Indicator => "Indicator",
            BlockKind::Condition => "Condition",
            BlockKind::Action => "Action",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indicator" => Ok(BlockKind::Indicator),
            "condition" => Ok(BlockKind::Condition),
            "action" => Ok(BlockKind::Action),
            other => Err(format!("unknown block kind: {other}")),
        }
    }
}

/// A single parameter value: numeric or textual.
///
/// Serialized untagged, so the wire form is a bare JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn text(s: impl Into<String>) -> Self {
        ParamValue::Text(s.into())
    }

    /// Read the value as a number. Text is trimmed and parsed; empty or
    /// unparsable text has no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Whether the value counts as "set". Only empty text is absent; `0` and
    /// whitespace are present.
    pub fn is_present(&self) -> bool {
        match self {
            ParamValue::Number(_) => true,
            ParamValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

/// Parameter bag keyed by name. `BTreeMap` keeps serialization order stable.
pub type Parameters = BTreeMap<String, ParamValue>;

/// Catalog entry a block is created from. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTemplate {
    pub id: TemplateId,
    pub kind: BlockKind,
    pub display_name: String,
    pub default_parameters: Parameters,
}

impl BlockTemplate {
    pub fn new(
        id: &str,
        kind: BlockKind,
        display_name: &str,
        defaults: &[(&str, ParamValue)],
    ) -> Self {
        Self {
            id: TemplateId::new(id),
            kind,
            display_name: display_name.to_string(),
            default_parameters: defaults
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }
}

/// A template placed into a strategy sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInstance {
    pub instance_id: InstanceId,
    pub template_id: TemplateId,
    pub kind: BlockKind,
    pub display_name: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl BlockInstance {
    /// Instantiate `template` under `instance_id`, cloning its defaults.
    pub fn from_template(template: &BlockTemplate, instance_id: InstanceId) -> Self {
        Self {
            instance_id,
            template_id: template.id.clone(),
            kind: template.kind,
            display_name: template.display_name.clone(),
            parameters: template.default_parameters.clone(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.parameters.get(key)
    }
}
