//! Parameter schema contract: required keys per block kind.
//!
//! Parameters are an open string-keyed map. This table is the single place
//! that says which keys the validator reads for each kind and what type of
//! value it expects there. Front ends use it to decide how to parse user input.

use serde::{Deserialize, Serialize};

use crate::domain::{BlockKind, ParamValue};

/// Expected type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    /// Must read as a number greater than zero.
    PositiveNumber,
    /// Instance id of another block, kept as text.
    Reference,
    /// Number or text; only presence is checked.
    Scalar,
}

/// Which condition shape a schema row applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Any,
    Cross,
    Threshold,
}

/// A required parameter for one kind/variant.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SchemaField {
    pub kind: BlockKind,
    pub variant: Variant,
    pub key: &'static str,
    pub expected: ParamType,
}

pub const PERIOD: &str = "period";
pub const INDICATOR_1: &str = "indicator1";
pub const INDICATOR_2: &str = "indicator2";
pub const VALUE: &str = "value";
pub const QUANTITY: &str = "quantity";

/// The per-kind required-key table consulted by the validator.
pub const PARAM_SCHEMA: &[SchemaField] = &[
    SchemaField {
        kind: BlockKind::Indicator,
        variant: Variant::Any,
        key: PERIOD,
        expected: ParamType::PositiveNumber,
    },
    SchemaField {
        kind: BlockKind::Condition,
        variant: Variant::Cross,
        key: INDICATOR_1,
        expected: ParamType::Reference,
    },
    SchemaField {
        kind: BlockKind::Condition,
        variant: Variant::Cross,
        key: INDICATOR_2,
        expected: ParamType::Reference,
    },
    SchemaField {
        kind: BlockKind::Condition,
        variant: Variant::Threshold,
        key: VALUE,
        expected: ParamType::Scalar,
    },
    SchemaField {
        kind: BlockKind::Action,
        variant: Variant::Any,
        key: QUANTITY,
        expected: ParamType::PositiveNumber,
    },
];

/// Cross conditions are recognised by display name ("Cross Above", "Cross Below").
pub fn is_cross_variant(display_name: &str) -> bool {
    display_name.to_ascii_lowercase().contains("cross")
}

/// Variant of a block given its kind and display name.
pub fn variant_of(kind: BlockKind, display_name: &str) -> Variant {
    match kind {
        BlockKind::Condition if is_cross_variant(display_name) => Variant::Cross,
        BlockKind::Condition => Variant::Threshold,
        _ => Variant::Any,
    }
}

/// Required fields for a block.
pub fn required_fields(kind: BlockKind, display_name: &str) -> impl Iterator<Item = &'static SchemaField> {
    let variant = variant_of(kind, display_name);
    PARAM_SCHEMA
        .iter()
        .filter(move |f| f.kind == kind && (f.variant == Variant::Any || f.variant == variant))
}

/// Expected type for `key` on a block, if the schema constrains it.
///
/// `indicator1` on a threshold condition is not required but is still a
/// reference, so it is reported as one.
pub fn expected_type(kind: BlockKind, display_name: &str, key: &str) -> Option<ParamType> {
    if let Some(field) = required_fields(kind, display_name).find(|f| f.key == key) {
        return Some(field.expected);
    }
    match key {
        INDICATOR_1 | INDICATOR_2 if kind == BlockKind::Condition => Some(ParamType::Reference),
        _ => None,
    }
}

/// Parse raw user input into a value of the expected type.
///
/// Unconstrained keys become numbers when they parse as one, text otherwise.
pub fn parse_input(expected: Option<ParamType>, raw: &str) -> Result<ParamValue, String> {
    let trimmed = raw.trim();
    match expected {
        Some(ParamType::PositiveNumber) => trimmed
            .parse::<f64>()
            .map(ParamValue::Number)
            .map_err(|_| format!("'{trimmed}' is not a number")),
        Some(ParamType::Reference) => Ok(ParamValue::text(trimmed)),
        Some(ParamType::Scalar) | None => Ok(match trimmed.parse::<f64>() {
            Ok(n) => ParamValue::Number(n),
            Err(_) => ParamValue::text(trimmed),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_detection_is_case_insensitive() {
        assert!(is_cross_variant("Cross Above"));
        assert!(is_cross_variant("cross below"));
        assert!(!is_cross_variant("Greater Than"));
    }

    #[test]
    fn required_fields_per_variant() {
        let cross: Vec<_> = required_fields(BlockKind::Condition, "Cross Above")
            .map(|f| f.key)
            .collect();
        assert_eq!(cross, vec![INDICATOR_1, INDICATOR_2]);

        let threshold: Vec<_> = required_fields(BlockKind::Condition, "Less Than")
            .map(|f| f.key)
            .collect();
        assert_eq!(threshold, vec![VALUE]);

        let indicator: Vec<_> = required_fields(BlockKind::Indicator, "RSI")
            .map(|f| f.key)
            .collect();
        assert_eq!(indicator, vec![PERIOD]);
    }

    #[test]
    fn expected_types() {
        assert_eq!(
            expected_type(BlockKind::Action, "Buy", QUANTITY),
            Some(ParamType::PositiveNumber)
        );
        assert_eq!(
            expected_type(BlockKind::Condition, "Greater Than", INDICATOR_1),
            Some(ParamType::Reference)
        );
        assert_eq!(expected_type(BlockKind::Indicator, "MACD", "fast_period"), None);
    }

    #[test]
    fn parse_input_by_type() {
        assert_eq!(
            parse_input(Some(ParamType::PositiveNumber), " 5 "),
            Ok(ParamValue::Number(5.0))
        );
        assert!(parse_input(Some(ParamType::PositiveNumber), "five").is_err());
        assert_eq!(
            parse_input(Some(ParamType::Reference), "12"),
            Ok(ParamValue::text("12"))
        );
        assert_eq!(parse_input(Some(ParamType::Scalar), "70"), Ok(ParamValue::Number(70.0)));
        assert_eq!(parse_input(None, "close"), Ok(ParamValue::text("close")));
    }
}
