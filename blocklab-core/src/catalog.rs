//! Block catalog: the fixed set of templates a strategy is assembled from.
//!
//! Indicators all carry a `period` so the period rule applies uniformly.
//! Cross conditions reference two other blocks by instance id through
//! `indicator1` / `indicator2`; threshold conditions compare one reference
//! against a `value`.

use crate::domain::{BlockKind, BlockTemplate, ParamValue, TemplateId};

/// Read-only set of block templates, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<BlockTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<BlockTemplate>) -> Self {
        Self { templates }
    }

    /// Standard catalog: 7 indicators, 4 conditions, 2 actions.
    pub fn standard() -> Self {
        use BlockKind::*;
        use ParamValue::Number;

        let empty = || ParamValue::text("");

        Self::new(vec![
            // ── Indicators ──
            BlockTemplate::new("sma", Indicator, "Simple Moving Average", &[("period", Number(20.0))]),
            BlockTemplate::new("ema", Indicator, "Exponential Moving Average", &[("period", Number(20.0))]),
            BlockTemplate::new("rsi", Indicator, "RSI", &[("period", Number(14.0))]),
            BlockTemplate::new(
                "macd",
                Indicator,
                "MACD",
                &[
                    ("period", Number(26.0)),
                    ("fast_period", Number(12.0)),
                    ("signal_period", Number(9.0)),
                ],
            ),
            BlockTemplate::new(
                "bollinger",
                Indicator,
                "Bollinger Bands",
                &[("period", Number(20.0)), ("std_dev", Number(2.0))],
            ),
            BlockTemplate::new(
                "stochastic",
                Indicator,
                "Stochastic Oscillator",
                &[("period", Number(14.0)), ("smoothing", Number(3.0))],
            ),
            BlockTemplate::new("volume", Indicator, "Volume", &[("period", Number(20.0))]),
            // ── Conditions ──
            BlockTemplate::new(
                "cross_above",
                Condition,
                "Cross Above",
                &[("indicator1", empty()), ("indicator2", empty())],
            ),
            BlockTemplate::new(
                "cross_below",
                Condition,
                "Cross Below",
                &[("indicator1", empty()), ("indicator2", empty())],
            ),
            BlockTemplate::new(
                "greater_than",
                Condition,
                "Greater Than",
                &[("indicator1", empty()), ("value", empty())],
            ),
            BlockTemplate::new(
                "less_than",
                Condition,
                "Less Than",
                &[("indicator1", empty()), ("value", empty())],
            ),
            // ── Actions ──
            BlockTemplate::new("buy", Action, "Buy", &[("quantity", Number(1.0))]),
            BlockTemplate::new("sell", Action, "Sell", &[("quantity", Number(1.0))]),
        ])
    }

    pub fn templates(&self) -> &[BlockTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> Option<&BlockTemplate> {
        self.templates.iter().find(|t| t.id.as_str() == id)
    }

    pub fn get_by_id(&self, id: &TemplateId) -> Option<&BlockTemplate> {
        self.get(id.as_str())
    }

    /// Templates of one kind, in catalog order.
    pub fn by_kind(&self, kind: BlockKind) -> impl Iterator<Item = &BlockTemplate> {
        self.templates.iter().filter(move |t| t.kind == kind)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
