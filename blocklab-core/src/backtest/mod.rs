//! Backtesting a strategy against a local bar series.
//!
//! The rule set is a mean-reversion pair driven by an SMA and an RSI:
//! - enter long when RSI < oversold and close > SMA, unless already long
//! - go short when RSI > overbought and close < SMA, unless already short
//!
//! Window lengths and thresholds come from `BacktestParams`, which can be
//! read off a block sequence with `BacktestParams::from_blocks`. Bars are
//! never fetched; callers load them with `bars::load_csv`.

pub mod bars;
pub mod indicators;
pub mod metrics;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::BlockInstance;
use crate::schema;

pub use bars::Bar;
pub use metrics::PerformanceMetrics;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("cannot read bars from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed bar data: {0}")]
    Csv(#[from] csv::Error),

    #[error("bars out of order: {later} does not follow {earlier}")]
    Unordered { earlier: NaiveDate, later: NaiveDate },

    #[error("close on {date} must be a positive number, got {close}")]
    BadClose { date: NaiveDate, close: f64 },

    #[error("{0} must be at least 1")]
    ZeroWindow(&'static str),
}

/// Strategy knobs. Serialized keys match the `/api/backtest` payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    pub ma_window: usize,
    pub rsi_window: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            ma_window: 20,
            rsi_window: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

impl BacktestParams {
    /// Read parameters off a block sequence: the first SMA's period, the
    /// first RSI's period, the first Less Than value as the oversold level
    /// and the first Greater Than value as the overbought level. Anything
    /// missing or unusable keeps its default.
    pub fn from_blocks(blocks: &[BlockInstance]) -> Self {
        let first_number = |template: &str, key: &str| {
            blocks
                .iter()
                .filter(|b| b.template_id.as_str() == template)
                .find_map(|b| b.param(key)?.as_number())
        };
        let window = |n: f64| (n >= 1.0).then_some(n as usize);

        let defaults = Self::default();
        Self {
            ma_window: first_number("sma", schema::PERIOD)
                .and_then(window)
                .unwrap_or(defaults.ma_window),
            rsi_window: first_number("rsi", schema::PERIOD)
                .and_then(window)
                .unwrap_or(defaults.rsi_window),
            rsi_overbought: first_number("greater_than", schema::VALUE)
                .unwrap_or(defaults.rsi_overbought),
            rsi_oversold: first_number("less_than", schema::VALUE)
                .unwrap_or(defaults.rsi_oversold),
        }
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.ma_window == 0 {
            return Err(BacktestError::ZeroWindow("ma_window"));
        }
        if self.rsi_window == 0 {
            return Err(BacktestError::ZeroWindow("rsi_window"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

/// A position change at one bar's close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub side: Side,
    pub price: f64,
    /// Position after the trade: 1 long, -1 short.
    pub position: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub params: BacktestParams,
    pub bar_count: usize,
    #[serde(flatten)]
    pub metrics: PerformanceMetrics,
    pub trades: Vec<Trade>,
}

/// Run the SMA/RSI rules over `bars`.
pub fn run(bars: &[Bar], params: &BacktestParams) -> Result<BacktestReport, BacktestError> {
    params.validate()?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ma = indicators::sma(&closes, params.ma_window);
    let rsi = indicators::rsi(&closes, params.rsi_window);

    let mut position: i8 = 0;
    let mut trades = Vec::new();
    for i in 1..bars.len() {
        let close = closes[i];
        let side = if rsi[i] < params.rsi_oversold && close > ma[i] && position <= 0 {
            Side::Buy
        } else if rsi[i] > params.rsi_overbought && close < ma[i] && position >= 0 {
            Side::Sell
        } else {
            continue;
        };
        position = match side {
            Side::Buy => 1,
            Side::Sell => -1,
        };
        trades.push(Trade {
            date: bars[i].date,
            side,
            price: close,
            position,
        });
    }

    let metrics = PerformanceMetrics::from_trades(&trades);
    debug!(bars = bars.len(), trades = trades.len(), ?metrics, "backtest finished");
    Ok(BacktestReport {
        params: *params,
        bar_count: bars.len(),
        metrics,
        trades,
    })
}
