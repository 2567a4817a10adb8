//! Performance metrics computed from a trade list.
//!
//! Each closing sell is scored against the trade before it:
//! `(sell_price - previous_price) / previous_price`. The metrics below are
//! pure functions of that per-trade return series.

use serde::{Deserialize, Serialize};

use super::{Side, Trade};

/// Aggregate performance for one backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Compounded return across all scored trades, as a fraction.
    pub total_return: f64,
    /// Mean over sample standard deviation of trade returns. Not annualized.
    pub sharpe_ratio: f64,
    /// Largest drop of the cumulative return sum below its running peak.
    /// Non-negative.
    pub max_drawdown: f64,
    /// Fraction of scored trades with a positive return.
    pub win_rate: f64,
}

impl PerformanceMetrics {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let returns = trade_returns(trades);
        Self {
            total_return: total_return(&returns),
            sharpe_ratio: sharpe_ratio(&returns),
            max_drawdown: max_drawdown(&returns),
            win_rate: win_rate(&returns),
        }
    }
}

/// Return of every sell relative to the trade immediately before it.
pub fn trade_returns(trades: &[Trade]) -> Vec<f64> {
    trades
        .windows(2)
        .filter(|pair| pair[1].side == Side::Sell)
        .map(|pair| (pair[1].price - pair[0].price) / pair[0].price)
        .collect()
}

pub fn total_return(returns: &[f64]) -> f64 {
    returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0
}

/// Returns 0.0 for fewer than two returns or zero variance.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    mean / std
}

/// Peak-to-trough distance of the cumulative return sum. The running peak
/// starts at the first cumulative value.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for r in returns {
        cumulative += r;
        peak = peak.max(cumulative);
        max_dd = max_dd.max(peak - cumulative);
    }
    max_dd
}

pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    returns.iter().filter(|r| **r > 0.0).count() as f64 / returns.len() as f64
}
