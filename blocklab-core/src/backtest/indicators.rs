//! Rolling indicators over close prices.
//!
//! Both functions return one value per input; positions before the window
//! fills are `NaN`, and comparisons against `NaN` never fire a signal.

/// Simple moving average over `window` values.
/// First valid value at index `window - 1`.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    let mut sum: f64 = values[..window].iter().sum();
    result[window - 1] = sum / window as f64;
    for i in window..n {
        sum += values[i] - values[i - window];
        result[i] = sum / window as f64;
    }
    result
}

/// Relative Strength Index from simple rolling means of gains and losses.
///
/// RSI = 100 - 100 / (1 + avg_gain / avg_loss). First valid value at index
/// `window`. A window with losses of zero reads 100; a flat window is `NaN`.
pub fn rsi(closes: &[f64], window: usize) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n <= window {
        return result;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();
    let avg_gain = sma(&gains, window);
    let avg_loss = sma(&losses, window);

    // changes[i - 1] is the move into bar i.
    for i in window..n {
        result[i] = rsi_value(avg_gain[i - 1], avg_loss[i - 1]);
    }
    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { f64::NAN } else { 100.0 };
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_fills_after_window() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert_eq!(&out[2..], &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn sma_short_input_is_all_nan() {
        assert!(sma(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
        assert!(sma(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_extremes() {
        let rising = rsi(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(rising[1].is_nan());
        assert_eq!(&rising[2..], &[100.0, 100.0]);

        let falling = rsi(&[4.0, 3.0, 2.0, 1.0], 2);
        assert_eq!(&falling[2..], &[0.0, 0.0]);

        let flat = rsi(&[5.0, 5.0, 5.0], 2);
        assert!(flat[2].is_nan());
    }

    #[test]
    fn rsi_mixed_window() {
        // Moves +20 then -1: avg gain 10, avg loss 0.5, RS 20.
        let out = rsi(&[10.0, 30.0, 29.0], 2);
        assert!((out[2] - (100.0 - 100.0 / 21.0)).abs() < 1e-12);
    }
}
