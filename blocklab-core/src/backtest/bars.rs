//! Daily bars read from a local CSV file.
//!
//! Accepts either lowercase headers (`date,open,high,low,close,volume`) or the
//! Yahoo export layout (`Date,Open,High,Low,Close,Adj Close,Volume`). Only
//! `date` and `close` are required; unknown columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::BacktestError;

/// OHLCV bar for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    #[serde(alias = "Open", default)]
    pub open: f64,
    #[serde(alias = "High", default)]
    pub high: f64,
    #[serde(alias = "Low", default)]
    pub low: f64,
    #[serde(alias = "Close")]
    pub close: f64,
    #[serde(alias = "Volume", default)]
    pub volume: u64,
}

impl Bar {
    /// Bar with only a date and close, the two fields the strategy reads.
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Load bars from `path`.
pub fn load_csv(path: &Path) -> Result<Vec<Bar>, BacktestError> {
    let file = File::open(path).map_err(|source| BacktestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_csv(file)
}

/// Parse bars from any CSV source and check they are usable: dates strictly
/// increasing, closes finite and positive.
pub fn parse_csv<R: Read>(source: R) -> Result<Vec<Bar>, BacktestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let mut bars: Vec<Bar> = Vec::new();
    for record in reader.deserialize::<Bar>() {
        let bar = record?;
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(BacktestError::BadClose {
                date: bar.date,
                close: bar.close,
            });
        }
        if let Some(prev) = bars.last() {
            if bar.date <= prev.date {
                return Err(BacktestError::Unordered {
                    earlier: prev.date,
                    later: bar.date,
                });
            }
        }
        bars.push(bar);
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lowercase_layout() {
        let csv = "date,open,high,low,close,volume\n\
                   2024-01-02,10,11,9,10.5,1000\n\
                   2024-01-03,10.5,12,10,11.5,1200\n";
        let bars = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 11.5);
        assert_eq!(bars[1].volume, 1200);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn reads_yahoo_layout_and_ignores_adj_close() {
        let csv = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                   2024-01-02, 100, 101, 99, 100.5, 98.1, 5000\n";
        let bars = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(bars[0].high, 101.0);
    }

    #[test]
    fn close_only_files_are_accepted() {
        let csv = "date,close\n2024-01-02,10\n2024-01-03,11\n";
        let bars = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(bars[1].close, 11.0);
        assert_eq!(bars[1].open, 0.0);
        assert_eq!(bars[1].volume, 0);
    }

    #[test]
    fn out_of_order_dates_are_rejected() {
        let csv = "date,close\n2024-01-03,10\n2024-01-02,11\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(BacktestError::Unordered { .. })
        ));

        let dup = "date,close\n2024-01-02,10\n2024-01-02,11\n";
        assert!(parse_csv(dup.as_bytes()).is_err());
    }

    #[test]
    fn non_positive_close_is_rejected() {
        let csv = "date,close\n2024-01-02,0\n";
        assert!(matches!(
            parse_csv(csv.as_bytes()),
            Err(BacktestError::BadClose { .. })
        ));
    }

    #[test]
    fn malformed_rows_are_csv_errors() {
        let csv = "date,close\nyesterday,10\n";
        assert!(matches!(parse_csv(csv.as_bytes()), Err(BacktestError::Csv(_))));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_csv(Path::new("/nonexistent/bars.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bars.csv"));
    }
}
