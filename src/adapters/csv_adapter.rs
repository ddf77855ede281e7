//! CSV file candle provider.
//!
//! One file per symbol and timeframe, `<dir>/<SYMBOL>_<timeframe>.csv`, with
//! header `timestamp,open,high,low,close,volume`. The timestamp column is
//! RFC 3339 and may be left empty.

use crate::domain::candle::Candle;
use crate::domain::error::StratbenchError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: Option<DateTime<Utc>>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        count: usize,
    ) -> Result<Vec<Candle>, StratbenchError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path)
            .map_err(|e| io_error(&format!("failed to read {}", path.display()), e))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for (i, result) in rdr.deserialize::<CandleRow>().enumerate() {
            // header is line 1
            let line = i + 2;
            let row = result.map_err(|e| StratbenchError::DataSource {
                reason: format!("{} line {}: {}", path.display(), line, e),
            })?;

            let mut candle = Candle::new(row.open, row.high, row.low, row.close, row.volume);
            candle.open_time = row.timestamp;
            if !candle.is_well_formed() {
                return Err(StratbenchError::DataSource {
                    reason: format!(
                        "{} line {}: malformed candle (open {}, high {}, low {}, close {})",
                        path.display(),
                        line,
                        row.open,
                        row.high,
                        row.low,
                        row.close
                    ),
                });
            }
            candles.push(candle);
        }

        if candles.iter().all(|c| c.open_time.is_some()) {
            candles.sort_by_key(|c| c.open_time);
        }
        if candles.len() > count {
            candles.drain(..candles.len() - count);
        }
        Ok(candles)
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, StratbenchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            io_error(
                &format!("failed to read directory {}", self.base_path.display()),
                e,
            )
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| io_error("directory entry error", e))?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Timeouts and interrupted reads may clear on retry; everything else is fatal.
fn io_error(context: &str, err: io::Error) -> StratbenchError {
    let reason = format!("{}: {}", context, err);
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            StratbenchError::MarketDataUnavailable { reason }
        }
        _ => StratbenchError::DataSource { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        // deliberately out of order
        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-15T02:00:00Z,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15T00:00:00Z,100.0,110.0,90.0,105.0,50000\n\
            2024-01-15T01:00:00Z,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("BTCUSDT_1h.csv"), csv_content).unwrap();
        fs::write(
            path.join("ETHUSDT_1h.csv"),
            "timestamp,open,high,low,close,volume\n",
        )
        .unwrap();
        fs::write(
            path.join("BTCUSDT_1d.csv"),
            "timestamp,open,high,low,close,volume\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_candles_sorted_chronologically() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.fetch_candles("BTCUSDT", "1h", 10).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles[0].open_time,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 110.0);
        assert_eq!(candles[0].low, 90.0);
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[0].volume, 50000.0);
        assert_eq!(candles[2].close, 115.0);
    }

    #[test]
    fn fetch_candles_keeps_newest() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.fetch_candles("BTCUSDT", "1h", 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 110.0);
        assert_eq!(candles[1].close, 115.0);
    }

    #[test]
    fn empty_timestamps_keep_file_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X_5m.csv"),
            "timestamp,open,high,low,close,volume\n\
             ,3.0,3.0,3.0,3.0,1\n\
             ,1.0,1.0,1.0,1.0,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let candles = adapter.fetch_candles("X", "5m", 10).unwrap();
        assert_eq!(candles[0].close, 3.0);
        assert!(candles[0].open_time.is_none());
    }

    #[test]
    fn fetch_candles_missing_file() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_candles("NOPE", "1h", 10).unwrap_err();
        assert!(matches!(err, StratbenchError::DataSource { .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn fetch_candles_rejects_malformed_candle() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD_1h.csv"),
            "timestamp,open,high,low,close,volume\n\
             2024-01-15T00:00:00Z,100.0,99.0,90.0,105.0,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_candles("BAD", "1h", 10).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn fetch_candles_rejects_non_numeric() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD_1h.csv"),
            "timestamp,open,high,low,close,volume\n\
             2024-01-15T00:00:00Z,abc,110.0,90.0,105.0,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(matches!(
            adapter.fetch_candles("BAD", "1h", 10),
            Err(StratbenchError::DataSource { .. })
        ));
    }

    #[test]
    fn list_symbols_filters_by_timeframe() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(adapter.list_symbols("1h").unwrap(), vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(adapter.list_symbols("1d").unwrap(), vec!["BTCUSDT"]);
        assert!(adapter.list_symbols("15m").unwrap().is_empty());
    }

    #[test]
    fn timeouts_are_transient() {
        let err = io_error("read", io::Error::from(io::ErrorKind::TimedOut));
        assert!(err.is_transient());
        let err = io_error("read", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!err.is_transient());
    }
}
