#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use stratbench::domain::backtest::BacktestConfig;
pub use stratbench::domain::candle::Candle;
use stratbench::domain::error::StratbenchError;
use stratbench::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
    pub unavailable: HashSet<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            unavailable: HashSet::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    /// Fetches for `symbol` fail with a transient error.
    pub fn with_outage(mut self, symbol: &str) -> Self {
        self.unavailable.insert(symbol.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(
        &self,
        symbol: &str,
        _timeframe: &str,
        count: usize,
    ) -> Result<Vec<Candle>, StratbenchError> {
        if self.unavailable.contains(symbol) {
            return Err(StratbenchError::MarketDataUnavailable {
                reason: format!("{} feed timed out", symbol),
            });
        }
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StratbenchError::DataSource {
                reason: reason.clone(),
            });
        }
        let candles = self.data.get(symbol).cloned().unwrap_or_default();
        let skip = candles.len().saturating_sub(count);
        Ok(candles[skip..].to_vec())
    }

    fn list_symbols(&self, _timeframe: &str) -> Result<Vec<String>, StratbenchError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle::new(open, high, low, close, 1000.0)
}

/// Closes `start, start+1, ...`; each open sits half a point below its close.
pub fn uptrend(count: usize, start: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = start + i as f64;
            candle(close - 0.5, close + 0.5, close - 1.0, close)
        })
        .collect()
}

pub fn falling(count: usize, start: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = start - i as f64;
            candle(close, close, close, close)
        })
        .collect()
}

pub fn sample_config(symbol: &str, candle_amount: usize) -> BacktestConfig {
    BacktestConfig {
        initial_balance: 1000.0,
        symbol: symbol.to_string(),
        timeframe: "1h".to_string(),
        candle_amount,
    }
}
