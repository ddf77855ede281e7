//! Technical indicator implementations.
//!
//! Each indicator is a pure function over a candle window (oldest first) that
//! reports the value for the newest candle. A window shorter than the
//! indicator's lookback yields `None` rather than an error.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::average_true_range;
pub use ema::ema_series;
pub use macd::{MacdPoint, macd_series};
pub use rsi::{rsi, rsi_series};
pub use sma::{sma, sma_series};

use std::fmt;

/// Indicator identity and parameters, used for logging and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Atr(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl IndicatorType {
    /// Fewest candles the indicator needs to produce a value.
    pub fn min_candles(&self) -> usize {
        match self {
            IndicatorType::Sma(period) | IndicatorType::Rsi(period) => *period,
            IndicatorType::Atr(period) => period + 1,
            IndicatorType::Macd { slow, .. } => *slow,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}
