//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(close, fast) - EMA(close, slow)
//! Signal Line = EMA(MACD Line, signal)
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.

use crate::domain::candle::{Candle, closes};
use crate::domain::indicator::ema_series;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD at every candle of the window. Empty for zero periods.
pub fn macd_series(candles: &[Candle], fast: usize, slow: usize, signal: usize) -> Vec<MacdPoint> {
    if fast == 0 || slow == 0 || signal == 0 || candles.is_empty() {
        return Vec::new();
    }

    let close = closes(candles);
    let ema_fast = ema_series(&close, fast);
    let ema_slow = ema_series(&close, slow);

    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_series(&line, signal);

    line.iter()
        .zip(&signal_line)
        .map(|(&line, &signal)| MacdPoint {
            line,
            signal,
            histogram: line - signal,
        })
        .collect()
}
