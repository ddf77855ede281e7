//! Average True Range.
//!
//! TR[i] = max(high - low, |high - prev_close|, |low - prev_close|)
//! ATR = mean of the last `period` true ranges, which needs `period + 1` candles.

use crate::domain::candle::Candle;

pub fn average_true_range(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let recent = &candles[candles.len() - (period + 1)..];
    let total: f64 = recent
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .sum();
    Some(total / period as f64)
}
