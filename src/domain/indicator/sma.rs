//! Simple Moving Average over candle closes.
//!
//! SMA = mean(close[n-window..n])
//! Unavailable (`None`) when the window holds fewer than `window` candles.

use crate::domain::candle::Candle;

pub fn sma(candles: &[Candle], window: usize) -> Option<f64> {
    if window == 0 || candles.len() < window {
        return None;
    }
    let sum: f64 = candles[candles.len() - window..]
        .iter()
        .map(|c| c.close)
        .sum();
    Some(sum / window as f64)
}

/// One entry per candle: the SMA of the window ending at that candle.
pub fn sma_series(candles: &[Candle], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; candles.len()];
    }

    let mut values = Vec::with_capacity(candles.len());
    let mut sum = 0.0;
    for (i, candle) in candles.iter().enumerate() {
        sum += candle.close;
        if i >= window {
            sum -= candles[i - window].close;
        }
        if i + 1 >= window {
            values.push(Some(sum / window as f64));
        } else {
            values.push(None);
        }
    }
    values
}
