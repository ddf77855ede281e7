//! RSI (Relative Strength Index).
//!
//! Close-to-close changes are split into gain and loss series (the first
//! candle contributes a zero change) and each is smoothed with an adjusted
//! exponential mean, alpha = 1/period:
//!
//!   avg[t] = sum((1-a)^k * x[t-k]) / sum((1-a)^k)
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! With no losses the ratio is infinite and RSI saturates at 100. A window with
//! neither gains nor losses yields NaN, which callers treat as "no reading".
//! Requires at least `period` candles.

use crate::domain::candle::Candle;

pub fn rsi(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }
    rsi_series(candles, period).last().copied().flatten()
}

/// RSI at every candle; `None` until `period` candles have been seen.
pub fn rsi_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; candles.len()];
    }

    let decay = 1.0 - 1.0 / period as f64;
    let mut gain_num = 0.0;
    let mut loss_num = 0.0;
    let mut den = 0.0;

    let mut values = Vec::with_capacity(candles.len());
    for (i, candle) in candles.iter().enumerate() {
        let change = if i == 0 {
            0.0
        } else {
            candle.close - candles[i - 1].close
        };
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        gain_num = gain + decay * gain_num;
        loss_num = loss + decay * loss_num;
        den = 1.0 + decay * den;

        if i + 1 < period {
            values.push(None);
            continue;
        }

        let avg_gain = gain_num / den;
        let avg_loss = loss_num / den;
        values.push(Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss)));
    }
    values
}
