//! Atomic strategies: one indicator plus its thresholds, turned into a signal.
//!
//! Every variant validates its parameters at construction and checks the
//! window length before computing anything, so `NotEnoughData` always wins
//! over a computed result.

use crate::domain::candle::Candle;
use crate::domain::error::StratbenchError;
use crate::domain::indicator::{IndicatorType, macd_series, rsi, sma};
use crate::domain::signal::Signal;
use crate::domain::strategy_config::AtomicStrategyConfig;
use serde_json::{Value, json};
use std::fmt;

pub const SMA_TAG: &str = "SMA";
pub const RSI_TAG: &str = "RSI";
pub const MACD_TAG: &str = "MACD";

/// Short/long simple moving average crossover.
#[derive(Debug, Clone, PartialEq)]
pub struct SmaCrossover {
    short_window: usize,
    long_window: usize,
}

impl SmaCrossover {
    pub const DEFAULT_SHORT: usize = 10;
    pub const DEFAULT_LONG: usize = 30;

    pub fn new(short_window: usize, long_window: usize) -> Result<Self, StratbenchError> {
        if short_window < 1 || long_window < 2 {
            return Err(StratbenchError::configuration(format!(
                "SMA windows must be positive (short {}, long {})",
                short_window, long_window
            )));
        }
        if short_window >= long_window {
            return Err(StratbenchError::configuration(format!(
                "SMA short window {} must be below long window {}",
                short_window, long_window
            )));
        }
        if short_window > 50 || long_window > 300 {
            return Err(StratbenchError::configuration(format!(
                "SMA windows out of range (short {} <= 50, long {} <= 300)",
                short_window, long_window
            )));
        }
        Ok(SmaCrossover {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn min_candles(&self) -> usize {
        IndicatorType::Sma(self.long_window).min_candles()
    }

    fn signal(&self, candles: &[Candle]) -> Signal {
        let (Some(short_now), Some(long_now)) = (
            sma(candles, self.short_window),
            sma(candles, self.long_window),
        ) else {
            return Signal::NotEnoughData;
        };

        let previous = &candles[..candles.len() - 1];
        match (
            sma(previous, self.short_window),
            sma(previous, self.long_window),
        ) {
            (Some(short_prev), Some(long_prev)) => {
                if short_now > long_now && short_prev <= long_prev {
                    Signal::Buy
                } else if short_now < long_now && short_prev >= long_prev {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            }
            // First candle with both averages: no prior relationship to cross from.
            _ => {
                if short_now > long_now {
                    Signal::Buy
                } else if short_now < long_now {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            }
        }
    }
}

/// Oversold/overbought thresholds on RSI.
#[derive(Debug, Clone, PartialEq)]
pub struct RsiThreshold {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl RsiThreshold {
    pub const DEFAULT_PERIOD: usize = 14;
    pub const DEFAULT_OVERSOLD: f64 = 30.0;
    pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

    pub fn new(period: usize, oversold: f64, overbought: f64) -> Result<Self, StratbenchError> {
        if period < 1 {
            return Err(StratbenchError::configuration("RSI period must be at least 1"));
        }
        if !(oversold.is_finite() && overbought.is_finite()) || oversold < 0.0 || overbought < 0.0
        {
            return Err(StratbenchError::configuration(format!(
                "RSI thresholds must be non-negative (oversold {}, overbought {})",
                oversold, overbought
            )));
        }
        if oversold >= overbought {
            return Err(StratbenchError::configuration(format!(
                "RSI oversold {} must be below overbought {}",
                oversold, overbought
            )));
        }
        if oversold > 50.0 || overbought > 100.0 {
            return Err(StratbenchError::configuration(format!(
                "RSI thresholds out of range (oversold {} <= 50, overbought {} <= 100)",
                oversold, overbought
            )));
        }
        Ok(RsiThreshold {
            period,
            oversold,
            overbought,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn oversold(&self) -> f64 {
        self.oversold
    }

    pub fn overbought(&self) -> f64 {
        self.overbought
    }

    pub fn min_candles(&self) -> usize {
        IndicatorType::Rsi(self.period).min_candles()
    }

    fn signal(&self, candles: &[Candle]) -> Signal {
        let Some(value) = rsi(candles, self.period) else {
            return Signal::NotEnoughData;
        };
        if value.is_nan() {
            Signal::Hold
        } else if value < self.oversold {
            Signal::Buy
        } else if value > self.overbought {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

/// MACD line crossing its signal line.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdCrossover {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl MacdCrossover {
    pub const DEFAULT_FAST: usize = 12;
    pub const DEFAULT_SLOW: usize = 26;
    pub const DEFAULT_SIGNAL: usize = 9;

    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, StratbenchError> {
        if fast < 1 || slow < 1 || signal < 1 {
            return Err(StratbenchError::configuration(format!(
                "MACD periods must be positive ({}, {}, {})",
                fast, slow, signal
            )));
        }
        if fast >= slow {
            return Err(StratbenchError::configuration(format!(
                "MACD fast period {} must be below slow period {}",
                fast, slow
            )));
        }
        if fast > 50 || slow > 100 || signal > 50 {
            return Err(StratbenchError::configuration(format!(
                "MACD periods out of range (fast {} <= 50, slow {} <= 100, signal {} <= 50)",
                fast, slow, signal
            )));
        }
        Ok(MacdCrossover { fast, slow, signal })
    }

    pub fn fast(&self) -> usize {
        self.fast
    }

    pub fn slow(&self) -> usize {
        self.slow
    }

    pub fn signal_period(&self) -> usize {
        self.signal
    }

    /// One candle beyond the MACD lookback, to compare consecutive points.
    pub fn min_candles(&self) -> usize {
        self.indicator().min_candles() + 1
    }

    fn indicator(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
        }
    }

    fn signal(&self, candles: &[Candle]) -> Signal {
        if candles.len() < self.min_candles() {
            return Signal::NotEnoughData;
        }
        let series = macd_series(candles, self.fast, self.slow, self.signal);
        let [.., prev, now] = series.as_slice() else {
            return Signal::NotEnoughData;
        };

        if prev.line <= prev.signal && now.line > now.signal {
            Signal::Buy
        } else if prev.line >= prev.signal && now.line < now.signal {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

/// The closed set of atomic strategy variants.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicStrategy {
    Sma(SmaCrossover),
    Rsi(RsiThreshold),
    Macd(MacdCrossover),
}

impl AtomicStrategy {
    pub fn sma(short_window: usize, long_window: usize) -> Result<Self, StratbenchError> {
        SmaCrossover::new(short_window, long_window).map(AtomicStrategy::Sma)
    }

    pub fn rsi(period: usize, oversold: f64, overbought: f64) -> Result<Self, StratbenchError> {
        RsiThreshold::new(period, oversold, overbought).map(AtomicStrategy::Rsi)
    }

    pub fn macd(fast: usize, slow: usize, signal: usize) -> Result<Self, StratbenchError> {
        MacdCrossover::new(fast, slow, signal).map(AtomicStrategy::Macd)
    }

    /// Signal for the newest candle of `candles` (oldest first).
    pub fn get_signal(&self, candles: &[Candle]) -> Signal {
        if candles.len() < self.min_candles() {
            return Signal::NotEnoughData;
        }
        match self {
            AtomicStrategy::Sma(s) => s.signal(candles),
            AtomicStrategy::Rsi(s) => s.signal(candles),
            AtomicStrategy::Macd(s) => s.signal(candles),
        }
    }

    pub fn min_candles(&self) -> usize {
        match self {
            AtomicStrategy::Sma(s) => s.min_candles(),
            AtomicStrategy::Rsi(s) => s.min_candles(),
            AtomicStrategy::Macd(s) => s.min_candles(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            AtomicStrategy::Sma(_) => SMA_TAG,
            AtomicStrategy::Rsi(_) => RSI_TAG,
            AtomicStrategy::Macd(_) => MACD_TAG,
        }
    }

    pub fn to_config(&self) -> AtomicStrategyConfig {
        let parameters = match self {
            AtomicStrategy::Sma(s) => json!({
                "short_window": s.short_window,
                "long_window": s.long_window,
            }),
            AtomicStrategy::Rsi(s) => json!({
                "period": s.period,
                "oversold": s.oversold,
                "overbought": s.overbought,
            }),
            AtomicStrategy::Macd(s) => json!({
                "fast_period": s.fast,
                "slow_period": s.slow,
                "signal_period": s.signal,
            }),
        };
        AtomicStrategyConfig {
            kind: self.tag().to_string(),
            parameters,
        }
    }

    pub(crate) fn sma_from_parameters(params: &Value) -> Result<Self, StratbenchError> {
        AtomicStrategy::sma(
            usize_param(params, "short_window", SmaCrossover::DEFAULT_SHORT)?,
            usize_param(params, "long_window", SmaCrossover::DEFAULT_LONG)?,
        )
    }

    pub(crate) fn rsi_from_parameters(params: &Value) -> Result<Self, StratbenchError> {
        AtomicStrategy::rsi(
            usize_param(params, "period", RsiThreshold::DEFAULT_PERIOD)?,
            f64_param(params, "oversold", RsiThreshold::DEFAULT_OVERSOLD)?,
            f64_param(params, "overbought", RsiThreshold::DEFAULT_OVERBOUGHT)?,
        )
    }

    pub(crate) fn macd_from_parameters(params: &Value) -> Result<Self, StratbenchError> {
        AtomicStrategy::macd(
            usize_param(params, "fast_period", MacdCrossover::DEFAULT_FAST)?,
            usize_param(params, "slow_period", MacdCrossover::DEFAULT_SLOW)?,
            usize_param(params, "signal_period", MacdCrossover::DEFAULT_SIGNAL)?,
        )
    }
}

impl fmt::Display for AtomicStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicStrategy::Sma(s) => write!(f, "SMA({},{})", s.short_window, s.long_window),
            AtomicStrategy::Rsi(s) => {
                write!(f, "RSI({},{},{})", s.period, s.oversold, s.overbought)
            }
            AtomicStrategy::Macd(s) => write!(f, "{}", s.indicator()),
        }
    }
}

fn param<'a>(params: &'a Value, key: &str) -> Result<Option<&'a Value>, StratbenchError> {
    match params {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(map.get(key).filter(|v| !v.is_null())),
        _ => Err(StratbenchError::configuration(
            "strategy parameters must be a JSON object",
        )),
    }
}

fn usize_param(params: &Value, key: &str, default: usize) -> Result<usize, StratbenchError> {
    let Some(value) = param(params, key)? else {
        return Ok(default);
    };
    if let Some(n) = value.as_u64() {
        return usize::try_from(n)
            .map_err(|_| StratbenchError::configuration(format!("{} is too large", key)));
    }
    // Accept integral floats such as 14.0.
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(f as usize),
        _ => Err(StratbenchError::configuration(format!(
            "{} must be a non-negative integer, got {}",
            key, value
        ))),
    }
}

fn f64_param(params: &Value, key: &str, default: f64) -> Result<f64, StratbenchError> {
    let Some(value) = param(params, key)? else {
        return Ok(default);
    };
    value.as_f64().ok_or_else(|| {
        StratbenchError::configuration(format!("{} must be a number, got {}", key, value))
    })
}
