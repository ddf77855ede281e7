//! Run configuration validation.
//!
//! Validates the INI run configuration before a backtest starts and turns it
//! into a [`BacktestConfig`].

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::StratbenchError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_BALANCE: f64 = 1000.0;
pub const DEFAULT_TIMEFRAME: &str = "1h";
pub const DEFAULT_CANDLE_AMOUNT: i64 = 500;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    validate_initial_balance(config)?;
    validate_symbol(config)?;
    validate_timeframe(config)?;
    validate_candle_amount(config)?;
    Ok(())
}

/// Validate and read `[backtest]`. Missing optional keys take their defaults.
pub fn backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, StratbenchError> {
    validate_backtest_config(config)?;
    Ok(BacktestConfig {
        initial_balance: config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE),
        symbol: required_string(config, "backtest", "symbol")?,
        timeframe: config.get_string_or("backtest", "timeframe", DEFAULT_TIMEFRAME),
        candle_amount: config.get_int("backtest", "candle_amount", DEFAULT_CANDLE_AMOUNT) as usize,
    })
}

/// A key that must be present and non-blank.
pub fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, StratbenchError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(StratbenchError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    if let Some(raw) = config.get_string("backtest", "initial_balance") {
        if raw.trim().parse::<f64>().is_err() {
            return Err(StratbenchError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_balance".to_string(),
                reason: format!("'{}' is not a number", raw),
            });
        }
    }
    let value = config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE);
    if !(value.is_finite() && value > 0.0) {
        return Err(StratbenchError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_balance".to_string(),
            reason: "initial_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    required_string(config, "backtest", "symbol").map(|_| ())
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    match config.get_string("backtest", "timeframe") {
        Some(s) if s.trim().is_empty() => Err(StratbenchError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "timeframe".to_string(),
            reason: "timeframe must not be blank".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_candle_amount(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    if let Some(raw) = config.get_string("backtest", "candle_amount") {
        if raw.trim().parse::<i64>().is_err() {
            return Err(StratbenchError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "candle_amount".to_string(),
                reason: format!("'{}' is not an integer", raw),
            });
        }
    }
    let value = config.get_int("backtest", "candle_amount", DEFAULT_CANDLE_AMOUNT);
    if value < 1 {
        return Err(StratbenchError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "candle_amount".to_string(),
            reason: "candle_amount must be at least 1".to_string(),
        });
    }
    Ok(())
}
