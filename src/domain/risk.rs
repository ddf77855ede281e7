//! Trade risk model: stop-loss, take-profit and position-size percentages.
//!
//! Each of the three values is either fixed or derived:
//!
//! - stop-loss `relative`: `atr_multiplier * ATR(atr_period) / close * 100`,
//!   using the close of the newest candle in the window as the reference price
//! - take-profit `relative`: resolved stop-loss times `take_profit_multiplier`
//! - position size `relative` / `sl-based`: `risk_budget / stop_loss * 100`,
//!   so that the loss at the stop stays close to `risk_budget` percent of the
//!   balance whatever the stop distance
//!
//! Derived values are recomputed per entry by [`TradeRiskModel::resolve`].

use crate::domain::candle::Candle;
use crate::domain::error::StratbenchError;
use crate::domain::indicator::{IndicatorType, average_true_range};
use crate::domain::strategy_config::{
    DEFAULT_ATR_MULTIPLIER, DEFAULT_ATR_PERIOD, DEFAULT_POSITION_SIZE_PCT,
    DEFAULT_RISK_BUDGET_PCT, DEFAULT_STOP_LOSS_PCT, DEFAULT_TAKE_PROFIT_MULTIPLIER,
    DEFAULT_TAKE_PROFIT_PCT, PositionSizeConfig, RiskModelConfig, StopLossConfig,
    TakeProfitConfig,
};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopLossType {
    Fixed,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeProfitType {
    Fixed,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSizeType {
    Fixed,
    Relative,
    SlBased,
}

impl FromStr for StopLossType {
    type Err = StratbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(StopLossType::Fixed),
            "relative" => Ok(StopLossType::Relative),
            other => Err(StratbenchError::configuration(format!(
                "invalid stop_loss type '{}': use 'fixed' or 'relative'",
                other
            ))),
        }
    }
}

impl FromStr for TakeProfitType {
    type Err = StratbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(TakeProfitType::Fixed),
            "relative" => Ok(TakeProfitType::Relative),
            other => Err(StratbenchError::configuration(format!(
                "invalid take_profit type '{}': use 'fixed' or 'relative'",
                other
            ))),
        }
    }
}

impl FromStr for PositionSizeType {
    type Err = StratbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(PositionSizeType::Fixed),
            "relative" => Ok(PositionSizeType::Relative),
            "sl-based" => Ok(PositionSizeType::SlBased),
            other => Err(StratbenchError::configuration(format!(
                "invalid position_size type '{}': use 'fixed', 'relative' or 'sl-based'",
                other
            ))),
        }
    }
}

impl fmt::Display for StopLossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopLossType::Fixed => "fixed",
            StopLossType::Relative => "relative",
        })
    }
}

impl fmt::Display for TakeProfitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TakeProfitType::Fixed => "fixed",
            TakeProfitType::Relative => "relative",
        })
    }
}

impl fmt::Display for PositionSizeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PositionSizeType::Fixed => "fixed",
            PositionSizeType::Relative => "relative",
            PositionSizeType::SlBased => "sl-based",
        })
    }
}

/// Percentages resolved for one entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub position_size_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRiskModel {
    stop_loss_type: StopLossType,
    stop_loss_pct: f64,
    atr_period: usize,
    atr_multiplier: f64,
    take_profit_type: TakeProfitType,
    take_profit_pct: f64,
    take_profit_multiplier: f64,
    position_size_type: PositionSizeType,
    position_size_pct: f64,
    risk_budget_pct: f64,
}

impl Default for TradeRiskModel {
    fn default() -> Self {
        TradeRiskModel {
            stop_loss_type: StopLossType::Fixed,
            stop_loss_pct: DEFAULT_STOP_LOSS_PCT,
            atr_period: DEFAULT_ATR_PERIOD,
            atr_multiplier: DEFAULT_ATR_MULTIPLIER,
            take_profit_type: TakeProfitType::Fixed,
            take_profit_pct: DEFAULT_TAKE_PROFIT_PCT,
            take_profit_multiplier: DEFAULT_TAKE_PROFIT_MULTIPLIER,
            position_size_type: PositionSizeType::Fixed,
            position_size_pct: DEFAULT_POSITION_SIZE_PCT,
            risk_budget_pct: DEFAULT_RISK_BUDGET_PCT,
        }
    }
}

impl TradeRiskModel {
    /// All-fixed model.
    pub fn fixed(
        stop_loss_pct: f64,
        take_profit_pct: f64,
        position_size_pct: f64,
    ) -> Result<Self, StratbenchError> {
        let mut model = TradeRiskModel::default();
        model.set_stop_loss(StopLossType::Fixed, stop_loss_pct, None)?;
        model.set_take_profit(
            TakeProfitType::Fixed,
            take_profit_pct,
            DEFAULT_TAKE_PROFIT_MULTIPLIER,
        )?;
        model.set_position_size(
            PositionSizeType::Fixed,
            position_size_pct,
            DEFAULT_RISK_BUDGET_PCT,
        )?;
        Ok(model)
    }

    /// Build from type strings as they appear in configuration documents.
    /// A relative stop-loss keeps `stop_loss_pct` as its value until resolved
    /// against candles.
    pub fn from_parts(
        stop_loss_type: &str,
        stop_loss_pct: f64,
        take_profit_type: &str,
        take_profit_pct: f64,
        position_size_type: &str,
        position_size_pct: f64,
    ) -> Result<Self, StratbenchError> {
        let mut model = TradeRiskModel::default();
        model.apply_stop_loss(stop_loss_type.parse()?, stop_loss_pct)?;
        model.set_take_profit(
            take_profit_type.parse()?,
            take_profit_pct,
            DEFAULT_TAKE_PROFIT_MULTIPLIER,
        )?;
        model.set_position_size(
            position_size_type.parse()?,
            position_size_pct,
            DEFAULT_RISK_BUDGET_PCT,
        )?;
        Ok(model)
    }

    pub fn from_config(config: &RiskModelConfig) -> Result<Self, StratbenchError> {
        let mut model = TradeRiskModel::default();
        model.set_atr(config.stop_loss.atr_period, config.stop_loss.atr_multiplier)?;
        model.apply_stop_loss(config.stop_loss.kind.parse()?, config.stop_loss.percentage)?;
        model.set_take_profit(
            config.take_profit.kind.parse()?,
            config.take_profit.percentage,
            config.take_profit.multiplier,
        )?;
        model.set_position_size(
            config.position_size.kind.parse()?,
            config.position_size.percentage,
            config.position_size.risk_budget,
        )?;
        Ok(model)
    }

    pub fn to_config(&self) -> RiskModelConfig {
        RiskModelConfig {
            stop_loss: StopLossConfig {
                kind: self.stop_loss_type.to_string(),
                percentage: self.stop_loss_pct,
                atr_period: self.atr_period,
                atr_multiplier: self.atr_multiplier,
            },
            take_profit: TakeProfitConfig {
                kind: self.take_profit_type.to_string(),
                percentage: self.take_profit_pct,
                multiplier: self.take_profit_multiplier,
            },
            position_size: PositionSizeConfig {
                kind: self.position_size_type.to_string(),
                percentage: self.position_size_pct,
                risk_budget: self.risk_budget_pct,
            },
        }
    }

    /// Set the stop-loss. A relative stop-loss is derived from `candles`
    /// immediately; dependent take-profit and position size are re-derived.
    /// Returns the stop-loss percentage now in effect.
    pub fn set_stop_loss(
        &mut self,
        kind: StopLossType,
        stop_loss_pct: f64,
        candles: Option<&[Candle]>,
    ) -> Result<f64, StratbenchError> {
        let pct = match kind {
            StopLossType::Fixed => stop_loss_pct,
            StopLossType::Relative => {
                require_positive("stop_loss percentage", stop_loss_pct)?;
                self.relative_stop_loss_pct(candles.unwrap_or(&[]))?
            }
        };
        self.apply_stop_loss(kind, pct)?;
        Ok(self.stop_loss_pct)
    }

    /// Returns the take-profit percentage now in effect.
    pub fn set_take_profit(
        &mut self,
        kind: TakeProfitType,
        take_profit_pct: f64,
        multiplier: f64,
    ) -> Result<f64, StratbenchError> {
        require_positive("take_profit percentage", take_profit_pct)?;
        require_positive("take_profit multiplier", multiplier)?;
        self.take_profit_type = kind;
        self.take_profit_multiplier = multiplier;
        self.take_profit_pct = match kind {
            TakeProfitType::Fixed => take_profit_pct,
            TakeProfitType::Relative => self.stop_loss_pct * multiplier,
        };
        Ok(self.take_profit_pct)
    }

    /// Returns the position size percentage now in effect.
    pub fn set_position_size(
        &mut self,
        kind: PositionSizeType,
        position_size_pct: f64,
        risk_budget_pct: f64,
    ) -> Result<f64, StratbenchError> {
        require_positive("position_size percentage", position_size_pct)?;
        require_positive("position_size risk_budget", risk_budget_pct)?;
        self.position_size_type = kind;
        self.risk_budget_pct = risk_budget_pct;
        self.position_size_pct = match kind {
            PositionSizeType::Fixed => position_size_pct,
            PositionSizeType::Relative | PositionSizeType::SlBased => {
                risk_budget_pct / self.stop_loss_pct * 100.0
            }
        };
        Ok(self.position_size_pct)
    }

    pub fn set_atr(&mut self, period: usize, multiplier: f64) -> Result<(), StratbenchError> {
        if period < 1 {
            return Err(StratbenchError::configuration("atr_period must be at least 1"));
        }
        require_positive("atr_multiplier", multiplier)?;
        self.atr_period = period;
        self.atr_multiplier = multiplier;
        Ok(())
    }

    /// Resolve all three percentages for an entry on the newest candle of
    /// `window`. Fixed values pass through; derived values are computed from
    /// the window.
    pub fn resolve(&self, window: &[Candle]) -> Result<RiskLevels, StratbenchError> {
        let stop_loss_pct = match self.stop_loss_type {
            StopLossType::Fixed => self.stop_loss_pct,
            StopLossType::Relative => self.relative_stop_loss_pct(window)?,
        };
        let take_profit_pct = match self.take_profit_type {
            TakeProfitType::Fixed => self.take_profit_pct,
            TakeProfitType::Relative => stop_loss_pct * self.take_profit_multiplier,
        };
        let position_size_pct = match self.position_size_type {
            PositionSizeType::Fixed => self.position_size_pct,
            PositionSizeType::Relative | PositionSizeType::SlBased => {
                self.risk_budget_pct / stop_loss_pct * 100.0
            }
        };
        Ok(RiskLevels {
            stop_loss_pct,
            take_profit_pct,
            position_size_pct,
        })
    }

    /// Notional quantity in account currency.
    pub fn position_quantity(&self, balance: f64, levels: &RiskLevels) -> f64 {
        balance * levels.position_size_pct / 100.0
    }

    pub fn stop_loss_type(&self) -> StopLossType {
        self.stop_loss_type
    }

    pub fn stop_loss_pct(&self) -> f64 {
        self.stop_loss_pct
    }

    pub fn take_profit_type(&self) -> TakeProfitType {
        self.take_profit_type
    }

    pub fn take_profit_pct(&self) -> f64 {
        self.take_profit_pct
    }

    pub fn position_size_type(&self) -> PositionSizeType {
        self.position_size_type
    }

    pub fn position_size_pct(&self) -> f64 {
        self.position_size_pct
    }

    pub fn risk_budget_pct(&self) -> f64 {
        self.risk_budget_pct
    }

    pub fn atr_period(&self) -> usize {
        self.atr_period
    }

    pub fn atr_multiplier(&self) -> f64 {
        self.atr_multiplier
    }

    /// Store a stop-loss value and re-derive whatever depends on it.
    fn apply_stop_loss(&mut self, kind: StopLossType, pct: f64) -> Result<(), StratbenchError> {
        require_positive("stop_loss percentage", pct)?;
        self.stop_loss_type = kind;
        self.stop_loss_pct = pct;
        if self.take_profit_type == TakeProfitType::Relative {
            self.take_profit_pct = pct * self.take_profit_multiplier;
        }
        if self.position_size_type != PositionSizeType::Fixed {
            self.position_size_pct = self.risk_budget_pct / pct * 100.0;
        }
        Ok(())
    }

    fn relative_stop_loss_pct(&self, candles: &[Candle]) -> Result<f64, StratbenchError> {
        let atr = average_true_range(candles, self.atr_period).ok_or(
            StratbenchError::InsufficientData {
                have: candles.len(),
                need: IndicatorType::Atr(self.atr_period).min_candles(),
            },
        )?;
        let reference = candles.last().map(|c| c.close).unwrap_or(0.0);
        let pct = self.atr_multiplier * atr / reference * 100.0;
        if !(pct.is_finite() && pct > 0.0) {
            return Err(StratbenchError::InvalidRisk {
                reason: format!(
                    "relative stop-loss resolved to {} (ATR {}, close {})",
                    pct, atr, reference
                ),
            });
        }
        Ok(pct)
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), StratbenchError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StratbenchError::configuration(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}
