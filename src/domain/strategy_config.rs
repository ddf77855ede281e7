//! Serializable strategy configuration.
//!
//! This is the document form of a [`StrategyEngine`](crate::domain::engine::StrategyEngine):
//! an ordered list of conditions, each naming its atomic strategies by type tag
//! and carrying optional buy/sell risk models. Missing fields take the same
//! defaults as the in-memory types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub conditions: Vec<ConditionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfig {
    #[serde(default)]
    pub strategies: Vec<AtomicStrategyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_risk_model: Option<RiskModelConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell_risk_model: Option<RiskModelConfig>,
    #[serde(default = "default_true")]
    pub do_action_if_buy: bool,
    #[serde(default = "default_true")]
    pub do_action_if_sell: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicStrategyConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskModelConfig {
    #[serde(default)]
    pub stop_loss: StopLossConfig,
    #[serde(default)]
    pub take_profit: TakeProfitConfig,
    #[serde(default)]
    pub position_size: PositionSizeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopLossConfig {
    #[serde(rename = "type", default = "default_fixed")]
    pub kind: String,
    #[serde(default = "default_stop_loss_pct")]
    pub percentage: f64,
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    #[serde(default = "default_atr_multiplier")]
    pub atr_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfitConfig {
    #[serde(rename = "type", default = "default_fixed")]
    pub kind: String,
    #[serde(default = "default_take_profit_pct")]
    pub percentage: f64,
    #[serde(default = "default_take_profit_multiplier")]
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizeConfig {
    #[serde(rename = "type", default = "default_fixed")]
    pub kind: String,
    #[serde(default = "default_position_size_pct")]
    pub percentage: f64,
    #[serde(default = "default_risk_budget")]
    pub risk_budget: f64,
}

pub const DEFAULT_STOP_LOSS_PCT: f64 = 5.0;
pub const DEFAULT_TAKE_PROFIT_PCT: f64 = 10.0;
pub const DEFAULT_POSITION_SIZE_PCT: f64 = 5.0;
pub const DEFAULT_RISK_BUDGET_PCT: f64 = 2.0;
pub const DEFAULT_TAKE_PROFIT_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_ATR_PERIOD: usize = 14;
pub const DEFAULT_ATR_MULTIPLIER: f64 = 1.5;

fn default_true() -> bool {
    true
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn default_fixed() -> String {
    "fixed".to_string()
}

fn default_stop_loss_pct() -> f64 {
    DEFAULT_STOP_LOSS_PCT
}

fn default_take_profit_pct() -> f64 {
    DEFAULT_TAKE_PROFIT_PCT
}

fn default_position_size_pct() -> f64 {
    DEFAULT_POSITION_SIZE_PCT
}

fn default_risk_budget() -> f64 {
    DEFAULT_RISK_BUDGET_PCT
}

fn default_take_profit_multiplier() -> f64 {
    DEFAULT_TAKE_PROFIT_MULTIPLIER
}

fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}

fn default_atr_multiplier() -> f64 {
    DEFAULT_ATR_MULTIPLIER
}

impl Default for StopLossConfig {
    fn default() -> Self {
        StopLossConfig {
            kind: default_fixed(),
            percentage: DEFAULT_STOP_LOSS_PCT,
            atr_period: DEFAULT_ATR_PERIOD,
            atr_multiplier: DEFAULT_ATR_MULTIPLIER,
        }
    }
}

impl Default for TakeProfitConfig {
    fn default() -> Self {
        TakeProfitConfig {
            kind: default_fixed(),
            percentage: DEFAULT_TAKE_PROFIT_PCT,
            multiplier: DEFAULT_TAKE_PROFIT_MULTIPLIER,
        }
    }
}

impl Default for PositionSizeConfig {
    fn default() -> Self {
        PositionSizeConfig {
            kind: default_fixed(),
            percentage: DEFAULT_POSITION_SIZE_PCT,
            risk_budget: DEFAULT_RISK_BUDGET_PCT,
        }
    }
}
