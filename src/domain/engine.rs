//! Strategy engine: ordered, first-match-wins list of conditions.

use crate::domain::atomic::AtomicStrategy;
use crate::domain::candle::Candle;
use crate::domain::condition::StrategyCondition;
use crate::domain::error::StratbenchError;
use crate::domain::registry::StrategyRegistry;
use crate::domain::risk::TradeRiskModel;
use crate::domain::signal::Signal;
use crate::domain::strategy_config::{ConditionConfig, StrategyConfig};
use crate::ports::data_port::DataPort;
use std::sync::Arc;
use tracing::trace;

/// Result of one engine evaluation. `risk_model` and `condition` are set
/// only for BUY/SELL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSignal<'a> {
    pub signal: Signal,
    pub risk_model: Option<&'a TradeRiskModel>,
    pub condition: Option<usize>,
}

impl EngineSignal<'_> {
    fn hold() -> Self {
        EngineSignal {
            signal: Signal::Hold,
            risk_model: None,
            condition: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StrategyEngine {
    conditions: Vec<StrategyCondition>,
}

impl StrategyEngine {
    pub fn new(conditions: Vec<StrategyCondition>) -> Self {
        StrategyEngine { conditions }
    }

    /// Evaluate conditions in order; the first BUY or SELL wins.
    pub fn evaluate(&self, candles: &[Candle]) -> EngineSignal<'_> {
        for (index, condition) in self.conditions.iter().enumerate() {
            let signal = condition.evaluate(candles);
            if let Some(risk_model) = condition.risk_model_for(signal) {
                trace!(condition = index, %signal, "condition fired");
                return EngineSignal {
                    signal,
                    risk_model: Some(risk_model),
                    condition: Some(index),
                };
            }
        }
        EngineSignal::hold()
    }

    /// Fetch the newest `count` candles from `provider` and evaluate them.
    /// Provider errors, transient ones included, are returned unchanged.
    pub fn signal_from_provider(
        &self,
        provider: &dyn DataPort,
        symbol: &str,
        timeframe: &str,
        count: usize,
    ) -> Result<EngineSignal<'_>, StratbenchError> {
        let candles = provider.fetch_candles(symbol, timeframe, count)?;
        Ok(self.evaluate(&candles))
    }

    pub fn add_condition(&mut self, condition: StrategyCondition) {
        self.conditions.push(condition);
    }

    /// Append a condition holding a single atomic strategy.
    pub fn add_strategy(
        &mut self,
        strategy: AtomicStrategy,
        buy_risk_model: TradeRiskModel,
        sell_risk_model: TradeRiskModel,
        do_action_if_buy: bool,
        do_action_if_sell: bool,
    ) {
        self.add_condition(StrategyCondition::new(
            vec![Arc::new(strategy)],
            buy_risk_model,
            sell_risk_model,
            do_action_if_buy,
            do_action_if_sell,
        ));
    }

    pub fn conditions(&self) -> &[StrategyCondition] {
        &self.conditions
    }

    /// Longest lookback any member strategy needs.
    pub fn min_candles(&self) -> usize {
        self.conditions
            .iter()
            .flat_map(|c| c.strategies())
            .map(|s| s.min_candles())
            .max()
            .unwrap_or(0)
    }

    pub fn from_config(
        config: &StrategyConfig,
        registry: &StrategyRegistry,
    ) -> Result<Self, StratbenchError> {
        let conditions = config
            .conditions
            .iter()
            .map(|c| condition_from_config(c, registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StrategyEngine::new(conditions))
    }

    pub fn to_config(&self) -> StrategyConfig {
        StrategyConfig {
            conditions: self
                .conditions
                .iter()
                .map(|c| ConditionConfig {
                    strategies: c.strategies().iter().map(|s| s.to_config()).collect(),
                    buy_risk_model: Some(c.buy_risk_model().to_config()),
                    sell_risk_model: Some(c.sell_risk_model().to_config()),
                    do_action_if_buy: c.do_action_if_buy(),
                    do_action_if_sell: c.do_action_if_sell(),
                })
                .collect(),
        }
    }

    pub fn from_json(json: &str, registry: &StrategyRegistry) -> Result<Self, StratbenchError> {
        let config: StrategyConfig = serde_json::from_str(json)?;
        Self::from_config(&config, registry)
    }

    pub fn to_json(&self) -> Result<String, StratbenchError> {
        Ok(serde_json::to_string_pretty(&self.to_config())?)
    }
}

fn condition_from_config(
    config: &ConditionConfig,
    registry: &StrategyRegistry,
) -> Result<StrategyCondition, StratbenchError> {
    let strategies = config
        .strategies
        .iter()
        .map(|s| registry.build(s).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
    let buy_risk_model = match &config.buy_risk_model {
        Some(risk) => TradeRiskModel::from_config(risk)?,
        None => TradeRiskModel::default(),
    };
    let sell_risk_model = match &config.sell_risk_model {
        Some(risk) => TradeRiskModel::from_config(risk)?,
        None => TradeRiskModel::default(),
    };
    Ok(StrategyCondition::new(
        strategies,
        buy_risk_model,
        sell_risk_model,
        config.do_action_if_buy,
        config.do_action_if_sell,
    ))
}
