//! Strategy condition: unanimous agreement of a set of atomic strategies.

use crate::domain::atomic::AtomicStrategy;
use crate::domain::candle::Candle;
use crate::domain::risk::TradeRiskModel;
use crate::domain::signal::Signal;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct StrategyCondition {
    strategies: Vec<Arc<AtomicStrategy>>,
    buy_risk_model: TradeRiskModel,
    sell_risk_model: TradeRiskModel,
    do_action_if_buy: bool,
    do_action_if_sell: bool,
}

impl StrategyCondition {
    pub fn new(
        strategies: Vec<Arc<AtomicStrategy>>,
        buy_risk_model: TradeRiskModel,
        sell_risk_model: TradeRiskModel,
        do_action_if_buy: bool,
        do_action_if_sell: bool,
    ) -> Self {
        StrategyCondition {
            strategies,
            buy_risk_model,
            sell_risk_model,
            do_action_if_buy,
            do_action_if_sell,
        }
    }

    /// BUY if every member says BUY (and buying is enabled), else SELL if
    /// every member says SELL (and selling is enabled), else HOLD.
    ///
    /// A member without enough data makes the whole condition HOLD; an empty
    /// condition never fires.
    pub fn evaluate(&self, candles: &[Candle]) -> Signal {
        if self.strategies.is_empty() {
            return Signal::Hold;
        }

        let signals: Vec<Signal> = self
            .strategies
            .iter()
            .map(|s| s.get_signal(candles))
            .collect();
        trace!(window = candles.len(), ?signals, "condition evaluated");

        if signals.contains(&Signal::NotEnoughData) {
            return Signal::Hold;
        }
        if self.do_action_if_buy && signals.iter().all(|s| *s == Signal::Buy) {
            return Signal::Buy;
        }
        if self.do_action_if_sell && signals.iter().all(|s| *s == Signal::Sell) {
            return Signal::Sell;
        }
        Signal::Hold
    }

    /// Buy-side model for BUY, sell-side model for SELL.
    pub fn risk_model_for(&self, signal: Signal) -> Option<&TradeRiskModel> {
        match signal {
            Signal::Buy => Some(&self.buy_risk_model),
            Signal::Sell => Some(&self.sell_risk_model),
            Signal::Hold | Signal::NotEnoughData => None,
        }
    }

    pub fn strategies(&self) -> &[Arc<AtomicStrategy>] {
        &self.strategies
    }

    pub fn buy_risk_model(&self) -> &TradeRiskModel {
        &self.buy_risk_model
    }

    pub fn sell_risk_model(&self) -> &TradeRiskModel {
        &self.sell_risk_model
    }

    pub fn set_buy_risk_model(&mut self, model: TradeRiskModel) {
        self.buy_risk_model = model;
    }

    pub fn set_sell_risk_model(&mut self, model: TradeRiskModel) {
        self.sell_risk_model = model;
    }

    pub fn do_action_if_buy(&self) -> bool {
        self.do_action_if_buy
    }

    pub fn do_action_if_sell(&self) -> bool {
        self.do_action_if_sell
    }
}
