//! Backtest engine: drives a candle series through a strategy engine.
//!
//! At each index `i` the strategy engine sees `candles[..=i]`. A BUY or SELL
//! that differs from the previous traded signal opens a trade entering at the
//! open of candle `i`, which is resolved at once over `candles[i..]`. Only one
//! trade is in flight at a time: signals up to and including the exit candle
//! of the current trade are ignored, and a trade still open at the end of the
//! data blocks every later entry. Only closed trades move the balance.

use crate::domain::candle::Candle;
use crate::domain::engine::StrategyEngine;
use crate::domain::error::StratbenchError;
use crate::domain::metrics::TradeStatistics;
use crate::domain::signal::Signal;
use crate::domain::trade::{Side, Trade, TradeRecord, TradeStatus};
use crate::ports::data_port::DataPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    pub symbol: String,
    pub timeframe: String,
    pub candle_amount: usize,
}

pub struct BacktestEngine<'a> {
    strategy: &'a StrategyEngine,
    candles: &'a [Candle],
    initial_balance: f64,
}

/// Raw outcome of a run: the final balance and every trade with the index
/// of its entry candle.
#[derive(Debug)]
pub struct BacktestRun<'a> {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trades: Vec<(usize, Trade<'a>)>,
}

impl<'a> BacktestEngine<'a> {
    pub fn new(strategy: &'a StrategyEngine, candles: &'a [Candle], initial_balance: f64) -> Self {
        BacktestEngine {
            strategy,
            candles,
            initial_balance,
        }
    }

    pub fn run(&self) -> Result<BacktestRun<'a>, StratbenchError> {
        let candles = self.candles;
        let mut balance = self.initial_balance;
        let mut trades: Vec<(usize, Trade<'a>)> = Vec::new();
        let mut previous_signal = Signal::Hold;
        // Index of the candle the in-flight trade exits on.
        let mut busy_until: Option<usize> = None;

        info!(
            candles = candles.len(),
            initial_balance = balance,
            "backtest started"
        );

        for i in 0..candles.len() {
            let window = &candles[..=i];
            let decision = self.strategy.evaluate(window);
            let Some(side) = Side::from_signal(decision.signal) else {
                continue;
            };
            if decision.signal == previous_signal {
                continue;
            }
            if busy_until.is_some_and(|exit| i <= exit) {
                debug!(index = i, signal = %decision.signal, "signal ignored, trade in flight");
                continue;
            }
            let Some(risk_model) = decision.risk_model else {
                continue;
            };

            let levels = risk_model.resolve(window)?;
            let quantity = risk_model.position_quantity(balance, &levels);
            if !(quantity.is_finite() && quantity > 0.0) {
                warn!(index = i, balance, "no capital to size a trade, signal skipped");
                continue;
            }

            let mut trade = Trade::open(
                &candles[i..],
                side,
                levels.stop_loss_pct,
                levels.take_profit_pct,
                quantity,
            )?;
            let status = trade.execute();

            busy_until = Some(match trade.exit_offset() {
                Some(offset) => i + offset,
                None => candles.len() - 1,
            });
            if let Some(result) = trade.result() {
                balance += result;
            }

            debug!(
                index = i,
                %side,
                entry = trade.entry_price(),
                quantity,
                stop_loss = trade.stop_loss_price(),
                take_profit = trade.take_profit_price(),
                closed = status == TradeStatus::Closed,
                balance,
                "trade opened"
            );

            previous_signal = decision.signal;
            trades.push((i, trade));
        }

        info!(
            trades = trades.len(),
            final_balance = balance,
            "backtest finished"
        );

        Ok(BacktestRun {
            initial_balance: self.initial_balance,
            final_balance: balance,
            trades,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub profit_loss: f64,
    pub total_trades: usize,
    pub total_wins: usize,
    pub total_losses: usize,
    pub not_closed_trades: usize,
    pub statistics: TradeStatistics,
    pub trades: Vec<TradeRecord>,
}

impl BacktestResult {
    pub fn from_run(run: &BacktestRun<'_>) -> Self {
        let trades: Vec<TradeRecord> = run
            .trades
            .iter()
            .map(|(index, trade)| trade.to_record(*index))
            .collect();
        let results: Vec<f64> = trades.iter().filter_map(|t| t.result).collect();

        BacktestResult {
            initial_balance: run.initial_balance,
            final_balance: run.final_balance,
            profit_loss: run.final_balance - run.initial_balance,
            total_trades: trades.len(),
            total_wins: results.iter().filter(|r| **r > 0.0).count(),
            total_losses: results.iter().filter(|r| **r <= 0.0).count(),
            not_closed_trades: trades
                .iter()
                .filter(|t| t.status == TradeStatus::Open)
                .count(),
            statistics: TradeStatistics::compute(run.initial_balance, &results),
            trades,
        }
    }
}

/// Fetch candles from `provider` and run `engine` over them. Provider errors,
/// transient ones included, are returned unchanged.
pub fn run_backtest_from_provider(
    provider: &dyn DataPort,
    engine: &StrategyEngine,
    config: &BacktestConfig,
) -> Result<BacktestResult, StratbenchError> {
    let candles = provider.fetch_candles(&config.symbol, &config.timeframe, config.candle_amount)?;
    if candles.len() < engine.min_candles() {
        warn!(
            symbol = %config.symbol,
            have = candles.len(),
            need = engine.min_candles(),
            "fewer candles than the longest strategy lookback"
        );
    }
    let run = BacktestEngine::new(engine, &candles, config.initial_balance).run()?;
    Ok(BacktestResult::from_run(&run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::atomic::AtomicStrategy;
    use crate::domain::risk::TradeRiskModel;
    use crate::domain::strategy_config::{RiskModelConfig, StopLossConfig};
    use approx::assert_relative_eq;

    fn flat(price: f64) -> Candle {
        Candle::new(price, price, price, price, 1000.0)
    }

    /// RSI(2) engine: BUY while closes fall, SELL while they rise.
    fn rsi_engine(stop_loss: f64, take_profit: f64, size: f64) -> StrategyEngine {
        let model = TradeRiskModel::fixed(stop_loss, take_profit, size).unwrap();
        let mut engine = StrategyEngine::default();
        engine.add_strategy(
            AtomicStrategy::rsi(2, 30.0, 70.0).unwrap(),
            model.clone(),
            model,
            true,
            true,
        );
        engine
    }

    #[test]
    fn no_signal_no_trades() {
        let candles = vec![flat(100.0); 20];
        let engine = rsi_engine(5.0, 5.0, 10.0);
        let run = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap();
        assert!(run.trades.is_empty());
        assert_eq!(run.final_balance, 1000.0);
    }

    #[test]
    fn closed_trade_moves_balance() {
        // down close -> BUY at index 1, entry open 99, TP 10% = 108.9 hit at index 3
        let candles = vec![
            flat(100.0),
            flat(99.0),
            flat(98.0),
            Candle::new(98.0, 110.0, 98.0, 98.0, 1.0),
        ];
        let engine = rsi_engine(5.0, 10.0, 50.0);
        let run = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap();

        assert_eq!(run.trades.len(), 1);
        let (index, trade) = &run.trades[0];
        assert_eq!(*index, 1);
        assert_eq!(trade.side(), Side::Long);
        assert_relative_eq!(trade.entry_price(), 99.0);
        assert_relative_eq!(trade.quantity(), 500.0);
        assert_eq!(trade.exit_offset(), Some(2));
        // 500 * 1.1 - 500
        assert_relative_eq!(run.final_balance, 1050.0, epsilon = 1e-9);
    }

    #[test]
    fn open_trade_leaves_balance_untouched() {
        let candles = vec![flat(100.0), flat(99.0), flat(98.0), flat(98.0)];
        let engine = rsi_engine(5.0, 10.0, 50.0);
        let run = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap();
        assert_eq!(run.trades.len(), 1);
        assert_eq!(run.trades[0].1.status(), TradeStatus::Open);
        assert_eq!(run.final_balance, 1000.0);

        let result = BacktestResult::from_run(&run);
        assert_eq!(result.not_closed_trades, 1);
        assert_eq!(result.total_wins, 0);
        assert_eq!(result.total_losses, 0);
        assert_eq!(result.trades[0].result, None);
    }

    #[test]
    fn open_trade_blocks_later_entries() {
        // BUY at 1 never resolves; the SELLs of the recovery must not open a second trade
        let candles: Vec<Candle> = [100.0, 99.0, 98.0, 98.5, 99.0, 99.5, 100.0]
            .iter()
            .map(|&p| flat(p))
            .collect();
        let engine = rsi_engine(5.0, 10.0, 50.0);
        let run = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap();
        assert_eq!(run.trades.len(), 1);
        assert_eq!(run.trades[0].0, 1);
    }

    #[test]
    fn next_entry_waits_for_exit() {
        // BUY at 1 (entry 99, SL 5% = 94.05) is stopped out on candle 4.
        // The SELL on candle 4 is ignored, the SELL on candle 5 opens.
        let candles = vec![
            flat(100.0),
            flat(99.0),
            flat(98.0),
            flat(98.0),
            Candle::new(98.0, 99.0, 90.0, 99.0, 1.0),
            flat(100.0),
            flat(101.0),
            flat(101.0),
        ];
        let engine = rsi_engine(5.0, 10.0, 50.0);
        let run = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap();

        let entries: Vec<usize> = run.trades.iter().map(|(i, _)| *i).collect();
        assert_eq!(entries, vec![1, 5]);
        assert_eq!(run.trades[0].1.exit_offset(), Some(3));
        assert_eq!(run.trades[1].1.side(), Side::Short);
        // second trade sized from the balance after the stop-loss
        assert_relative_eq!(run.trades[1].1.quantity(), 487.5, epsilon = 1e-9);
    }

    #[test]
    fn repeated_signal_is_not_retraded() {
        // long decline: RSI(2) stays at 0 and keeps saying BUY
        let mut candles: Vec<Candle> = (0..10).map(|i| flat(100.0 - i as f64)).collect();
        // take-profit on the first trade at index 3
        candles[3] = Candle::new(97.0, 120.0, 97.0, 97.0, 1.0);
        let engine = rsi_engine(50.0, 10.0, 10.0);
        let run = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap();
        assert_eq!(run.trades.len(), 1);
        assert_relative_eq!(run.final_balance, 1010.0, epsilon = 1e-9);
    }

    #[test]
    fn relative_stop_loss_without_history_is_fatal() {
        let config = RiskModelConfig {
            stop_loss: StopLossConfig {
                kind: "relative".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let relative = TradeRiskModel::from_config(&config).unwrap();
        let mut engine = StrategyEngine::default();
        engine.add_strategy(
            AtomicStrategy::rsi(2, 30.0, 70.0).unwrap(),
            relative.clone(),
            relative,
            true,
            true,
        );

        let candles = vec![flat(100.0), flat(99.0), flat(98.0), flat(97.0)];
        let err = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap_err();
        assert!(matches!(
            err,
            StratbenchError::InsufficientData { have: 2, need: 15 }
        ));
    }

    #[test]
    fn result_counts() {
        let candles = vec![
            flat(100.0),
            flat(99.0),
            flat(98.0),
            Candle::new(98.0, 110.0, 98.0, 98.0, 1.0),
        ];
        let engine = rsi_engine(5.0, 10.0, 50.0);
        let run = BacktestEngine::new(&engine, &candles, 1000.0).run().unwrap();
        let result = BacktestResult::from_run(&run);

        assert_eq!(result.total_trades, 1);
        assert_eq!(result.total_wins, 1);
        assert_eq!(result.total_losses, 0);
        assert_eq!(result.not_closed_trades, 0);
        assert_relative_eq!(result.profit_loss, 50.0, epsilon = 1e-9);
        assert_relative_eq!(result.statistics.win_rate, 1.0);
        assert_eq!(result.trades[0].exit_index, Some(3));
    }
}
