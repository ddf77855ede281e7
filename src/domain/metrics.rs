//! Trade statistics over resolved trades.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStatistics {
    /// Fraction of resolved trades with a positive result.
    pub win_rate: f64,
    pub average_win: f64,
    /// Magnitude of the mean losing result.
    pub average_loss: f64,
    pub largest_win: f64,
    /// Magnitude of the worst result.
    pub largest_loss: f64,
    /// Gross profit / gross loss. Infinite with wins and no losses, serialized as null.
    pub profit_factor: Option<f64>,
    /// Largest peak-to-trough fall of the realised balance, as a fraction of the peak.
    pub max_drawdown: f64,
}

impl TradeStatistics {
    /// `results` are the resolved trade results in the order they were booked.
    pub fn compute(initial_balance: f64, results: &[f64]) -> Self {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for &result in results {
            if result > 0.0 {
                wins += 1;
                gross_profit += result;
                largest_win = largest_win.max(result);
            } else {
                losses += 1;
                gross_loss += result.abs();
                largest_loss = largest_loss.max(result.abs());
            }
        }

        let total = wins + losses;
        let win_rate = if total > 0 {
            wins as f64 / total as f64
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            Some(gross_profit / gross_loss)
        } else if gross_profit > 0.0 {
            None
        } else {
            Some(0.0)
        };

        let average_win = if wins > 0 {
            gross_profit / wins as f64
        } else {
            0.0
        };

        let average_loss = if losses > 0 {
            gross_loss / losses as f64
        } else {
            0.0
        };

        TradeStatistics {
            win_rate,
            average_win,
            average_loss,
            largest_win,
            largest_loss,
            profit_factor,
            max_drawdown: compute_drawdown(initial_balance, results),
        }
    }
}

fn compute_drawdown(initial_balance: f64, results: &[f64]) -> f64 {
    let mut balance = initial_balance;
    let mut peak = initial_balance;
    let mut max_dd = 0.0_f64;

    for result in results {
        balance += result;
        if balance > peak {
            peak = balance;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - balance) / peak);
        }
    }
    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_results() {
        let stats = TradeStatistics::compute(1000.0, &[]);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.profit_factor, Some(0.0));
        assert_eq!(stats.max_drawdown, 0.0);
    }

    #[test]
    fn mixed_results() {
        let stats = TradeStatistics::compute(1000.0, &[100.0, -50.0, 200.0, -150.0]);
        assert_relative_eq!(stats.win_rate, 0.5);
        assert_relative_eq!(stats.average_win, 150.0);
        assert_relative_eq!(stats.average_loss, 100.0);
        assert_relative_eq!(stats.largest_win, 200.0);
        assert_relative_eq!(stats.largest_loss, 150.0);
        assert_relative_eq!(stats.profit_factor.unwrap(), 1.5);
    }

    #[test]
    fn breakeven_counts_as_loss() {
        let stats = TradeStatistics::compute(1000.0, &[10.0, 0.0]);
        assert_relative_eq!(stats.win_rate, 0.5);
        assert_relative_eq!(stats.average_loss, 0.0);
    }

    #[test]
    fn only_wins_has_unbounded_profit_factor() {
        let stats = TradeStatistics::compute(1000.0, &[10.0, 20.0]);
        assert_eq!(stats.profit_factor, None);
        assert_eq!(stats.max_drawdown, 0.0);
    }

    #[test]
    fn drawdown_from_peak() {
        // 1000 -> 1200 (peak) -> 900 -> 1100
        let stats = TradeStatistics::compute(1000.0, &[200.0, -300.0, 200.0]);
        assert_relative_eq!(stats.max_drawdown, 0.25);
    }

    #[test]
    fn serializes_unbounded_profit_factor_as_null() {
        let stats = TradeStatistics::compute(1000.0, &[10.0]);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["profit_factor"].is_null());
    }
}
