//! A single simulated position, resolved against forward candles.
//!
//! A trade enters at the open of the first candle of its slice and is then
//! checked against every later candle. When one candle touches both the
//! stop-loss and the take-profit, the stop-loss is taken. The exit price is
//! the threshold itself, not the candle close. A trade that is never
//! triggered stays OPEN.

use crate::domain::candle::Candle;
use crate::domain::error::StratbenchError;
use crate::domain::signal::Signal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// BUY opens a long, SELL a short.
    pub fn from_signal(signal: Signal) -> Option<Side> {
        match signal {
            Signal::Buy => Some(Side::Long),
            Signal::Sell => Some(Side::Short),
            Signal::Hold | Signal::NotEnoughData => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Long => "long",
            Side::Short => "short",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

#[derive(Debug, Clone)]
pub struct Trade<'a> {
    candles: &'a [Candle],
    side: Side,
    entry_price: f64,
    quantity: f64,
    stop_loss_price: f64,
    take_profit_price: f64,
    exit_price: Option<f64>,
    exit_offset: Option<usize>,
    exit_reason: Option<ExitReason>,
    status: TradeStatus,
}

impl<'a> Trade<'a> {
    /// Open a trade on `candles[0]`. Percentages are in percent (5.0 = 5 %),
    /// `quantity` is notional in account currency.
    pub fn open(
        candles: &'a [Candle],
        side: Side,
        stop_loss_pct: f64,
        take_profit_pct: f64,
        quantity: f64,
    ) -> Result<Self, StratbenchError> {
        let Some(entry) = candles.first() else {
            return Err(StratbenchError::InsufficientData { have: 0, need: 1 });
        };
        for (name, value) in [
            ("stop_loss_pct", stop_loss_pct),
            ("take_profit_pct", take_profit_pct),
            ("quantity", quantity),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StratbenchError::InvalidRisk {
                    reason: format!("{} must be positive, got {}", name, value),
                });
            }
        }
        if !(entry.open.is_finite() && entry.open > 0.0) {
            return Err(StratbenchError::InvalidRisk {
                reason: format!("entry price must be positive, got {}", entry.open),
            });
        }

        let entry_price = entry.open;
        let (stop_loss_price, take_profit_price) = match side {
            Side::Long => (
                entry_price * (1.0 - stop_loss_pct / 100.0),
                entry_price * (1.0 + take_profit_pct / 100.0),
            ),
            Side::Short => (
                entry_price * (1.0 + stop_loss_pct / 100.0),
                entry_price * (1.0 - take_profit_pct / 100.0),
            ),
        };
        for (name, price) in [
            ("stop-loss price", stop_loss_price),
            ("take-profit price", take_profit_price),
        ] {
            if !(price.is_finite() && price > 0.0) {
                return Err(StratbenchError::InvalidRisk {
                    reason: format!("{} must be positive, got {}", name, price),
                });
            }
        }

        Ok(Trade {
            candles,
            side,
            entry_price,
            quantity,
            stop_loss_price,
            take_profit_price,
            exit_price: None,
            exit_offset: None,
            exit_reason: None,
            status: TradeStatus::Open,
        })
    }

    /// Scan forward from the second candle until a threshold is touched.
    /// Calling it again on a closed trade is a no-op.
    pub fn execute(&mut self) -> TradeStatus {
        if self.status == TradeStatus::Closed {
            return self.status;
        }

        for (offset, candle) in self.candles.iter().enumerate().skip(1) {
            let (stop_hit, target_hit) = match self.side {
                Side::Long => (
                    candle.low <= self.stop_loss_price,
                    candle.high >= self.take_profit_price,
                ),
                Side::Short => (
                    candle.high >= self.stop_loss_price,
                    candle.low <= self.take_profit_price,
                ),
            };

            if stop_hit {
                self.close(offset, self.stop_loss_price, ExitReason::StopLoss);
                break;
            }
            if target_hit {
                self.close(offset, self.take_profit_price, ExitReason::TakeProfit);
                break;
            }
        }
        self.status
    }

    fn close(&mut self, offset: usize, price: f64, reason: ExitReason) {
        self.exit_offset = Some(offset);
        self.exit_price = Some(price);
        self.exit_reason = Some(reason);
        self.status = TradeStatus::Closed;
    }

    /// Profit or loss in account currency; `None` while open.
    pub fn result(&self) -> Option<f64> {
        let exit = self.exit_price?;
        let ratio = match self.side {
            Side::Long => exit / self.entry_price,
            Side::Short => self.entry_price / exit,
        };
        Some(ratio * self.quantity - self.quantity)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn status(&self) -> TradeStatus {
        self.status
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn stop_loss_price(&self) -> f64 {
        self.stop_loss_price
    }

    pub fn take_profit_price(&self) -> f64 {
        self.take_profit_price
    }

    pub fn exit_price(&self) -> Option<f64> {
        self.exit_price
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit_reason
    }

    /// Index of the exit candle within the trade's own slice.
    pub fn exit_offset(&self) -> Option<usize> {
        self.exit_offset
    }

    /// Serializable snapshot. `entry_index` is the position of the entry
    /// candle in the full series.
    pub fn to_record(&self, entry_index: usize) -> TradeRecord {
        let exit_candle = self.exit_offset.and_then(|o| self.candles.get(o));
        TradeRecord {
            entry_index,
            exit_index: self.exit_offset.map(|o| entry_index + o),
            entry_time: self.candles.first().and_then(|c| c.open_time),
            exit_time: exit_candle.and_then(|c| c.close_time.or(c.open_time)),
            side: self.side,
            status: self.status,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            stop_loss_price: self.stop_loss_price,
            take_profit_price: self.take_profit_price,
            quantity: self.quantity,
            exit_reason: self.exit_reason,
            result: self.result(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_index: usize,
    pub exit_index: Option<usize>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub side: Side,
    pub status: TradeStatus,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub stop_loss_price: f64,
    pub take_profit_price: f64,
    pub quantity: f64,
    pub exit_reason: Option<ExitReason>,
    pub result: Option<f64>,
}
