//! Directional output of a strategy evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    /// The window is shorter than the indicator's minimum lookback.
    /// Distinct from `Hold`, which is a computed neutral result.
    NotEnoughData,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
            Signal::NotEnoughData => "NOT_ENOUGH_DATA",
        };
        f.write_str(s)
    }
}
