//! Candle provider port.

use crate::domain::candle::Candle;
use crate::domain::error::StratbenchError;

pub trait DataPort {
    /// The newest `count` candles for `symbol` on `timeframe`, oldest first.
    ///
    /// Upstream faults that may clear on retry are reported as
    /// [`StratbenchError::MarketDataUnavailable`]; the caller decides whether
    /// to retry.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        count: usize,
    ) -> Result<Vec<Candle>, StratbenchError>;

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, StratbenchError>;
}
