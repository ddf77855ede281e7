//! JSON backtest report adapter.
//!
//! Writes the whole [`BacktestResult`] (summary, statistics, per-trade
//! records) as pretty-printed JSON.

use std::fs;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StratbenchError;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, result: &BacktestResult) -> Result<String, StratbenchError> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), StratbenchError> {
        let json = self.render(result)?;
        fs::write(output_path, json)?;
        Ok(())
    }
}
