//! CSV trade list report adapter. One row per trade, in entry order.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StratbenchError;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Default)]
pub struct CsvTradesReportAdapter;

impl CsvTradesReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for CsvTradesReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), StratbenchError> {
        let mut wtr = csv::Writer::from_path(output_path)?;
        for record in &result.trades {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
