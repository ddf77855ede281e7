//! Domain error types.

/// Top-level error type for stratbench.
#[derive(Debug, thiserror::Error)]
pub enum StratbenchError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient data: have {have} candles, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("invalid risk parameters: {reason}")]
    InvalidRisk { reason: String },

    #[error("market data temporarily unavailable: {reason}")]
    MarketDataUnavailable { reason: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StratbenchError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        StratbenchError::Configuration {
            reason: reason.into(),
        }
    }

    /// True for upstream faults a caller may retry or surface as
    /// "service unavailable" instead of treating as a hard failure.
    pub fn is_transient(&self) -> bool {
        matches!(self, StratbenchError::MarketDataUnavailable { .. })
    }
}

impl From<&StratbenchError> for std::process::ExitCode {
    fn from(err: &StratbenchError) -> Self {
        let code: u8 = match err {
            StratbenchError::Io(_) => 1,
            StratbenchError::ConfigParse { .. }
            | StratbenchError::ConfigMissing { .. }
            | StratbenchError::ConfigInvalid { .. } => 2,
            StratbenchError::Configuration { .. } | StratbenchError::Json(_) => 4,
            StratbenchError::InsufficientData { .. }
            | StratbenchError::DataSource { .. }
            | StratbenchError::Csv(_) => 5,
            StratbenchError::MarketDataUnavailable { .. } => 6,
            StratbenchError::InvalidRisk { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}
