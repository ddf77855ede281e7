//! Atomic strategy registry: type tag -> constructor.

use crate::domain::atomic::{AtomicStrategy, MACD_TAG, RSI_TAG, SMA_TAG};
use crate::domain::error::StratbenchError;
use crate::domain::strategy_config::AtomicStrategyConfig;
use serde_json::Value;
use std::collections::HashMap;

pub type StrategyConstructor = fn(&Value) -> Result<AtomicStrategy, StratbenchError>;

#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    constructors: HashMap<String, StrategyConstructor>,
}

impl StrategyRegistry {
    /// Registry with the built-in SMA, RSI and MACD strategies.
    pub fn new() -> Self {
        let mut registry = StrategyRegistry {
            constructors: HashMap::new(),
        };
        registry.register(SMA_TAG, AtomicStrategy::sma_from_parameters);
        registry.register(RSI_TAG, AtomicStrategy::rsi_from_parameters);
        registry.register(MACD_TAG, AtomicStrategy::macd_from_parameters);
        registry
    }

    pub fn register(&mut self, tag: &str, constructor: StrategyConstructor) {
        self.constructors.insert(normalize_tag(tag), constructor);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(&normalize_tag(tag))
    }

    pub fn build(&self, config: &AtomicStrategyConfig) -> Result<AtomicStrategy, StratbenchError> {
        let constructor = self
            .constructors
            .get(&normalize_tag(&config.kind))
            .ok_or_else(|| {
                StratbenchError::configuration(format!(
                    "unknown strategy type '{}' (known: {})",
                    config.kind,
                    self.tags().join(", ")
                ))
            })?;
        constructor(&config.parameters)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.constructors.keys().cloned().collect();
        tags.sort();
        tags
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Uppercase, whitespace removed, trailing "STRATEGY" dropped:
/// "SMA Strategy", "sma" and "Sma" all become "SMA".
fn normalize_tag(tag: &str) -> String {
    let compact: String = tag
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    match compact.strip_suffix("STRATEGY") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => compact,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(kind: &str, parameters: Value) -> AtomicStrategyConfig {
        AtomicStrategyConfig {
            kind: kind.to_string(),
            parameters,
        }
    }

    #[test]
    fn builtin_tags() {
        let registry = StrategyRegistry::new();
        assert_eq!(registry.tags(), vec!["MACD", "RSI", "SMA"]);
    }

    #[test]
    fn tag_normalization() {
        assert_eq!(normalize_tag("SMA Strategy"), "SMA");
        assert_eq!(normalize_tag("sma"), "SMA");
        assert_eq!(normalize_tag(" Rsi "), "RSI");
        assert_eq!(normalize_tag("MACDStrategy"), "MACD");
        assert_eq!(normalize_tag("strategy"), "STRATEGY");
    }

    #[test]
    fn builds_by_any_spelling() {
        let registry = StrategyRegistry::new();
        let built = registry
            .build(&config("SMA Strategy", json!({"short_window": 3, "long_window": 5})))
            .unwrap();
        assert_eq!(built, AtomicStrategy::sma(3, 5).unwrap());
        assert!(registry.contains("macd"));
    }

    #[test]
    fn unknown_tag_is_configuration_error() {
        let registry = StrategyRegistry::new();
        let err = registry.build(&config("LSTM", json!({}))).unwrap_err();
        assert!(matches!(err, StratbenchError::Configuration { .. }));
        assert!(err.to_string().contains("LSTM"));
    }

    #[test]
    fn constructor_errors_propagate() {
        let registry = StrategyRegistry::new();
        let result = registry.build(&config("SMA", json!({"short_window": 30, "long_window": 10})));
        assert!(matches!(result, Err(StratbenchError::Configuration { .. })));
    }

    #[test]
    fn custom_registration() {
        fn fast_rsi(_: &Value) -> Result<AtomicStrategy, StratbenchError> {
            AtomicStrategy::rsi(2, 10.0, 90.0)
        }
        let mut registry = StrategyRegistry::new();
        registry.register("FastRSI", fast_rsi);
        let built = registry.build(&config("fast rsi", Value::Null)).unwrap();
        assert_eq!(built, AtomicStrategy::rsi(2, 10.0, 90.0).unwrap());
    }
}
