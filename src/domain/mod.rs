//! Core domain types and logic: indicators, strategies, risk and trade simulation.

pub mod atomic;
pub mod backtest;
pub mod candle;
pub mod condition;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod registry;
pub mod risk;
pub mod signal;
pub mod strategy_config;
pub mod trade;
