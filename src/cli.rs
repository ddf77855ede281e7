//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvTradesReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::{BacktestResult, run_backtest_from_provider};
use crate::domain::config_validation::{backtest_config, required_string};
use crate::domain::engine::StrategyEngine;
use crate::domain::error::StratbenchError;
use crate::domain::indicator::IndicatorType;
use crate::domain::registry::StrategyRegistry;
use crate::domain::risk::{StopLossType, TradeRiskModel};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stratbench", about = "Trading strategy evaluation and backtesting")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Strategy JSON, overrides [strategy] path
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        /// Report file; `.csv` writes the trade list, anything else JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        timeframe: Option<String>,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// List registered atomic strategy types
    ListStrategies,
    /// List symbols with candle data for a timeframe
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        timeframe: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            strategy,
            output,
            symbol,
            timeframe,
        } => run_backtest(
            &config,
            strategy.as_deref(),
            output.as_deref(),
            symbol,
            timeframe,
        ),
        Command::Validate { strategy } => run_validate(&strategy),
        Command::ListStrategies => run_list_strategies(),
        Command::ListSymbols { config, timeframe } => run_list_symbols(&config, &timeframe),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Read a strategy JSON file and build the engine through `registry`.
pub fn load_engine(
    path: &Path,
    registry: &StrategyRegistry,
) -> Result<StrategyEngine, StratbenchError> {
    let json = fs::read_to_string(path)?;
    StrategyEngine::from_json(&json, registry)
}

/// Pick the report writer from the output file extension.
pub fn report_adapter(output: &Path) -> Box<dyn ReportPort> {
    let is_csv = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvTradesReportAdapter::new())
    } else {
        Box::new(JsonReportAdapter::new())
    }
}

fn data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, StratbenchError> {
    let dir = required_string(config, "data", "csv_dir")?;
    Ok(CsvAdapter::new(PathBuf::from(dir)))
}

fn run_backtest(
    config_path: &Path,
    strategy_path: Option<&Path>,
    output_path: Option<&Path>,
    symbol: Option<String>,
    timeframe: Option<String>,
) -> Result<(), StratbenchError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;

    let mut bt_config = backtest_config(&adapter)?;
    if let Some(symbol) = symbol {
        bt_config.symbol = symbol;
    }
    if let Some(timeframe) = timeframe {
        bt_config.timeframe = timeframe;
    }

    let strategy_path = match strategy_path {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(required_string(&adapter, "strategy", "path")?),
    };
    eprintln!("Loading strategy from {}", strategy_path.display());
    let registry = StrategyRegistry::new();
    let engine = load_engine(&strategy_path, &registry)?;
    debug!(conditions = engine.conditions().len(), "strategy engine built");

    let provider = data_port(&adapter)?;

    eprintln!(
        "Running backtest: {} {} ({} candles)",
        bt_config.symbol, bt_config.timeframe, bt_config.candle_amount
    );
    let result = run_backtest_from_provider(&provider, &engine, &bt_config)?;

    print_summary(&result);
    if adapter.get_bool("report", "print_trades", false) {
        print_trades(&result);
    }

    let output = output_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "output").map(PathBuf::from));
    if let Some(output) = output {
        report_adapter(&output).write(&result, &output.to_string_lossy())?;
        info!(path = %output.display(), "report written");
        eprintln!("\nReport written to: {}", output.display());
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let stats = &result.statistics;
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Initial Balance:  {:.2}", result.initial_balance);
    eprintln!("Final Balance:    {:.2}", result.final_balance);
    eprintln!("Profit/Loss:      {:+.2}", result.profit_loss);
    eprintln!("Total Trades:     {}", result.total_trades);
    eprintln!(
        "Wins/Losses:      {}/{} ({} still open)",
        result.total_wins, result.total_losses, result.not_closed_trades
    );
    eprintln!("Win Rate:         {:.1}%", stats.win_rate * 100.0);
    match stats.profit_factor {
        Some(pf) => eprintln!("Profit Factor:    {:.2}", pf),
        None => eprintln!("Profit Factor:    inf"),
    }
    eprintln!("Max Drawdown:     -{:.1}%", stats.max_drawdown * 100.0);
}

fn print_trades(result: &BacktestResult) {
    eprintln!("\n=== Trades ===");
    for t in &result.trades {
        let exit = match (t.exit_index, t.exit_price, t.result) {
            (Some(i), Some(price), Some(pnl)) => {
                format!("exit #{} @ {:.4}  {:+.2}", i, price, pnl)
            }
            _ => "open".to_string(),
        };
        eprintln!(
            "  #{:<5} {:<5} @ {:.4}  qty {:.4}  SL {:.4}  TP {:.4}  {}",
            t.entry_index,
            t.side.to_string(),
            t.entry_price,
            t.quantity,
            t.stop_loss_price,
            t.take_profit_price,
            exit
        );
    }
}

fn describe_risk(model: &TradeRiskModel) -> String {
    let stop_loss = match model.stop_loss_type() {
        StopLossType::Fixed => format!("SL fixed {}%", model.stop_loss_pct()),
        StopLossType::Relative => format!(
            "SL relative {}x {}",
            model.atr_multiplier(),
            IndicatorType::Atr(model.atr_period())
        ),
    };
    format!(
        "{}, TP {} {}%, size {} {}%",
        stop_loss,
        model.take_profit_type(),
        model.take_profit_pct(),
        model.position_size_type(),
        model.position_size_pct()
    )
}

fn run_validate(strategy_path: &Path) -> Result<(), StratbenchError> {
    eprintln!("Validating strategy: {}", strategy_path.display());
    let engine = load_engine(strategy_path, &StrategyRegistry::new())?;

    for (i, condition) in engine.conditions().iter().enumerate() {
        let names: Vec<String> = condition
            .strategies()
            .iter()
            .map(|s| s.to_string())
            .collect();
        eprintln!("\nCondition {}: {}", i, names.join(" & "));
        if condition.do_action_if_buy() {
            eprintln!("  BUY:  {}", describe_risk(condition.buy_risk_model()));
        } else {
            eprintln!("  BUY:  disabled");
        }
        if condition.do_action_if_sell() {
            eprintln!("  SELL: {}", describe_risk(condition.sell_risk_model()));
        } else {
            eprintln!("  SELL: disabled");
        }
    }

    eprintln!(
        "\nStrategy is valid: {} conditions, needs {} candles",
        engine.conditions().len(),
        engine.min_candles()
    );
    Ok(())
}

fn run_list_strategies() -> Result<(), StratbenchError> {
    for tag in StrategyRegistry::new().tags() {
        println!("{}", tag);
    }
    Ok(())
}

fn run_list_symbols(config_path: &Path, timeframe: &str) -> Result<(), StratbenchError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let provider = data_port(&adapter)?;
    let symbols = provider.list_symbols(timeframe)?;

    if symbols.is_empty() {
        eprintln!("No symbols found for timeframe {}", timeframe);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
