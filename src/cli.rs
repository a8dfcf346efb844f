//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestObserver, BacktestRunner};
use crate::domain::cost::{HoldingCostModel, TransactionCostModel};
use crate::domain::criteria::{AnalysisCriterion, NumberOfTradesCriterion, ProfitLossCriterion};
use crate::domain::error::BackcastError;
use crate::domain::indicator::helpers::ClosePriceIndicator;
use crate::domain::indicator::sma::SmaIndicator;
use crate::domain::num::{Num, NumKind};
use crate::domain::record::TradingRecord;
use crate::domain::rule::comparison::{CrossedDownIndicatorRule, CrossedUpIndicatorRule};
use crate::domain::rule::trading::{StopGainRule, StopLossRule};
use crate::domain::rule::{OrRule, Rule};
use crate::domain::series::BarSeries;
use crate::domain::strategy::Strategy;
use crate::domain::trade::OrderSide;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "backcast", about = "Trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest for one symbol
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List symbols available in the data directory
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show the loaded series for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            symbol,
            data_dir,
        } => run_backtest(&config, &symbol, data_dir.as_deref()),
        Command::Symbols { config, data_dir } => run_symbols(&config, data_dir.as_deref()),
        Command::Info {
            config,
            symbol,
            data_dir,
        } => run_info(&config, &symbol, data_dir.as_deref()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(&err)
        }
    }
}

fn parse_representation(config: &dyn ConfigPort) -> Result<NumKind, BackcastError> {
    match config
        .get_string("data", "representation")
        .unwrap_or_else(|| "float".to_string())
        .as_str()
    {
        "float" => Ok(NumKind::Float),
        "decimal" => Ok(NumKind::Decimal),
        other => Err(BackcastError::ConfigInvalid {
            section: "data".to_string(),
            key: "representation".to_string(),
            reason: format!("expected float or decimal, got {:?}", other),
        }),
    }
}

fn parse_side(config: &dyn ConfigPort) -> Result<OrderSide, BackcastError> {
    match config
        .get_string("backtest", "side")
        .unwrap_or_else(|| "buy".to_string())
        .as_str()
    {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        other => Err(BackcastError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "side".to_string(),
            reason: format!("expected buy or sell, got {:?}", other),
        }),
    }
}

fn data_adapter(
    config: &dyn ConfigPort,
    data_dir: Option<&Path>,
) -> Result<CsvAdapter, BackcastError> {
    let directory = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => config
            .get_string("data", "directory")
            .map(PathBuf::from)
            .ok_or_else(|| BackcastError::ConfigMissing {
                section: "data".to_string(),
                key: "directory".to_string(),
            })?,
    };
    Ok(CsvAdapter::new(directory))
}

struct StrategyConfig {
    fast: usize,
    slow: usize,
    stop_loss: Option<f64>,
    stop_gain: Option<f64>,
}

fn parse_strategy(config: &dyn ConfigPort) -> Result<StrategyConfig, BackcastError> {
    let fast = config.get_int("strategy", "fast", 5);
    let slow = config.get_int("strategy", "slow", 20);
    if fast <= 0 || slow <= 0 || fast >= slow {
        return Err(BackcastError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "fast/slow".to_string(),
            reason: format!("need 0 < fast < slow, got {} and {}", fast, slow),
        });
    }
    let stop_loss = config.get_string("strategy", "stop_loss").map(|_| {
        config.get_double("strategy", "stop_loss", 0.0)
    });
    let stop_gain = config.get_string("strategy", "stop_gain").map(|_| {
        config.get_double("strategy", "stop_gain", 0.0)
    });
    Ok(StrategyConfig {
        fast: fast as usize,
        slow: slow as usize,
        stop_loss,
        stop_gain,
    })
}

fn cost_models(config: &dyn ConfigPort) -> (TransactionCostModel, HoldingCostModel) {
    let fee_ratio = config.get_double("costs", "fee_ratio", 0.0);
    let fixed_fee = config.get_double("costs", "fixed_fee", 0.0);
    let borrow_rate = config.get_double("costs", "borrow_rate", 0.0);

    let transaction = if fee_ratio == 0.0 && fixed_fee == 0.0 {
        TransactionCostModel::Zero
    } else {
        TransactionCostModel::Linear {
            fee_ratio,
            fixed_fee,
        }
    };
    let holding = if borrow_rate == 0.0 {
        HoldingCostModel::Zero
    } else {
        HoldingCostModel::LinearBorrowing {
            rate_per_bar: borrow_rate,
        }
    };
    (transaction, holding)
}

struct PrintingObserver;

impl BacktestObserver for PrintingObserver {
    fn on_entered(&mut self, index: usize, price: Num) {
        println!("  entered at index {} ({})", index, price);
    }

    fn on_exited(&mut self, index: usize, price: Num) {
        println!("  exited  at index {} ({})", index, price);
    }
}

fn run_backtest(
    config_path: &Path,
    symbol: &str,
    data_dir: Option<&Path>,
) -> Result<(), BackcastError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let kind = parse_representation(&config)?;
    let series = data_adapter(&config, data_dir)?.load_series(symbol, kind)?;
    let strategy_config = parse_strategy(&config)?;
    let (transaction, holding) = cost_models(&config);
    let amount = config.get_double("backtest", "amount", 1.0);
    let side = parse_side(&config)?;

    let close = ClosePriceIndicator::new(&series);
    let fast = SmaIndicator::new(&close, strategy_config.fast);
    let slow = SmaIndicator::new(&close, strategy_config.slow);
    let entry = CrossedUpIndicatorRule::new(&fast, &slow);
    let exit = CrossedDownIndicatorRule::new(&fast, &slow);

    let mut strategy = Strategy::new(format!("sma-cross {}/{}", strategy_config.fast, strategy_config.slow), entry, exit)
        .with_unstable_bars(strategy_config.slow);
    if let Some(rule) = close_rule(&close, &strategy_config) {
        strategy = strategy.with_close_rule(rule);
    }

    let runner = BacktestRunner::new(side, amount).with_cost_models(transaction, holding);

    println!("backtesting {} over {} bars", symbol, series.bar_count());
    let record = runner.run_with_observer(&series, &strategy, &mut PrintingObserver)?;
    print_summary(&series, &record)
}

fn close_rule<'a>(
    close: &'a ClosePriceIndicator<'a>,
    config: &StrategyConfig,
) -> Option<Box<dyn Rule + 'a>> {
    match (config.stop_loss, config.stop_gain) {
        (Some(loss), Some(gain)) => Some(Box::new(OrRule::new(
            StopLossRule::new(close, loss),
            StopGainRule::new(close, gain),
        ))),
        (Some(loss), None) => Some(Box::new(StopLossRule::new(close, loss))),
        (None, Some(gain)) => Some(Box::new(StopGainRule::new(close, gain))),
        (None, None) => None,
    }
}

fn print_summary(series: &BarSeries, record: &TradingRecord) -> Result<(), BackcastError> {
    for (i, trade) in record.trades().iter().enumerate() {
        let entry = trade
            .entry()
            .ok_or_else(|| BackcastError::illegal_state("closed trade without entry"))?;
        let exit = trade
            .exit()
            .ok_or_else(|| BackcastError::illegal_state("closed trade without exit"))?;
        println!(
            "trade {}: {} -> {}  profit {}",
            i + 1,
            entry.index,
            exit.index,
            trade.profit()?
        );
    }
    if record.current_trade().is_opened() {
        println!("one position still open at the end of the series");
    }

    let profit = ProfitLossCriterion.calculate(series, record)?;
    let trades = NumberOfTradesCriterion.calculate(series, record)?;
    println!("closed trades: {}", trades);
    println!("net profit:    {}", profit);
    Ok(())
}

fn run_symbols(config_path: &Path, data_dir: Option<&Path>) -> Result<(), BackcastError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    for symbol in data_adapter(&config, data_dir)?.list_symbols()? {
        println!("{}", symbol);
    }
    Ok(())
}

fn run_info(
    config_path: &Path,
    symbol: &str,
    data_dir: Option<&Path>,
) -> Result<(), BackcastError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let kind = parse_representation(&config)?;
    let series = data_adapter(&config, data_dir)?.load_series(symbol, kind)?;

    println!("symbol:         {}", series.name());
    println!("representation: {}", kind);
    println!("bars:           {}", series.bar_count());
    if let (Some(first), Some(last)) = (series.first_bar(), series.last_bar()) {
        println!("from:           {}", first.begin_time());
        println!("to:             {}", last.end_time());
    }
    Ok(())
}
