//! The backtest driver: one synchronous sweep over a bar series.

use crate::domain::cost::{HoldingCostModel, TransactionCostModel};
use crate::domain::error::BackcastError;
use crate::domain::num::Num;
use crate::domain::record::TradingRecord;
use crate::domain::series::BarSeries;
use crate::domain::strategy::Strategy;
use crate::domain::trade::OrderSide;

/// Callback surface for per-fill diagnostics.
///
/// Decision rules stay free of logging concerns; anything that wants to
/// watch the simulation (progress output, trace collection in tests)
/// implements this instead.
pub trait BacktestObserver {
    fn on_entered(&mut self, _index: usize, _price: Num) {}
    fn on_exited(&mut self, _index: usize, _price: Num) {}
}

struct SilentObserver;

impl BacktestObserver for SilentObserver {}

/// Runs a strategy over a series, producing the trading record.
///
/// Fills happen at the close price of the decision bar. Exit and close
/// signals take precedence over entry signals at the same index, so a
/// position is never flipped within one bar.
pub struct BacktestRunner {
    starting_side: OrderSide,
    amount: f64,
    transaction_cost: TransactionCostModel,
    holding_cost: HoldingCostModel,
}

impl BacktestRunner {
    pub fn new(starting_side: OrderSide, amount: f64) -> BacktestRunner {
        BacktestRunner {
            starting_side,
            amount,
            transaction_cost: TransactionCostModel::Zero,
            holding_cost: HoldingCostModel::Zero,
        }
    }

    pub fn with_cost_models(
        mut self,
        transaction_cost: TransactionCostModel,
        holding_cost: HoldingCostModel,
    ) -> BacktestRunner {
        self.transaction_cost = transaction_cost;
        self.holding_cost = holding_cost;
        self
    }

    pub fn run(
        &self,
        series: &BarSeries,
        strategy: &Strategy<'_>,
    ) -> Result<TradingRecord, BackcastError> {
        self.run_with_observer(series, strategy, &mut SilentObserver)
    }

    pub fn run_with_observer(
        &self,
        series: &BarSeries,
        strategy: &Strategy<'_>,
        observer: &mut dyn BacktestObserver,
    ) -> Result<TradingRecord, BackcastError> {
        let mut record = TradingRecord::with_cost_models(
            self.starting_side,
            self.transaction_cost,
            self.holding_cost,
        );
        let end = match series.end_index() {
            Some(end) => end,
            None => return Ok(record),
        };

        for index in series.begin_index()..=end {
            let close = series
                .get_bar(index)?
                .close_price()
                .ok_or_else(|| BackcastError::illegal_state("bar without a close price"))?;
            let amount = series.num_of(self.amount);

            if record.current_trade().is_opened() {
                let wants_exit = strategy.should_exit(index, Some(&record))?
                    || strategy.should_close(index, &record)?;
                if wants_exit && record.exit(index, close, amount)? {
                    observer.on_exited(index, close);
                }
            } else if strategy.should_enter(index, Some(&record))?
                && record.enter(index, close, amount)?
            {
                observer.on_entered(index, close);
            }
        }
        Ok(record)
    }
}
