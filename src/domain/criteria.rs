//! Analysis criteria: scalar performance measures over a finished record.

use crate::domain::error::BackcastError;
use crate::domain::num::Num;
use crate::domain::record::TradingRecord;
use crate::domain::series::BarSeries;
use crate::domain::trade::Trade;

/// A performance measure with an ordering for ranking strategy runs.
pub trait AnalysisCriterion {
    fn calculate(
        &self,
        series: &BarSeries,
        record: &TradingRecord,
    ) -> Result<Num, BackcastError>;

    fn calculate_trade(
        &self,
        series: &BarSeries,
        trade: &Trade,
    ) -> Result<Num, BackcastError>;

    /// Whether `a` ranks above `b` under this criterion.
    fn better_than(&self, a: Num, b: Num) -> Result<bool, BackcastError>;
}

/// Net profit summed over all closed trades. Higher is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfitLossCriterion;

impl AnalysisCriterion for ProfitLossCriterion {
    fn calculate(
        &self,
        series: &BarSeries,
        record: &TradingRecord,
    ) -> Result<Num, BackcastError> {
        let mut total = series.kind().zero();
        for trade in record.trades() {
            total = total.add(self.calculate_trade(series, trade)?)?;
        }
        Ok(total)
    }

    fn calculate_trade(
        &self,
        _series: &BarSeries,
        trade: &Trade,
    ) -> Result<Num, BackcastError> {
        trade.profit()
    }

    fn better_than(&self, a: Num, b: Num) -> Result<bool, BackcastError> {
        a.is_greater_than(b)
    }
}

/// Number of closed trades. Fewer is better: with comparable profit, a
/// strategy that churns less pays less in friction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberOfTradesCriterion;

impl AnalysisCriterion for NumberOfTradesCriterion {
    fn calculate(
        &self,
        series: &BarSeries,
        record: &TradingRecord,
    ) -> Result<Num, BackcastError> {
        Ok(series.num_of_i64(record.trades().len() as i64))
    }

    fn calculate_trade(
        &self,
        series: &BarSeries,
        _trade: &Trade,
    ) -> Result<Num, BackcastError> {
        Ok(series.num_of_i64(1))
    }

    fn better_than(&self, a: Num, b: Num) -> Result<bool, BackcastError> {
        a.is_less_than(b)
    }
}
