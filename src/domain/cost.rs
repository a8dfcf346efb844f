//! Cost models applied by the trading record.
//!
//! Transaction costs are charged per order fill; holding costs accrue over
//! the bars a position stays open (borrowing a shorted asset, funding).
//! Model coefficients are plain floats and are materialized through the
//! traded value's own representation at calculation time, so one model
//! works against both float and decimal series.

use crate::domain::error::BackcastError;
use crate::domain::num::Num;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransactionCostModel {
    Zero,
    /// `traded_value * fee_ratio + fixed_fee`.
    Linear { fee_ratio: f64, fixed_fee: f64 },
}

impl TransactionCostModel {
    pub fn calculate(&self, price: Num, amount: Num) -> Result<Num, BackcastError> {
        let kind = price.kind();
        match *self {
            TransactionCostModel::Zero => Ok(kind.zero()),
            TransactionCostModel::Linear {
                fee_ratio,
                fixed_fee,
            } => {
                let traded_value = price.multiply(amount)?;
                traded_value
                    .multiply(kind.num_of(fee_ratio))?
                    .add(kind.num_of(fixed_fee))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldingCostModel {
    Zero,
    /// `entry_value * rate_per_bar * bars_held`.
    LinearBorrowing { rate_per_bar: f64 },
}

impl HoldingCostModel {
    pub fn calculate(
        &self,
        entry_index: usize,
        exit_index: usize,
        entry_price: Num,
        amount: Num,
    ) -> Result<Num, BackcastError> {
        let kind = entry_price.kind();
        match *self {
            HoldingCostModel::Zero => Ok(kind.zero()),
            HoldingCostModel::LinearBorrowing { rate_per_bar } => {
                let bars_held = exit_index.saturating_sub(entry_index);
                let entry_value = entry_price.multiply(amount)?;
                entry_value
                    .multiply(kind.num_of(rate_per_bar))?
                    .multiply(kind.num_of_i64(bars_held as i64))
            }
        }
    }
}
