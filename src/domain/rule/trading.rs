//! Rules that consult the trading record: stops and holding-time gates.
//!
//! All of these answer `false` when no record is supplied or no trade is
//! open. Percentages are materialized through the series' numeric factory
//! at construction time.

use crate::domain::error::BackcastError;
use crate::domain::indicator::Indicator;
use crate::domain::num::Num;
use crate::domain::record::TradingRecord;
use crate::domain::rule::Rule;
use crate::domain::trade::{OrderSide, Trade};
use std::cell::RefCell;

fn open_entry(record: Option<&TradingRecord>) -> Option<(&Trade, Num, OrderSide)> {
    let trade = record?.current_trade();
    let entry = trade.entry()?;
    Some((trade, entry.price, entry.side))
}

/// `entry * (100 + gain) / 100` reached for a Buy entry, mirrored for Sell.
fn gain_satisfied(
    entry_price: Num,
    current_price: Num,
    side: OrderSide,
    gain_percentage: Num,
    hundred: Num,
) -> Result<bool, BackcastError> {
    match side {
        OrderSide::Buy => {
            let ratio = hundred.add(gain_percentage)?.divide(hundred)?;
            current_price.is_greater_than_or_equal(entry_price.multiply(ratio)?)
        }
        OrderSide::Sell => {
            let ratio = hundred.subtract(gain_percentage)?.divide(hundred)?;
            current_price.is_less_than_or_equal(entry_price.multiply(ratio)?)
        }
    }
}

/// `entry * (100 - loss) / 100` reached for a Buy entry, mirrored for Sell.
fn loss_satisfied(
    entry_price: Num,
    current_price: Num,
    side: OrderSide,
    loss_percentage: Num,
    hundred: Num,
) -> Result<bool, BackcastError> {
    match side {
        OrderSide::Buy => {
            let ratio = hundred.subtract(loss_percentage)?.divide(hundred)?;
            current_price.is_less_than_or_equal(entry_price.multiply(ratio)?)
        }
        OrderSide::Sell => {
            let ratio = hundred.add(loss_percentage)?.divide(hundred)?;
            current_price.is_greater_than_or_equal(entry_price.multiply(ratio)?)
        }
    }
}

/// Exit once the open position has gained the configured percentage.
pub struct StopGainRule<'a, I> {
    source: &'a I,
    gain_percentage: Num,
    hundred: Num,
}

impl<'a, I: Indicator> StopGainRule<'a, I> {
    pub fn new(source: &'a I, gain_percentage: f64) -> Self {
        let series = source.series();
        StopGainRule {
            source,
            gain_percentage: series.num_of(gain_percentage),
            hundred: series.num_of_i64(100),
        }
    }
}

impl<I: Indicator> Rule for StopGainRule<'_, I> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let (trade, entry_price, side) = match open_entry(record) {
            Some(open) => open,
            None => return Ok(false),
        };
        if !trade.is_opened() {
            return Ok(false);
        }
        let current = self.source.value(index)?;
        gain_satisfied(entry_price, current, side, self.gain_percentage, self.hundred)
    }
}

/// Exit once the open position has lost the configured percentage.
pub struct StopLossRule<'a, I> {
    source: &'a I,
    loss_percentage: Num,
    hundred: Num,
}

impl<'a, I: Indicator> StopLossRule<'a, I> {
    pub fn new(source: &'a I, loss_percentage: f64) -> Self {
        let series = source.series();
        StopLossRule {
            source,
            loss_percentage: series.num_of(loss_percentage),
            hundred: series.num_of_i64(100),
        }
    }
}

impl<I: Indicator> Rule for StopLossRule<'_, I> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let (trade, entry_price, side) = match open_entry(record) {
            Some(open) => open,
            None => return Ok(false),
        };
        if !trade.is_opened() {
            return Ok(false);
        }
        let current = self.source.value(index)?;
        loss_satisfied(entry_price, current, side, self.loss_percentage, self.hundred)
    }
}

/// A stop whose gain threshold ratchets upward instead of exiting.
///
/// Each time the current gain threshold (`gain + accumulated trailing`) is
/// reached, the accumulated trailing amount grows by `trailing_percentage`
/// and the position stays open. While the accumulator is positive, the loss
/// threshold tightens to `-(gain + accumulated - trailing)` — locking in
/// most of the gains already ratcheted past — and reverts to the plain loss
/// percentage otherwise. Without a trailing percentage this degrades to a
/// combined stop-gain/stop-loss.
///
/// The accumulator is internal mutable state; this is the rule the eager
/// combinator evaluation exists for.
pub struct TrailingStopRule<'a, I> {
    source: &'a I,
    gain_percentage: Num,
    loss_percentage: Num,
    trailing_percentage: Option<Num>,
    trailing_sum: RefCell<Num>,
    hundred: Num,
}

impl<'a, I: Indicator> TrailingStopRule<'a, I> {
    pub fn new(
        source: &'a I,
        gain_percentage: f64,
        loss_percentage: f64,
        trailing_percentage: Option<f64>,
    ) -> Self {
        let series = source.series();
        TrailingStopRule {
            source,
            gain_percentage: series.num_of(gain_percentage),
            loss_percentage: series.num_of(loss_percentage),
            trailing_percentage: trailing_percentage.map(|pct| series.num_of(pct)),
            trailing_sum: RefCell::new(series.kind().zero()),
            hundred: series.num_of_i64(100),
        }
    }

    fn effective_loss_percentage(&self, sum: Num) -> Result<Num, BackcastError> {
        match self.trailing_percentage {
            Some(trailing) if sum.is_positive() => self
                .gain_percentage
                .add(sum)?
                .subtract(trailing)
                .map(Num::negate),
            _ => Ok(self.loss_percentage),
        }
    }
}

impl<I: Indicator> Rule for TrailingStopRule<'_, I> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let (trade, entry_price, side) = match open_entry(record) {
            Some(open) => open,
            None => return Ok(false),
        };
        if !trade.is_opened() {
            return Ok(false);
        }

        let current = self.source.value(index)?;
        let sum = *self.trailing_sum.borrow();

        // Both thresholds derive from the pre-ratchet accumulator; hitting
        // the gain threshold ratchets it but the loss check below still
        // sees the old value.
        let gain_threshold = self.gain_percentage.add(sum)?;
        let gain_hit = gain_satisfied(entry_price, current, side, gain_threshold, self.hundred)?;
        let loss_hit = loss_satisfied(
            entry_price,
            current,
            side,
            self.effective_loss_percentage(sum)?,
            self.hundred,
        )?;

        if gain_hit {
            match self.trailing_percentage {
                Some(trailing) => {
                    *self.trailing_sum.borrow_mut() = sum.add(trailing)?;
                }
                None => {
                    *self.trailing_sum.borrow_mut() = self.source.series().kind().zero();
                    return Ok(true);
                }
            }
        }
        if loss_hit {
            *self.trailing_sum.borrow_mut() = self.source.series().kind().zero();
            return Ok(true);
        }
        Ok(false)
    }
}

/// Satisfied once the open position has been held for at least `bar_count`
/// bars.
#[derive(Debug, Clone, Copy)]
pub struct WaitForRule {
    bar_count: usize,
}

impl WaitForRule {
    pub fn new(bar_count: usize) -> WaitForRule {
        WaitForRule { bar_count }
    }
}

impl Rule for WaitForRule {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let trade = match record {
            Some(record) => record.current_trade(),
            None => return Ok(false),
        };
        match trade.entry() {
            // checked_sub: the rule may be queried at a valid index below
            // the entry index; that is simply "not held long enough".
            Some(entry) if trade.is_opened() => Ok(index
                .checked_sub(entry.index)
                .map_or(false, |held| held >= self.bar_count)),
            _ => Ok(false),
        }
    }
}

/// Exit as soon as the position is in profit, once it has been held for
/// at least `expiration_bars` bars.
///
/// "In profit" means the close is at or beyond the entry price in the
/// favorable direction; costs are not considered. With zero expiration
/// bars this exits on the first profitable close.
pub struct ExitWhenProfitableRule<'a, I> {
    source: &'a I,
    expiration_bars: usize,
}

impl<'a, I: Indicator> ExitWhenProfitableRule<'a, I> {
    pub fn new(source: &'a I, expiration_bars: usize) -> Self {
        ExitWhenProfitableRule {
            source,
            expiration_bars,
        }
    }
}

impl<I: Indicator> Rule for ExitWhenProfitableRule<'_, I> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let (trade, entry_price, side) = match open_entry(record) {
            Some(open) => open,
            None => return Ok(false),
        };
        let entry_index = match trade.entry() {
            Some(entry) if trade.is_opened() => entry.index,
            _ => return Ok(false),
        };
        let expired = index
            .checked_sub(entry_index)
            .map_or(false, |held| held >= self.expiration_bars);
        if !expired {
            return Ok(false);
        }

        let current = self.source.value(index)?;
        match side {
            OrderSide::Buy => current.is_greater_than_or_equal(entry_price),
            OrderSide::Sell => current.is_less_than_or_equal(entry_price),
        }
    }
}
