//! Leaf rules comparing two indicator signals.

use crate::domain::error::BackcastError;
use crate::domain::indicator::Indicator;
use crate::domain::record::TradingRecord;
use crate::domain::rule::Rule;

/// Satisfied while the first indicator is strictly above the second.
pub struct OverIndicatorRule<'a, A, B> {
    first: &'a A,
    second: &'a B,
}

impl<'a, A: Indicator, B: Indicator> OverIndicatorRule<'a, A, B> {
    pub fn new(first: &'a A, second: &'a B) -> Self {
        OverIndicatorRule { first, second }
    }
}

impl<A: Indicator, B: Indicator> Rule for OverIndicatorRule<'_, A, B> {
    fn is_satisfied(
        &self,
        index: usize,
        _record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        self.first
            .value(index)?
            .is_greater_than(self.second.value(index)?)
    }
}

/// Satisfied while the first indicator is strictly below the second.
pub struct UnderIndicatorRule<'a, A, B> {
    first: &'a A,
    second: &'a B,
}

impl<'a, A: Indicator, B: Indicator> UnderIndicatorRule<'a, A, B> {
    pub fn new(first: &'a A, second: &'a B) -> Self {
        UnderIndicatorRule { first, second }
    }
}

impl<A: Indicator, B: Indicator> Rule for UnderIndicatorRule<'_, A, B> {
    fn is_satisfied(
        &self,
        index: usize,
        _record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        self.first
            .value(index)?
            .is_less_than(self.second.value(index)?)
    }
}

/// Satisfied at the bar where the first indicator moves from at-or-below
/// the second to strictly above it. Never satisfied at the series' first
/// index, where no previous bar exists to cross from.
pub struct CrossedUpIndicatorRule<'a, A, B> {
    first: &'a A,
    second: &'a B,
}

impl<'a, A: Indicator, B: Indicator> CrossedUpIndicatorRule<'a, A, B> {
    pub fn new(first: &'a A, second: &'a B) -> Self {
        CrossedUpIndicatorRule { first, second }
    }
}

impl<A: Indicator, B: Indicator> Rule for CrossedUpIndicatorRule<'_, A, B> {
    fn is_satisfied(
        &self,
        index: usize,
        _record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        if index == self.first.series().begin_index() {
            return Ok(false);
        }
        let above_now = self
            .first
            .value(index)?
            .is_greater_than(self.second.value(index)?)?;
        if !above_now {
            return Ok(false);
        }
        self.first
            .value(index - 1)?
            .is_less_than_or_equal(self.second.value(index - 1)?)
    }
}

/// Satisfied at the bar where the first indicator moves from at-or-above
/// the second to strictly below it.
pub struct CrossedDownIndicatorRule<'a, A, B> {
    first: &'a A,
    second: &'a B,
}

impl<'a, A: Indicator, B: Indicator> CrossedDownIndicatorRule<'a, A, B> {
    pub fn new(first: &'a A, second: &'a B) -> Self {
        CrossedDownIndicatorRule { first, second }
    }
}

impl<A: Indicator, B: Indicator> Rule for CrossedDownIndicatorRule<'_, A, B> {
    fn is_satisfied(
        &self,
        index: usize,
        _record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        if index == self.first.series().begin_index() {
            return Ok(false);
        }
        let below_now = self
            .first
            .value(index)?
            .is_less_than(self.second.value(index)?)?;
        if !below_now {
            return Ok(false);
        }
        self.first
            .value(index - 1)?
            .is_greater_than_or_equal(self.second.value(index - 1)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::indicator::helpers::{ClosePriceIndicator, ConstantIndicator};
    use crate::domain::num::NumKind;
    use crate::domain::series::BarSeries;
    use chrono::{Duration, NaiveDate};

    fn series_of(closes: &[f64]) -> BarSeries {
        let mut series = BarSeries::new("TEST", NumKind::Float);
        let kind = NumKind::Float;
        for (i, &close) in closes.iter().enumerate() {
            let end = NaiveDate::from_ymd_opt(2024, 1, i as u32 + 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let bar = Bar::from_prices(
                Duration::days(1),
                end,
                kind.num_of(close),
                kind.num_of(close),
                kind.num_of(close),
                kind.num_of(close),
                kind.num_of(1000.0),
                kind.num_of(0.0),
            )
            .unwrap();
            series.add_bar(bar).unwrap();
        }
        series
    }

    #[test]
    fn over_and_under_are_strict() {
        let series = series_of(&[9.0, 10.0, 11.0]);
        let close = ClosePriceIndicator::new(&series);
        let ten = ConstantIndicator::new(&series, series.num_of(10.0));

        let over = OverIndicatorRule::new(&close, &ten);
        assert!(!over.is_satisfied(0, None).unwrap());
        assert!(!over.is_satisfied(1, None).unwrap());
        assert!(over.is_satisfied(2, None).unwrap());

        let under = UnderIndicatorRule::new(&close, &ten);
        assert!(under.is_satisfied(0, None).unwrap());
        assert!(!under.is_satisfied(1, None).unwrap());
        assert!(!under.is_satisfied(2, None).unwrap());
    }

    #[test]
    fn crossed_up_fires_only_on_the_crossing_bar() {
        let series = series_of(&[8.0, 9.0, 11.0, 12.0]);
        let close = ClosePriceIndicator::new(&series);
        let ten = ConstantIndicator::new(&series, series.num_of(10.0));
        let crossed = CrossedUpIndicatorRule::new(&close, &ten);

        assert!(!crossed.is_satisfied(0, None).unwrap());
        assert!(!crossed.is_satisfied(1, None).unwrap());
        assert!(crossed.is_satisfied(2, None).unwrap());
        assert!(!crossed.is_satisfied(3, None).unwrap());
    }

    #[test]
    fn crossed_up_from_exact_touch_counts() {
        let series = series_of(&[10.0, 11.0]);
        let close = ClosePriceIndicator::new(&series);
        let ten = ConstantIndicator::new(&series, series.num_of(10.0));
        let crossed = CrossedUpIndicatorRule::new(&close, &ten);

        assert!(crossed.is_satisfied(1, None).unwrap());
    }

    #[test]
    fn crossed_down_mirrors_crossed_up() {
        let series = series_of(&[12.0, 11.0, 9.0, 8.0]);
        let close = ClosePriceIndicator::new(&series);
        let ten = ConstantIndicator::new(&series, series.num_of(10.0));
        let crossed = CrossedDownIndicatorRule::new(&close, &ten);

        assert!(!crossed.is_satisfied(0, None).unwrap());
        assert!(!crossed.is_satisfied(1, None).unwrap());
        assert!(crossed.is_satisfied(2, None).unwrap());
        assert!(!crossed.is_satisfied(3, None).unwrap());
    }

    #[test]
    fn no_cross_at_the_first_index() {
        let series = series_of(&[11.0, 12.0]);
        let close = ClosePriceIndicator::new(&series);
        let ten = ConstantIndicator::new(&series, series.num_of(10.0));
        let crossed = CrossedUpIndicatorRule::new(&close, &ten);

        assert!(!crossed.is_satisfied(0, None).unwrap());
    }
}
