//! Exponential Moving Average.
//!
//! `ema[i] = ema[i-1] + k * (source[i] - ema[i-1])` with `k = 2/(n+1)`,
//! seeded with the source value at the first valid index. The reference to
//! `ema[i-1]` goes through the shared cache, which fills ascending, so a
//! sweep over the series stays O(n).

use crate::domain::error::BackcastError;
use crate::domain::indicator::{Cache, Indicator};
use crate::domain::num::Num;
use crate::domain::series::BarSeries;

pub struct EmaIndicator<'a, I> {
    source: &'a I,
    bar_count: usize,
    multiplier: Num,
    cache: Cache,
}

impl<'a, I: Indicator> EmaIndicator<'a, I> {
    pub fn new(source: &'a I, bar_count: usize) -> Self {
        let bar_count = bar_count.max(1);
        // Smoothing constant hoisted to construction time; building it per
        // evaluation would re-run the factory on every bar.
        let multiplier = source.series().num_of(2.0 / (bar_count as f64 + 1.0));
        EmaIndicator {
            source,
            bar_count,
            multiplier,
            cache: Cache::new(),
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }
}

impl<I: Indicator> Indicator for EmaIndicator<'_, I> {
    fn series(&self) -> &BarSeries {
        self.source.series()
    }

    fn value(&self, index: usize) -> Result<Num, BackcastError> {
        self.cache.get_or_compute(self.series(), index, |i| {
            if i == self.series().begin_index() {
                return self.source.value(i);
            }
            let previous = self.value(i - 1)?;
            let current = self.source.value(i)?;
            current
                .subtract(previous)?
                .multiply(self.multiplier)?
                .add(previous)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::indicator::helpers::ClosePriceIndicator;
    use crate::domain::num::NumKind;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn series_of(closes: &[f64]) -> BarSeries {
        let mut series = BarSeries::new("TEST", NumKind::Float);
        let kind = NumKind::Float;
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for (i, &close) in closes.iter().enumerate() {
            // Offset from a start date so long series roll over month ends.
            let end = start + Duration::days(i as i64);
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

    fn as_f64(value: Num) -> f64 {
        value.to_f64()
    }

    #[test]
    fn first_value_is_the_source() {
        let series = series_of(&[64.75, 63.79, 63.73]);
        let close = ClosePriceIndicator::new(&series);
        let ema = EmaIndicator::new(&close, 10);
        assert_eq!(ema.value(0).unwrap(), Num::Float(64.75));
    }

    #[test]
    fn follows_the_recursion() {
        let series = series_of(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let close = ClosePriceIndicator::new(&series);
        let ema = EmaIndicator::new(&close, 3);

        let k = 2.0 / 4.0;
        let mut expected = 10.0;
        for (i, &price) in [10.0, 20.0, 30.0, 40.0, 50.0].iter().enumerate() {
            if i > 0 {
                expected = expected + k * (price - expected);
            }
            assert_relative_eq!(as_f64(ema.value(i).unwrap()), expected);
        }
    }

    #[test]
    fn deep_query_first_matches_sequential_queries() {
        let closes: Vec<f64> = (1..=50).map(|i| i as f64).collect();
        let series = series_of(&closes);
        let close = ClosePriceIndicator::new(&series);

        let deep_first = EmaIndicator::new(&close, 10);
        let deep_value = deep_first.value(49).unwrap();

        let sequential = EmaIndicator::new(&close, 10);
        let mut last = sequential.value(0).unwrap();
        for i in 1..=49 {
            last = sequential.value(i).unwrap();
        }

        assert_eq!(deep_value, last);
    }

    #[test]
    fn constant_input_is_a_fixed_point() {
        let series = series_of(&[100.0; 8]);
        let close = ClosePriceIndicator::new(&series);
        let ema = EmaIndicator::new(&close, 4);
        for i in 0..8 {
            assert_relative_eq!(as_f64(ema.value(i).unwrap()), 100.0);
        }
    }

    #[test]
    fn repeated_queries_are_bit_identical() {
        let series = series_of(&[3.1, 4.1, 5.9, 2.6, 5.3]);
        let close = ClosePriceIndicator::new(&series);
        let ema = EmaIndicator::new(&close, 3);

        let first = ema.value(4).unwrap();
        let second = ema.value(4).unwrap();
        assert_eq!(first, second);
    }
}
