//! Simple Moving Average.
//!
//! Mean of the source values over the trailing window. Until a full window
//! is available the mean runs over however many values exist, so early
//! indices are defined rather than invalid.

use crate::domain::error::BackcastError;
use crate::domain::indicator::{Cache, Indicator};
use crate::domain::num::Num;
use crate::domain::series::BarSeries;

pub struct SmaIndicator<'a, I> {
    source: &'a I,
    bar_count: usize,
    cache: Cache,
}

impl<'a, I: Indicator> SmaIndicator<'a, I> {
    pub fn new(source: &'a I, bar_count: usize) -> Self {
        SmaIndicator {
            source,
            bar_count: bar_count.max(1),
            cache: Cache::new(),
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }
}

impl<I: Indicator> Indicator for SmaIndicator<'_, I> {
    fn series(&self) -> &BarSeries {
        self.source.series()
    }

    fn value(&self, index: usize) -> Result<Num, BackcastError> {
        self.cache.get_or_compute(self.series(), index, |i| {
            let begin = self.series().begin_index();
            let window_start = i.saturating_sub(self.bar_count - 1).max(begin);
            let mut sum = self.series().kind().zero();
            for j in window_start..=i {
                sum = sum.add(self.source.value(j)?)?;
            }
            let width = self.series().num_of_i64((i - window_start + 1) as i64);
            sum.divide(width)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::indicator::helpers::ClosePriceIndicator;
    use crate::domain::num::NumKind;
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
    fn full_window_mean() {
        let series = series_of(&[1.0, 2.0, 3.0, 4.0, 3.0]);
        let close = ClosePriceIndicator::new(&series);
        let sma = SmaIndicator::new(&close, 3);

        assert_eq!(sma.value(2).unwrap(), Num::Float(2.0));
        assert_eq!(sma.value(3).unwrap(), Num::Float(3.0));
        assert_eq!(sma.value(4).unwrap(), Num::Float(10.0 / 3.0));
    }

    #[test]
    fn partial_window_averages_what_exists() {
        let series = series_of(&[1.0, 2.0, 3.0]);
        let close = ClosePriceIndicator::new(&series);
        let sma = SmaIndicator::new(&close, 3);

        assert_eq!(sma.value(0).unwrap(), Num::Float(1.0));
        assert_eq!(sma.value(1).unwrap(), Num::Float(1.5));
    }

    #[test]
    fn window_of_one_is_the_source() {
        let series = series_of(&[5.0, 7.0]);
        let close = ClosePriceIndicator::new(&series);
        let sma = SmaIndicator::new(&close, 1);

        assert_eq!(sma.value(0).unwrap(), Num::Float(5.0));
        assert_eq!(sma.value(1).unwrap(), Num::Float(7.0));
    }

    #[test]
    fn zero_bar_count_is_clamped() {
        let series = series_of(&[5.0]);
        let close = ClosePriceIndicator::new(&series);
        let sma = SmaIndicator::new(&close, 0);
        assert_eq!(sma.bar_count(), 1);
        assert_eq!(sma.value(0).unwrap(), Num::Float(5.0));
    }

    #[test]
    fn decimal_series_stays_decimal() {
        let mut series = BarSeries::new("D", NumKind::Decimal);
        let kind = NumKind::Decimal;
        for (i, literal) in ["1.1", "2.2", "3.3"].iter().enumerate() {
            let end = NaiveDate::from_ymd_opt(2024, 1, i as u32 + 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let close = kind.num_of_str(literal).unwrap();
            let bar = Bar::from_prices(
                Duration::days(1),
                end,
                close,
                close,
                close,
                close,
                kind.num_of_i64(1),
                kind.num_of_i64(0),
            )
            .unwrap();
            series.add_bar(bar).unwrap();
        }
        let close = ClosePriceIndicator::new(&series);
        let sma = SmaIndicator::new(&close, 3);

        let expected = kind.num_of_str("2.2").unwrap();
        assert!(sma.value(2).unwrap().is_equal(expected).unwrap());
        assert_eq!(sma.value(2).unwrap().kind(), NumKind::Decimal);
    }
}
