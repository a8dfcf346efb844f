#![allow(dead_code)]

use backcast::domain::bar::Bar;
use backcast::domain::error::BackcastError;
use backcast::domain::indicator::{Cache, Indicator};
use backcast::domain::num::{Num, NumKind};
use backcast::domain::series::BarSeries;
use chrono::{Duration, NaiveDate};
use std::cell::Cell;

pub fn n(value: f64) -> Num {
    NumKind::Float.num_of(value)
}

pub fn close_bar(kind: NumKind, day_offset: i64, close: f64) -> Bar {
    // Offset from a start date so long series roll over month ends.
    let end = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(day_offset);
    Bar::from_prices(
        Duration::days(1),
        end,
        kind.num_of(close),
        kind.num_of(close),
        kind.num_of(close),
        kind.num_of(close),
        kind.num_of(1000.0),
        kind.num_of(0.0),
    )
    .unwrap()
}

/// A float series of flat bars, one close per element, starting 2024-01-02.
pub fn series_of(closes: &[f64]) -> BarSeries {
    let mut series = BarSeries::new("TEST", NumKind::Float);
    for (i, &close) in closes.iter().enumerate() {
        series
            .add_bar(close_bar(NumKind::Float, i as i64, close))
            .unwrap();
    }
    series
}

/// Cumulative sum of closes, defined through its own previous value, with
/// a counter exposing how many times the core formula actually ran.
pub struct CumulativeSum<'a> {
    series: &'a BarSeries,
    cache: Cache,
    pub computations: Cell<usize>,
}

impl<'a> CumulativeSum<'a> {
    pub fn new(series: &'a BarSeries) -> Self {
        CumulativeSum {
            series,
            cache: Cache::new(),
            computations: Cell::new(0),
        }
    }
}

impl Indicator for CumulativeSum<'_> {
    fn series(&self) -> &BarSeries {
        self.series
    }

    fn value(&self, index: usize) -> Result<Num, BackcastError> {
        self.cache.get_or_compute(self.series, index, |i| {
            self.computations.set(self.computations.get() + 1);
            let close = self
                .series
                .get_bar(i)?
                .close_price()
                .ok_or_else(|| BackcastError::illegal_state("bar without close"))?;
            if i == self.series.begin_index() {
                Ok(close)
            } else {
                self.value(i - 1)?.add(close)
            }
        })
    }
}
