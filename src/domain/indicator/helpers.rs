//! Uncached passthrough indicators over raw bar fields.
//!
//! These are cheap enough that memoizing them would cost more than
//! recomputing; they remain referentially pure.

use crate::domain::bar::Bar;
use crate::domain::error::BackcastError;
use crate::domain::indicator::Indicator;
use crate::domain::num::Num;
use crate::domain::series::BarSeries;

fn price_of(
    bar: Option<Num>,
    index: usize,
    field: &'static str,
) -> Result<Num, BackcastError> {
    bar.ok_or_else(|| {
        BackcastError::illegal_state(format!("bar {} has no {} price", index, field))
    })
}

macro_rules! price_indicator {
    ($name:ident, $accessor:ident, $field:literal) => {
        pub struct $name<'a> {
            series: &'a BarSeries,
        }

        impl<'a> $name<'a> {
            pub fn new(series: &'a BarSeries) -> Self {
                Self { series }
            }
        }

        impl Indicator for $name<'_> {
            fn series(&self) -> &BarSeries {
                self.series
            }

            fn value(&self, index: usize) -> Result<Num, BackcastError> {
                let bar = self.series.get_bar(index)?;
                price_of(bar.$accessor(), index, $field)
            }
        }
    };
}

price_indicator!(ClosePriceIndicator, close_price, "close");
price_indicator!(OpenPriceIndicator, open_price, "open");
price_indicator!(HighPriceIndicator, high_price, "high");
price_indicator!(LowPriceIndicator, low_price, "low");

pub struct VolumeIndicator<'a> {
    series: &'a BarSeries,
}

impl<'a> VolumeIndicator<'a> {
    pub fn new(series: &'a BarSeries) -> Self {
        Self { series }
    }
}

impl Indicator for VolumeIndicator<'_> {
    fn series(&self) -> &BarSeries {
        self.series
    }

    fn value(&self, index: usize) -> Result<Num, BackcastError> {
        Ok(self.series.get_bar(index)?.volume())
    }
}

/// (high + low + close) / 3.
pub struct TypicalPriceIndicator<'a> {
    series: &'a BarSeries,
    three: Num,
}

impl<'a> TypicalPriceIndicator<'a> {
    pub fn new(series: &'a BarSeries) -> Self {
        Self {
            series,
            three: series.num_of_i64(3),
        }
    }

    fn typical(&self, bar: &Bar, index: usize) -> Result<Num, BackcastError> {
        let high = price_of(bar.high_price(), index, "high")?;
        let low = price_of(bar.low_price(), index, "low")?;
        let close = price_of(bar.close_price(), index, "close")?;
        high.add(low)?.add(close)?.divide(self.three)
    }
}

impl Indicator for TypicalPriceIndicator<'_> {
    fn series(&self) -> &BarSeries {
        self.series
    }

    fn value(&self, index: usize) -> Result<Num, BackcastError> {
        let bar = self.series.get_bar(index)?;
        self.typical(bar, index)
    }
}

/// The same value at every index, built through the series' factory.
pub struct ConstantIndicator<'a> {
    series: &'a BarSeries,
    value: Num,
}

impl<'a> ConstantIndicator<'a> {
    pub fn new(series: &'a BarSeries, value: Num) -> Self {
        Self { series, value }
    }
}

impl Indicator for ConstantIndicator<'_> {
    fn series(&self) -> &BarSeries {
        self.series
    }

    fn value(&self, index: usize) -> Result<Num, BackcastError> {
        // Still bounds-checked: a constant outside the series is undefined.
        self.series.get_bar(index)?;
        Ok(self.value)
    }
}
