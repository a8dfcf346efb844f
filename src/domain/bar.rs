//! One OHLCV aggregate over a fixed time window.

use crate::domain::error::BackcastError;
use crate::domain::num::{Num, NumKind};
use chrono::{Duration, NaiveDateTime};

/// A single bar. Created either fully formed from OHLCV values or as an
/// empty window that is filled incrementally through [`Bar::add_price`] and
/// [`Bar::add_trade`] while the window is still open.
///
/// All prices in one bar share the representation of the owning series;
/// the first accepted value fixes it and later mismatches are rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    time_period: Duration,
    end_time: NaiveDateTime,
    open: Option<Num>,
    high: Option<Num>,
    low: Option<Num>,
    close: Option<Num>,
    volume: Num,
    amount: Num,
    trade_count: u32,
}

impl Bar {
    /// An open bar covering `[end_time - time_period, end_time)` with no
    /// prices yet.
    pub fn open_window(time_period: Duration, end_time: NaiveDateTime, kind: NumKind) -> Bar {
        Bar {
            time_period,
            end_time,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: kind.zero(),
            amount: kind.zero(),
            trade_count: 0,
        }
    }

    /// A closed bar from explicit OHLCV values. All values must share one
    /// representation.
    #[allow(clippy::too_many_arguments)]
    pub fn from_prices(
        time_period: Duration,
        end_time: NaiveDateTime,
        open: Num,
        high: Num,
        low: Num,
        close: Num,
        volume: Num,
        amount: Num,
    ) -> Result<Bar, BackcastError> {
        let kind = open.kind();
        for value in [high, low, close, volume, amount] {
            if value.kind() != kind {
                return Err(BackcastError::TypeMismatch {
                    left: kind,
                    right: value.kind(),
                });
            }
        }
        Ok(Bar {
            time_period,
            end_time,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume,
            amount,
            trade_count: 0,
        })
    }

    pub fn time_period(&self) -> Duration {
        self.time_period
    }

    pub fn begin_time(&self) -> NaiveDateTime {
        self.end_time - self.time_period
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn open_price(&self) -> Option<Num> {
        self.open
    }

    pub fn high_price(&self) -> Option<Num> {
        self.high
    }

    pub fn low_price(&self) -> Option<Num> {
        self.low
    }

    pub fn close_price(&self) -> Option<Num> {
        self.close
    }

    pub fn volume(&self) -> Num {
        self.volume
    }

    pub fn amount(&self) -> Num {
        self.amount
    }

    pub fn trade_count(&self) -> u32 {
        self.trade_count
    }

    /// The numeric representation this bar carries.
    pub fn kind(&self) -> NumKind {
        self.volume.kind()
    }

    /// Whether `timestamp` falls inside `[begin_time, end_time)`.
    pub fn in_period(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.begin_time() && timestamp < self.end_time
    }

    /// Record a traded price: sets the open on first sight, always moves
    /// the close, and widens the high/low envelope.
    pub fn add_price(&mut self, price: Num) -> Result<(), BackcastError> {
        if price.kind() != self.kind() {
            return Err(BackcastError::TypeMismatch {
                left: self.kind(),
                right: price.kind(),
            });
        }
        if self.open.is_none() {
            self.open = Some(price);
        }
        self.close = Some(price);
        self.high = Some(match self.high {
            Some(high) => high.max(price)?,
            None => price,
        });
        self.low = Some(match self.low {
            Some(low) => low.min(price)?,
            None => price,
        });
        Ok(())
    }

    /// Record a trade: updates prices, then accumulates volume, traded
    /// amount and the trade count.
    pub fn add_trade(&mut self, trade_volume: Num, trade_price: Num) -> Result<(), BackcastError> {
        self.add_price(trade_price)?;
        self.volume = self.volume.add(trade_volume)?;
        self.amount = self.amount.add(trade_volume.multiply(trade_price)?)?;
        self.trade_count += 1;
        Ok(())
    }

    /// Open strictly below close. A bar that never saw a price is neither
    /// bullish nor bearish.
    pub fn is_bullish(&self) -> bool {
        match (self.open, self.close) {
            (Some(open), Some(close)) => open.is_less_than(close).unwrap_or(false),
            _ => false,
        }
    }

    /// Close strictly below open.
    pub fn is_bearish(&self) -> bool {
        match (self.open, self.close) {
            (Some(open), Some(close)) => close.is_less_than(open).unwrap_or(false),
            _ => false,
        }
    }
}
