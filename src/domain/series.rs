//! Ordered, append-only bar collection with a shared numeric representation.

use crate::domain::bar::Bar;
use crate::domain::error::BackcastError;
use crate::domain::num::{Num, NumKind};
use std::collections::VecDeque;

/// A bar series owns its bars, the representation choice applied to every
/// value it produces, and the canonical valid index range.
///
/// Indices are absolute and monotonically increasing: when a bounded series
/// evicts its oldest bars, `begin_index` advances and the evicted indices
/// become permanently invalid. A query against an evicted index fails with
/// `IndexOutOfRange` against the current bounds.
#[derive(Debug, Clone)]
pub struct BarSeries {
    name: String,
    bars: VecDeque<Bar>,
    kind: NumKind,
    removed_count: usize,
    maximum_bar_count: Option<usize>,
}

impl BarSeries {
    pub fn new(name: impl Into<String>, kind: NumKind) -> BarSeries {
        BarSeries {
            name: name.into(),
            bars: VecDeque::new(),
            kind,
            removed_count: 0,
            maximum_bar_count: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NumKind {
        self.kind
    }

    /// Construct a value in this series' representation. Indicators must
    /// source every constant through this factory.
    pub fn num_of(&self, value: f64) -> Num {
        self.kind.num_of(value)
    }

    pub fn num_of_i64(&self, value: i64) -> Num {
        self.kind.num_of_i64(value)
    }

    pub fn num_of_str(&self, literal: &str) -> Result<Num, BackcastError> {
        self.kind.num_of_str(literal)
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// First valid index. Starts at 0 and advances on eviction.
    pub fn begin_index(&self) -> usize {
        self.removed_count
    }

    /// Last valid index, or `None` while the series is empty.
    pub fn end_index(&self) -> Option<usize> {
        if self.bars.is_empty() {
            None
        } else {
            Some(self.removed_count + self.bars.len() - 1)
        }
    }

    pub fn first_bar(&self) -> Option<&Bar> {
        self.bars.front()
    }

    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars.back()
    }

    pub fn get_bar(&self, index: usize) -> Result<&Bar, BackcastError> {
        let begin = self.begin_index();
        let end = self.end_index();
        match end {
            Some(end) if index >= begin && index <= end => {
                Ok(&self.bars[index - self.removed_count])
            }
            _ => Err(BackcastError::IndexOutOfRange {
                index,
                begin,
                end: end.unwrap_or(begin),
            }),
        }
    }

    /// Cap the number of retained bars, evicting from the front if the
    /// series is already over the cap.
    pub fn set_maximum_bar_count(&mut self, maximum: usize) {
        self.maximum_bar_count = Some(maximum);
        self.evict_over_limit();
    }

    pub fn maximum_bar_count(&self) -> Option<usize> {
        self.maximum_bar_count
    }

    /// Append a bar. Its window must start exactly where the previous bar
    /// ended, and it must carry this series' representation.
    pub fn add_bar(&mut self, bar: Bar) -> Result<(), BackcastError> {
        if bar.kind() != self.kind {
            return Err(BackcastError::TypeMismatch {
                left: self.kind,
                right: bar.kind(),
            });
        }
        if let Some(last) = self.bars.back() {
            if bar.begin_time() != last.end_time() {
                return Err(BackcastError::NonContiguousBar {
                    expected: last.end_time(),
                    actual: bar.begin_time(),
                });
            }
        }
        self.bars.push_back(bar);
        self.evict_over_limit();
        Ok(())
    }

    /// Route a trade into the currently open (last) bar.
    pub fn add_trade(&mut self, volume: Num, price: Num) -> Result<(), BackcastError> {
        match self.bars.back_mut() {
            Some(bar) => bar.add_trade(volume, price),
            None => Err(BackcastError::illegal_state("no open bar to trade into")),
        }
    }

    /// Route a price into the currently open (last) bar.
    pub fn add_price(&mut self, price: Num) -> Result<(), BackcastError> {
        match self.bars.back_mut() {
            Some(bar) => bar.add_price(price),
            None => Err(BackcastError::illegal_state("no open bar to price into")),
        }
    }

    fn evict_over_limit(&mut self) {
        if let Some(maximum) = self.maximum_bar_count {
            while self.bars.len() > maximum {
                self.bars.pop_front();
                self.removed_count += 1;
            }
        }
    }
}
