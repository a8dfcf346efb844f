//! Indicators: pure functions of (series, index) with memoization.
//!
//! An indicator derives one numeric value per bar index, lazily. Cached
//! indicators share the evaluation protocol in [`Cache`]: at most one core
//! computation per index, filled in ascending index order so that an
//! indicator defined in terms of its own earlier values (EMA-style
//! recursion) resolves those references through the cache instead of
//! re-descending, and a same-index re-entrant request is reported as a
//! malformed indicator graph.
//!
//! Cheap passthroughs (close price and friends in [`helpers`]) skip the
//! cache entirely but stay referentially pure.

pub mod ema;
pub mod helpers;
pub mod sma;

use crate::domain::error::BackcastError;
use crate::domain::num::Num;
use crate::domain::series::BarSeries;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A derived numeric signal over a bar series.
pub trait Indicator {
    /// The series this indicator reads from.
    fn series(&self) -> &BarSeries;

    /// The indicator's value at `index`. Fails with `IndexOutOfRange`
    /// outside the series' current valid range.
    fn value(&self, index: usize) -> Result<Num, BackcastError>;
}

impl<I: Indicator + ?Sized> Indicator for &I {
    fn series(&self) -> &BarSeries {
        (**self).series()
    }

    fn value(&self, index: usize) -> Result<Num, BackcastError> {
        (**self).value(index)
    }
}

/// Per-indicator memoization table.
///
/// Keys are absolute series indices, so entries addressing bars that a
/// bounded series has since evicted simply become unreachable: the bounds
/// check against the live series rejects those indices before the table is
/// consulted.
#[derive(Debug, Default)]
pub struct Cache {
    values: RefCell<HashMap<usize, Num>>,
    computing: RefCell<HashSet<usize>>,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// Return the cached value at `index`, computing any uncached prefix
    /// first.
    ///
    /// `compute` is invoked exactly once per uncached index, in ascending
    /// order starting from the lowest uncached index at or above the
    /// series' `begin_index`. By the time `compute(i)` runs, every index
    /// below `i` is already cached, so a recursive `value(i - 1)` inside
    /// the formula is a pure lookup. A request for `i` from within
    /// `compute(i)` fails with `RecursiveEvaluationCycle`.
    pub fn get_or_compute<F>(
        &self,
        series: &BarSeries,
        index: usize,
        compute: F,
    ) -> Result<Num, BackcastError>
    where
        F: Fn(usize) -> Result<Num, BackcastError>,
    {
        let begin = series.begin_index();
        let end = series.end_index();
        let in_range = matches!(end, Some(end) if index >= begin && index <= end);
        if !in_range {
            return Err(BackcastError::IndexOutOfRange {
                index,
                begin,
                end: end.unwrap_or(begin),
            });
        }

        if let Some(value) = self.values.borrow().get(&index) {
            return Ok(*value);
        }

        for i in begin..=index {
            if self.values.borrow().contains_key(&i) {
                continue;
            }
            if !self.computing.borrow_mut().insert(i) {
                return Err(BackcastError::RecursiveEvaluationCycle { index: i });
            }
            let result = compute(i);
            self.computing.borrow_mut().remove(&i);
            let value = result?;
            self.values.borrow_mut().insert(i, value);
        }

        Ok(self.values.borrow()[&index])
    }

    /// Number of memoized entries. Mostly useful in tests.
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}
