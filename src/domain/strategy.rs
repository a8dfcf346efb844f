//! A strategy bundles entry, exit and optional close rules.

use crate::domain::error::BackcastError;
use crate::domain::record::TradingRecord;
use crate::domain::rule::Rule;

/// Named pair of entry/exit rules, an optional close rule evaluated only
/// against an open position, and an unstable-bar prefix during which no
/// signal is trusted (warm-up for windowed indicators).
pub struct Strategy<'a> {
    name: String,
    entry_rule: Box<dyn Rule + 'a>,
    exit_rule: Box<dyn Rule + 'a>,
    close_rule: Option<Box<dyn Rule + 'a>>,
    unstable_bars: usize,
}

impl<'a> Strategy<'a> {
    pub fn new(
        name: impl Into<String>,
        entry_rule: impl Rule + 'a,
        exit_rule: impl Rule + 'a,
    ) -> Strategy<'a> {
        Strategy {
            name: name.into(),
            entry_rule: Box::new(entry_rule),
            exit_rule: Box::new(exit_rule),
            close_rule: None,
            unstable_bars: 0,
        }
    }

    pub fn with_close_rule(mut self, close_rule: impl Rule + 'a) -> Strategy<'a> {
        self.close_rule = Some(Box::new(close_rule));
        self
    }

    pub fn with_unstable_bars(mut self, unstable_bars: usize) -> Strategy<'a> {
        self.unstable_bars = unstable_bars;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unstable_bars(&self) -> usize {
        self.unstable_bars
    }

    pub fn is_unstable_at(&self, index: usize) -> bool {
        index < self.unstable_bars
    }

    pub fn should_enter(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        if self.is_unstable_at(index) {
            return Ok(false);
        }
        self.entry_rule.is_satisfied(index, record)
    }

    pub fn should_exit(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        if self.is_unstable_at(index) {
            return Ok(false);
        }
        self.exit_rule.is_satisfied(index, record)
    }

    /// Consults the close rule against an open position. Distinct from the
    /// exit signal: a close rule is a position-management exit (stops,
    /// holding-time limits) rather than a market signal.
    pub fn should_close(
        &self,
        index: usize,
        record: &TradingRecord,
    ) -> Result<bool, BackcastError> {
        if self.is_unstable_at(index) || !record.current_trade().is_opened() {
            return Ok(false);
        }
        match &self.close_rule {
            Some(rule) => rule.is_satisfied(index, Some(record)),
            None => Ok(false),
        }
    }
}
