//! Boolean decision rules and their logical combinators.
//!
//! A rule answers "act at this index?" given the current trading record.
//! Combinators always evaluate both operands: leaf rules may carry internal
//! mutable state (a trailing stop ratcheting its threshold), and a
//! short-circuited operand would silently skip that state update. `NOT`
//! evaluates its operand for the same reason.

pub mod comparison;
pub mod trading;

use crate::domain::error::BackcastError;
use crate::domain::record::TradingRecord;

/// A boolean predicate over (index, trading record).
///
/// `record` may be `None` for context-free signal rules; rules that need
/// trading state treat its absence as "not satisfied".
pub trait Rule {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError>;
}

impl<R: Rule + ?Sized> Rule for &R {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        (**self).is_satisfied(index, record)
    }
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        (**self).is_satisfied(index, record)
    }
}

/// A rule with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct BooleanRule {
    satisfied: bool,
}

impl BooleanRule {
    pub fn new(satisfied: bool) -> BooleanRule {
        BooleanRule { satisfied }
    }
}

impl Rule for BooleanRule {
    fn is_satisfied(
        &self,
        _index: usize,
        _record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        Ok(self.satisfied)
    }
}

pub struct AndRule<A, B> {
    left: A,
    right: B,
}

impl<A: Rule, B: Rule> AndRule<A, B> {
    pub fn new(left: A, right: B) -> Self {
        AndRule { left, right }
    }
}

impl<A: Rule, B: Rule> Rule for AndRule<A, B> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let left = self.left.is_satisfied(index, record)?;
        let right = self.right.is_satisfied(index, record)?;
        Ok(left && right)
    }
}

pub struct OrRule<A, B> {
    left: A,
    right: B,
}

impl<A: Rule, B: Rule> OrRule<A, B> {
    pub fn new(left: A, right: B) -> Self {
        OrRule { left, right }
    }
}

impl<A: Rule, B: Rule> Rule for OrRule<A, B> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let left = self.left.is_satisfied(index, record)?;
        let right = self.right.is_satisfied(index, record)?;
        Ok(left || right)
    }
}

pub struct XorRule<A, B> {
    left: A,
    right: B,
}

impl<A: Rule, B: Rule> XorRule<A, B> {
    pub fn new(left: A, right: B) -> Self {
        XorRule { left, right }
    }
}

impl<A: Rule, B: Rule> Rule for XorRule<A, B> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        let left = self.left.is_satisfied(index, record)?;
        let right = self.right.is_satisfied(index, record)?;
        Ok(left != right)
    }
}

pub struct NotRule<A> {
    inner: A,
}

impl<A: Rule> NotRule<A> {
    pub fn new(inner: A) -> Self {
        NotRule { inner }
    }
}

impl<A: Rule> Rule for NotRule<A> {
    fn is_satisfied(
        &self,
        index: usize,
        record: Option<&TradingRecord>,
    ) -> Result<bool, BackcastError> {
        Ok(!self.inner.is_satisfied(index, record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Fixed-answer rule that counts its evaluations.
    struct CountingRule {
        satisfied: bool,
        evaluations: Cell<usize>,
    }

    impl CountingRule {
        fn new(satisfied: bool) -> CountingRule {
            CountingRule {
                satisfied,
                evaluations: Cell::new(0),
            }
        }
    }

    impl Rule for CountingRule {
        fn is_satisfied(
            &self,
            _index: usize,
            _record: Option<&TradingRecord>,
        ) -> Result<bool, BackcastError> {
            self.evaluations.set(self.evaluations.get() + 1);
            Ok(self.satisfied)
        }
    }

    fn truth_table<F>(combine: F) -> [bool; 4]
    where
        F: Fn(bool, bool) -> Box<dyn Rule>,
    {
        let mut results = [false; 4];
        for (slot, (a, b)) in [(false, false), (false, true), (true, false), (true, true)]
            .into_iter()
            .enumerate()
        {
            results[slot] = combine(a, b).is_satisfied(0, None).unwrap();
        }
        results
    }

    #[test]
    fn and_truth_table() {
        let table = truth_table(|a, b| Box::new(AndRule::new(BooleanRule::new(a), BooleanRule::new(b))));
        assert_eq!(table, [false, false, false, true]);
    }

    #[test]
    fn or_truth_table() {
        let table = truth_table(|a, b| Box::new(OrRule::new(BooleanRule::new(a), BooleanRule::new(b))));
        assert_eq!(table, [false, true, true, true]);
    }

    #[test]
    fn xor_is_true_exactly_when_operands_disagree() {
        let table = truth_table(|a, b| Box::new(XorRule::new(BooleanRule::new(a), BooleanRule::new(b))));
        assert_eq!(table, [false, true, true, false]);
    }

    #[test]
    fn not_inverts() {
        assert!(!NotRule::new(BooleanRule::new(true))
            .is_satisfied(0, None)
            .unwrap());
        assert!(NotRule::new(BooleanRule::new(false))
            .is_satisfied(0, None)
            .unwrap());
    }

    #[test]
    fn and_evaluates_both_operands_even_when_left_is_false() {
        let left = CountingRule::new(false);
        let right = CountingRule::new(true);
        let rule = AndRule::new(&left, &right);

        assert!(!rule.is_satisfied(0, None).unwrap());
        assert_eq!(left.evaluations.get(), 1);
        assert_eq!(right.evaluations.get(), 1);
    }

    #[test]
    fn or_evaluates_both_operands_even_when_left_is_true() {
        let left = CountingRule::new(true);
        let right = CountingRule::new(false);
        let rule = OrRule::new(&left, &right);

        assert!(rule.is_satisfied(0, None).unwrap());
        assert_eq!(left.evaluations.get(), 1);
        assert_eq!(right.evaluations.get(), 1);
    }

    #[test]
    fn combinators_nest() {
        // NOT(AND(true, XOR(true, false))) == false
        let rule = NotRule::new(AndRule::new(
            BooleanRule::new(true),
            XorRule::new(BooleanRule::new(true), BooleanRule::new(false)),
        ));
        assert!(!rule.is_satisfied(0, None).unwrap());
    }
}
