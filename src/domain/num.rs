//! Polymorphic numeric values.
//!
//! Every price, volume and derived indicator value is a [`Num`]: either a
//! fast binary float or an exact decimal. A [`NumKind`] is chosen once per
//! bar series and acts as the factory for all values the series produces.
//! The two representations are never coerced into each other; any operation
//! mixing them fails with `TypeMismatch`.

use crate::domain::error::BackcastError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// The backing representation of a [`Num`], and its factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumKind {
    Float,
    Decimal,
}

impl NumKind {
    /// Construct a value of this representation from a float literal.
    ///
    /// Non-finite floats are not representable as decimals and collapse to
    /// zero; use [`NumKind::num_of_str`] when exactness matters.
    pub fn num_of(self, value: f64) -> Num {
        match self {
            NumKind::Float => Num::Float(value),
            NumKind::Decimal => {
                Num::Decimal(Decimal::from_f64_retain(value).unwrap_or_default())
            }
        }
    }

    /// Construct a value of this representation from an integer literal.
    pub fn num_of_i64(self, value: i64) -> Num {
        match self {
            NumKind::Float => Num::Float(value as f64),
            NumKind::Decimal => Num::Decimal(Decimal::from(value)),
        }
    }

    /// Construct a value of this representation from a decimal-string
    /// literal. This is the lossless path for the decimal representation.
    pub fn num_of_str(self, literal: &str) -> Result<Num, BackcastError> {
        match self {
            NumKind::Float => literal
                .trim()
                .parse::<f64>()
                .map(Num::Float)
                .map_err(|_| invalid_literal(literal)),
            NumKind::Decimal => literal
                .trim()
                .parse::<Decimal>()
                .map(Num::Decimal)
                .map_err(|_| invalid_literal(literal)),
        }
    }

    pub fn zero(self) -> Num {
        self.num_of_i64(0)
    }
}

impl fmt::Display for NumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumKind::Float => write!(f, "float"),
            NumKind::Decimal => write!(f, "decimal"),
        }
    }
}

fn invalid_literal(literal: &str) -> BackcastError {
    BackcastError::Data {
        reason: format!("invalid numeric literal '{}'", literal),
    }
}

/// An immutable arithmetic value. All operations return new values; two
/// values of different representations never compare equal and never
/// combine arithmetically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Float(f64),
    Decimal(Decimal),
}

impl Num {
    pub fn kind(self) -> NumKind {
        match self {
            Num::Float(_) => NumKind::Float,
            Num::Decimal(_) => NumKind::Decimal,
        }
    }

    pub fn add(self, other: Num) -> Result<Num, BackcastError> {
        match (self, other) {
            (Num::Float(a), Num::Float(b)) => Ok(Num::Float(a + b)),
            (Num::Decimal(a), Num::Decimal(b)) => {
                a.checked_add(b).map(Num::Decimal).ok_or_else(overflow)
            }
            (a, b) => Err(mismatch(a, b)),
        }
    }

    pub fn subtract(self, other: Num) -> Result<Num, BackcastError> {
        match (self, other) {
            (Num::Float(a), Num::Float(b)) => Ok(Num::Float(a - b)),
            (Num::Decimal(a), Num::Decimal(b)) => {
                a.checked_sub(b).map(Num::Decimal).ok_or_else(overflow)
            }
            (a, b) => Err(mismatch(a, b)),
        }
    }

    pub fn multiply(self, other: Num) -> Result<Num, BackcastError> {
        match (self, other) {
            (Num::Float(a), Num::Float(b)) => Ok(Num::Float(a * b)),
            (Num::Decimal(a), Num::Decimal(b)) => {
                a.checked_mul(b).map(Num::Decimal).ok_or_else(overflow)
            }
            (a, b) => Err(mismatch(a, b)),
        }
    }

    pub fn divide(self, other: Num) -> Result<Num, BackcastError> {
        match (self, other) {
            (Num::Float(a), Num::Float(b)) => {
                if b == 0.0 {
                    Err(BackcastError::DivisionByZero)
                } else {
                    Ok(Num::Float(a / b))
                }
            }
            (Num::Decimal(a), Num::Decimal(b)) => {
                if b.is_zero() {
                    Err(BackcastError::DivisionByZero)
                } else {
                    a.checked_div(b).map(Num::Decimal).ok_or_else(overflow)
                }
            }
            (a, b) => Err(mismatch(a, b)),
        }
    }

    pub fn negate(self) -> Num {
        match self {
            Num::Float(a) => Num::Float(-a),
            Num::Decimal(a) => Num::Decimal(-a),
        }
    }

    /// Total-order comparison. Floats use `total_cmp`, so NaN sorts
    /// deterministically instead of poisoning the order.
    pub fn compare(self, other: Num) -> Result<Ordering, BackcastError> {
        match (self, other) {
            (Num::Float(a), Num::Float(b)) => Ok(a.total_cmp(&b)),
            (Num::Decimal(a), Num::Decimal(b)) => Ok(a.cmp(&b)),
            (a, b) => Err(mismatch(a, b)),
        }
    }

    pub fn is_greater_than(self, other: Num) -> Result<bool, BackcastError> {
        Ok(self.compare(other)? == Ordering::Greater)
    }

    pub fn is_less_than(self, other: Num) -> Result<bool, BackcastError> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn is_equal(self, other: Num) -> Result<bool, BackcastError> {
        Ok(self.compare(other)? == Ordering::Equal)
    }

    pub fn is_greater_than_or_equal(self, other: Num) -> Result<bool, BackcastError> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    pub fn is_less_than_or_equal(self, other: Num) -> Result<bool, BackcastError> {
        Ok(self.compare(other)? != Ordering::Greater)
    }

    pub fn min(self, other: Num) -> Result<Num, BackcastError> {
        match self.compare(other)? {
            Ordering::Greater => Ok(other),
            _ => Ok(self),
        }
    }

    pub fn max(self, other: Num) -> Result<Num, BackcastError> {
        match self.compare(other)? {
            Ordering::Less => Ok(other),
            _ => Ok(self),
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Num::Float(a) => a == 0.0,
            Num::Decimal(a) => a.is_zero(),
        }
    }

    pub fn is_positive(self) -> bool {
        match self {
            Num::Float(a) => a > 0.0,
            Num::Decimal(a) => a.is_sign_positive() && !a.is_zero(),
        }
    }

    /// Lossy view of the value as a float, for display and reporting only.
    pub fn to_f64(self) -> f64 {
        match self {
            Num::Float(a) => a,
            Num::Decimal(a) => a.to_f64().unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Float(a) => write!(f, "{}", a),
            Num::Decimal(a) => write!(f, "{}", a),
        }
    }
}

fn mismatch(left: Num, right: Num) -> BackcastError {
    BackcastError::TypeMismatch {
        left: left.kind(),
        right: right.kind(),
    }
}

fn overflow() -> BackcastError {
    BackcastError::illegal_state("decimal arithmetic overflow")
}
