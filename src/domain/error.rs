//! Domain error types.

use crate::domain::num::NumKind;
use chrono::NaiveDateTime;

/// Top-level error type for backcast.
///
/// Every failure in the core is a programming or data-integrity defect;
/// nothing here is retried or masked.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackcastError {
    #[error("index {index} outside valid range [{begin}, {end}]")]
    IndexOutOfRange {
        index: usize,
        begin: usize,
        end: usize,
    },

    #[error("non-contiguous bar: begins at {actual}, expected {expected}")]
    NonContiguousBar {
        expected: NaiveDateTime,
        actual: NaiveDateTime,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric representation mismatch: {left} vs {right}")]
    TypeMismatch { left: NumKind, right: NumKind },

    #[error("re-entrant indicator evaluation at index {index}")]
    RecursiveEvaluationCycle { index: usize },

    #[error("illegal state: {reason}")]
    IllegalState { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("I/O error: {reason}")]
    Io { reason: String },
}

impl BackcastError {
    pub fn illegal_state(reason: impl Into<String>) -> Self {
        BackcastError::IllegalState {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for BackcastError {
    fn from(err: std::io::Error) -> Self {
        BackcastError::Io {
            reason: err.to_string(),
        }
    }
}

impl From<&BackcastError> for std::process::ExitCode {
    fn from(err: &BackcastError) -> Self {
        let code: u8 = match err {
            BackcastError::Io { .. } => 1,
            BackcastError::ConfigParse { .. }
            | BackcastError::ConfigMissing { .. }
            | BackcastError::ConfigInvalid { .. } => 2,
            BackcastError::Data { .. } => 3,
            BackcastError::IndexOutOfRange { .. }
            | BackcastError::NonContiguousBar { .. }
            | BackcastError::DivisionByZero
            | BackcastError::TypeMismatch { .. }
            | BackcastError::RecursiveEvaluationCycle { .. }
            | BackcastError::IllegalState { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_display() {
        let err = BackcastError::IndexOutOfRange {
            index: 7,
            begin: 2,
            end: 5,
        };
        assert_eq!(err.to_string(), "index 7 outside valid range [2, 5]");
    }

    #[test]
    fn type_mismatch_display() {
        let err = BackcastError::TypeMismatch {
            left: NumKind::Float,
            right: NumKind::Decimal,
        };
        assert_eq!(
            err.to_string(),
            "numeric representation mismatch: float vs decimal"
        );
    }

    #[test]
    fn illegal_state_helper() {
        let err = BackcastError::illegal_state("current trade should not be closed");
        assert_eq!(
            err.to_string(),
            "illegal state: current trade should not be closed"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = BackcastError::from(io);
        assert!(matches!(err, BackcastError::Io { .. }));
    }
}
