//! Error handling for Carteira
//!
//! Defines typed errors for the calculation layer and the portfolio document,
//! and establishes a unified Result type using anyhow for context chaining
//! at the application boundary.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the pure calculation layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("{field} cannot be negative (got {value})")]
    NegativeValue { field: &'static str, value: Decimal },

    #[error("{field} must be greater than zero (got {value})")]
    ZeroBase { field: &'static str, value: Decimal },

    #[error("rate must be greater than -100% (got {0}%)")]
    RateOutOfRange(Decimal),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

/// Core error types for portfolio operations
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("parse error: {0}")]
    ParseError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("calculation error: {0}")]
    Calc(#[from] CalcError),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for portfolio operations
pub type Result<T> = anyhow::Result<T>;

/// Reject negative inputs, naming the offending field.
pub(crate) fn ensure_non_negative(
    field: &'static str,
    value: Decimal,
) -> std::result::Result<(), CalcError> {
    if value < Decimal::ZERO {
        return Err(CalcError::NegativeValue { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calc_error_formatting_is_readable() {
        let err = CalcError::NegativeValue {
            field: "current value",
            value: dec!(-10),
        };
        assert_eq!(err.to_string(), "current value cannot be negative (got -10)");

        let err = CalcError::RateOutOfRange(dec!(-100));
        assert_eq!(err.to_string(), "rate must be greater than -100% (got -100%)");
    }

    #[test]
    fn test_not_found_names_entity() {
        let err = PortfolioError::NotFound {
            entity: "holding",
            id: 7,
        };
        assert_eq!(err.to_string(), "holding 7 not found");
    }

    #[test]
    fn test_calc_error_converts_into_portfolio_error() {
        let err: PortfolioError = CalcError::InvalidPeriod("zero months".to_string()).into();
        assert!(err.to_string().starts_with("calculation error"));
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(anyhow::anyhow!("original error")).context("failed to load portfolio");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to load portfolio"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("original error"));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("value", dec!(0)).is_ok());
        assert!(ensure_non_negative("value", dec!(-0.01)).is_err());
    }
}
