//! Error taxonomy for the calculator.
//!
//! Every library function that divides by a caller-supplied quantity returns
//! a typed error instead of letting `NaN`/`Infinity` propagate to the caller.

use thiserror::Error;

/// Errors produced by the sizing, financial and simulation calculators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// A caller-supplied divisor was zero (or negative where a positive
    /// quantity is required).
    #[error("division by zero: {quantity} must be positive")]
    DivisionByZero { quantity: &'static str },

    /// Annual savings are zero or negative, so cost-recovery metrics
    /// (payback, IRR) are undefined.
    #[error(
        "not financially viable: annual savings of ${annual_savings:.2}/year \
         cannot repay ${total_cost:.2}"
    )]
    NonFinanciallyViable { total_cost: f64, annual_savings: f64 },

    /// A spec record violates one of its invariants.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
