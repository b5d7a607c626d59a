//! Domain errors raised by the ledger rules

use thiserror::Error;

/// Errors produced by the stock and record ledger rules.
///
/// These never carry persistence failures; the backend wraps them into its
/// own error type and aborts the enclosing transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient stock. Available: {available}, requested: {requested}")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Payment can only be made for credit sales")]
    NotCreditSale,

    #[error("Payment of {amount} exceeds outstanding debt of {outstanding}")]
    Overpayment {
        amount: rust_decimal::Decimal,
        outstanding: rust_decimal::Decimal,
    },

    #[error("Invalid credit sale: {0}")]
    InvalidCreditSaleInput(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
}

impl LedgerError {
    /// Field the error refers to, when there is one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            LedgerError::InsufficientStock { .. } => Some("quantity"),
            LedgerError::Overpayment { .. } | LedgerError::InvalidAmount(_) => Some("amount"),
            LedgerError::InvalidPrice(_) => Some("selling_price"),
            LedgerError::InvalidDate(_) => Some("due_date"),
            LedgerError::UnknownValue { field, .. } => Some(*field),
            LedgerError::NotCreditSale | LedgerError::InvalidCreditSaleInput(_) => None,
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
