//! Domain error model.

use thiserror::Error;

use crate::money::Money;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is recoverable by the caller. Operations that fail with a
/// `DomainError` leave ledger and limit state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An organization, facility, account, journal entry or other record is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Debits and credits differ at posting time.
    #[error("journal entry is not balanced (debit {debit}, credit {credit})")]
    Unbalanced { debit: Money, credit: Money },

    /// A journal entry was already posted (or otherwise left the pending state).
    #[error("already posted: {0}")]
    AlreadyPosted(String),

    /// A utilization or allocation would exceed the available limit.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The facility is past its review end date plus grace period.
    #[error("facility expired: {0}")]
    Expired(String),

    /// A non-positive or malformed amount was supplied.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The record is not in a state that allows the requested transition.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The operation conflicts with existing state (e.g. duplicate record).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_posted(msg: impl Into<String>) -> Self {
        Self::AlreadyPosted(msg.into())
    }

    pub fn limit_exceeded(msg: impl Into<String>) -> Self {
        Self::LimitExceeded(msg.into())
    }

    pub fn expired(msg: impl Into<String>) -> Self {
        Self::Expired(msg.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "not_found",
            DomainError::Unbalanced { .. } => "unbalanced",
            DomainError::AlreadyPosted(_) => "already_posted",
            DomainError::LimitExceeded(_) => "limit_exceeded",
            DomainError::Expired(_) => "expired",
            DomainError::InvalidAmount(_) => "invalid_amount",
            DomainError::Validation(_) => "validation_error",
            DomainError::InvalidState(_) => "invalid_state",
            DomainError::Conflict(_) => "conflict",
            DomainError::InvalidId(_) => "invalid_id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn unbalanced_message_carries_both_totals() {
        let err = DomainError::Unbalanced {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(9000, 2),
        };
        let msg = err.to_string();
        assert!(msg.contains("100.00"));
        assert!(msg.contains("90.00"));
        assert_eq!(err.code(), "unbalanced");
    }
}
