//! Monetary amounts.
//!
//! Amounts are exact decimals; equality checks on ledger totals never use a
//! tolerance. Every amount entering the ledger is capped at [`MAX_AMOUNT`] so
//! that sums and products over recorded amounts stay far from the `Decimal`
//! range, whose operators panic on overflow.

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Monetary amount in the ledger's single currency.
pub type Money = Decimal;

/// Largest magnitude accepted for a single amount (10^15).
pub const MAX_AMOUNT: Money = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Fail with `InvalidAmount` if `|amount|` exceeds [`MAX_AMOUNT`].
pub fn ensure_bounded(amount: Money, what: &str) -> DomainResult<Money> {
    if amount.abs() > MAX_AMOUNT {
        return Err(DomainError::invalid_amount(format!(
            "{what} exceeds the maximum of {MAX_AMOUNT} (got {amount})"
        )));
    }
    Ok(amount)
}

/// Fail with `InvalidAmount` unless `0 < amount <= MAX_AMOUNT`.
pub fn ensure_positive(amount: Money, what: &str) -> DomainResult<Money> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::invalid_amount(format!(
            "{what} must be positive (got {amount})"
        )));
    }
    ensure_bounded(amount, what)
}

/// Fail with `InvalidAmount` unless `0 <= amount <= MAX_AMOUNT`.
pub fn ensure_non_negative(amount: Money, what: &str) -> DomainResult<Money> {
    if amount < Decimal::ZERO {
        return Err(DomainError::invalid_amount(format!(
            "{what} must not be negative (got {amount})"
        )));
    }
    ensure_bounded(amount, what)
}

/// `a + b`, failing with `InvalidAmount` instead of overflowing.
pub fn checked_sum(a: Money, b: Money) -> DomainResult<Money> {
    a.checked_add(b)
        .ok_or_else(|| DomainError::invalid_amount(format!("{a} + {b} overflows")))
}

/// `amount × rate / 100`, where `rate` is a percentage.
pub fn percent_of(amount: Money, rate: Decimal) -> DomainResult<Money> {
    amount
        .checked_mul(rate)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| DomainError::invalid_amount(format!("{rate}% of {amount} overflows")))
}

/// `part / whole × 100`, or zero when `whole` is not positive.
///
/// Saturates at `Decimal::MAX` for ratios outside the decimal range.
pub fn percentage(part: Money, whole: Money) -> Decimal {
    if whole > Decimal::ZERO {
        part.checked_div(whole)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}
