//! Journal shape per transaction type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_accounting::{Side, codes};
use scf_core::{DomainResult, Money};
use scf_invoicing::FundingTerms;

use crate::transaction::{Transaction, TransactionType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternLeg {
    pub account_code: &'static str,
    pub side: Side,
    pub amount: Money,
    pub description: &'static str,
}

impl PatternLeg {
    fn debit(account_code: &'static str, amount: Money, description: &'static str) -> Self {
        Self {
            account_code,
            side: Side::Debit,
            amount,
            description,
        }
    }

    fn credit(account_code: &'static str, amount: Money, description: &'static str) -> Self {
        Self {
            account_code,
            side: Side::Credit,
            amount,
            description,
        }
    }
}

/// What the transaction does to the organization's facilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum UtilizationEffect {
    None,
    Draw(Money),
    Release(Money),
    AdjustLimit(Money),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalPattern {
    pub legs: Vec<PatternLeg>,
    pub utilization: UtilizationEffect,
    /// Funding split, for invoice funding only.
    pub funding: Option<FundingTerms>,
}

impl JournalPattern {
    /// `false` when the transaction is recorded without a journal entry.
    pub fn has_entry(&self) -> bool {
        !self.legs.is_empty()
    }

    pub fn total(&self, side: Side) -> Money {
        self.legs
            .iter()
            .filter(|l| l.side == side)
            .map(|l| l.amount)
            .sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total(Side::Debit) == self.total(Side::Credit)
    }
}

/// Derive the journal legs and facility effect of `tx`.
pub fn journal_pattern(tx: &Transaction) -> DomainResult<JournalPattern> {
    tx.validate()?;
    let amount = tx.amount;

    let (legs, utilization, funding) = match tx.transaction_type {
        TransactionType::InvoiceUpload => (Vec::new(), UtilizationEffect::None, None),
        TransactionType::InvoiceFunding => {
            let terms = FundingTerms::compute(
                amount,
                tx.interest_or_discount_rate.unwrap_or(Decimal::ZERO),
            )?;
            let legs = vec![
                PatternLeg::debit(codes::LOANS_TO_CUSTOMERS, terms.amount, "Invoice financed"),
                PatternLeg::credit(codes::CASH, terms.funded_amount, "Funds disbursed to seller"),
                PatternLeg::credit(
                    codes::INTEREST_INCOME,
                    terms.discount_amount,
                    "Discount earned",
                ),
            ];
            (legs, UtilizationEffect::Draw(terms.amount), Some(terms))
        }
        TransactionType::Payment => (
            vec![
                PatternLeg::debit(codes::CASH, amount, "Payment received"),
                PatternLeg::credit(codes::LOANS_TO_CUSTOMERS, amount, "Loan repaid"),
            ],
            UtilizationEffect::Release(amount),
            None,
        ),
        TransactionType::FeeCharge => {
            let debit = if tx.is_paid {
                PatternLeg::debit(codes::CASH, amount, "Fee collected")
            } else {
                PatternLeg::debit(codes::FEE_RECEIVABLE, amount, "Fee receivable")
            };
            (
                vec![debit, PatternLeg::credit(codes::FEE_INCOME, amount, "Fee income")],
                UtilizationEffect::None,
                None,
            )
        }
        TransactionType::LimitAdjustment => {
            let size = amount.abs();
            let legs = if amount > Decimal::ZERO {
                vec![
                    PatternLeg::debit(codes::LENDING_BOOK_LIQUIDITY, size, "Limit increase"),
                    PatternLeg::credit(codes::TREASURY_RESERVE, size, "Limit increase"),
                ]
            } else {
                vec![
                    PatternLeg::debit(codes::TREASURY_RESERVE, size, "Limit decrease"),
                    PatternLeg::credit(codes::LENDING_BOOK_LIQUIDITY, size, "Limit decrease"),
                ]
            };
            (legs, UtilizationEffect::AdjustLimit(amount), None)
        }
        TransactionType::TreasuryFunding => (
            vec![
                PatternLeg::debit(codes::CASH, amount, "Treasury funding received"),
                PatternLeg::credit(codes::DUE_TO_TREASURY, amount, "Treasury funding received"),
            ],
            UtilizationEffect::None,
            None,
        ),
    };

    Ok(JournalPattern {
        legs: legs.into_iter().filter(|l| !l.amount.is_zero()).collect(),
        utilization,
        funding,
    })
}
