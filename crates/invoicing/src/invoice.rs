use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::money::{ensure_non_negative, ensure_positive, percent_of};
use scf_core::{DomainError, DomainResult, Entity, InvoiceId, Money, OrganizationId};

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Uploaded,
    /// Uploaded by the buyer rather than the seller.
    BuyerUploaded,
    Validated,
    Approved,
    /// Waiting for the buyer to approve the liability transfer.
    BuyerApprovalPending,
    /// Waiting for the seller to accept early payment.
    SellerAcceptancePending,
    Rejected,
    Funded,
    PartiallyPaid,
    FullyPaid,
    Overdue,
}

/// Discount split of an invoice funding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingTerms {
    /// Face amount financed (booked to loans).
    pub amount: Money,
    /// Discount rate as a percentage (5 means 5%).
    pub discount_rate: Decimal,
    /// `amount × discount_rate / 100`.
    pub discount_amount: Money,
    /// `amount − discount_amount`, paid out to the seller.
    pub funded_amount: Money,
}

impl FundingTerms {
    /// Split `amount` at `discount_rate` percent.
    ///
    /// The rate must lie in `0..=100`.
    pub fn compute(amount: Money, discount_rate: Decimal) -> DomainResult<Self> {
        ensure_positive(amount, "funding amount")?;
        ensure_non_negative(discount_rate, "discount rate")?;
        if discount_rate > Decimal::ONE_HUNDRED {
            return Err(DomainError::invalid_amount(format!(
                "discount rate must not exceed 100% (got {discount_rate})"
            )));
        }

        let discount_amount = percent_of(amount, discount_rate)?;
        Ok(Self {
            amount,
            discount_rate,
            discount_amount,
            funded_amount: amount - discount_amount,
        })
    }
}

/// Invoice financed or settled through the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub amount: Money,
    pub description: String,
    pub seller_id: Option<OrganizationId>,
    pub buyer_id: Option<OrganizationId>,
    pub currency: String,
    pub status: InvoiceStatus,
    pub funding_date: Option<DateTime<Utc>>,
    pub funded_amount: Option<Money>,
    pub discount_rate: Option<Decimal>,
    pub payment_date: Option<DateTime<Utc>>,
    pub paid_amount: Option<Money>,
}

impl Invoice {
    /// New invoice in `Uploaded` status.
    pub fn new(
        number: impl Into<String>,
        amount: Money,
        issue_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvoiceId::new(),
            number: number.into(),
            issue_date,
            due_date,
            amount,
            description: String::new(),
            seller_id: None,
            buyer_id: None,
            currency: "USD".to_string(),
            status: InvoiceStatus::Uploaded,
            funding_date: None,
            funded_amount: None,
            discount_rate: None,
            payment_date: None,
            paid_amount: None,
        }
    }

    pub fn with_parties(mut self, seller: OrganizationId, buyer: OrganizationId) -> Self {
        self.seller_id = Some(seller);
        self.buyer_id = Some(buyer);
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn paid(&self) -> Money {
        self.paid_amount.unwrap_or(Decimal::ZERO)
    }

    /// Face amount not yet paid.
    pub fn amount_due(&self) -> Money {
        (self.amount - self.paid()).max(Decimal::ZERO)
    }

    /// Invariant: only approved invoices are financed.
    pub fn can_fund(&self) -> bool {
        self.status == InvoiceStatus::Approved
    }

    pub fn can_accept_payment(&self) -> bool {
        matches!(
            self.status,
            InvoiceStatus::Funded | InvoiceStatus::PartiallyPaid | InvoiceStatus::Overdue
        ) && self.amount_due() > Decimal::ZERO
    }

    /// Record a funding against this invoice.
    ///
    /// The funding must cover the full face amount: later payments release
    /// utilization and credit loans by what the buyer pays, so the financed
    /// principal has to equal what the buyer owes.
    pub fn mark_funded(&mut self, terms: &FundingTerms, at: DateTime<Utc>) -> DomainResult<()> {
        if !self.can_fund() {
            return Err(DomainError::invalid_state(format!(
                "invoice {} cannot be funded in status {:?}",
                self.number, self.status
            )));
        }
        if terms.amount != self.amount {
            return Err(DomainError::invalid_amount(format!(
                "funding amount {} must equal invoice amount {}",
                terms.amount, self.amount
            )));
        }

        self.status = InvoiceStatus::Funded;
        self.funded_amount = Some(terms.funded_amount);
        self.discount_rate = Some(terms.discount_rate);
        self.funding_date = Some(at);
        Ok(())
    }

    /// Apply a buyer payment; returns the resulting status.
    pub fn apply_payment(&mut self, amount: Money, at: DateTime<Utc>) -> DomainResult<InvoiceStatus> {
        ensure_positive(amount, "payment amount")?;
        if !self.can_accept_payment() {
            return Err(DomainError::invalid_state(format!(
                "invoice {} cannot accept payment in status {:?}",
                self.number, self.status
            )));
        }
        let due = self.amount_due();
        if amount > due {
            return Err(DomainError::invalid_amount(format!(
                "payment {amount} exceeds amount due {due}"
            )));
        }

        self.paid_amount = Some(self.paid() + amount);
        self.payment_date = Some(at);
        self.status = if self.amount_due() == Decimal::ZERO {
            InvoiceStatus::FullyPaid
        } else {
            InvoiceStatus::PartiallyPaid
        };
        Ok(self.status)
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn approved_invoice(amount: Money) -> Invoice {
        let now = Utc::now();
        Invoice::new("INV-2025-001", amount, now, now + Duration::days(30))
            .with_parties(OrganizationId::new(), OrganizationId::new())
            .with_status(InvoiceStatus::Approved)
    }

    #[test]
    fn funding_terms_split_discount() {
        let terms = FundingTerms::compute(dec!(100000), dec!(5)).unwrap();
        assert_eq!(terms.discount_amount, dec!(5000));
        assert_eq!(terms.funded_amount, dec!(95000));
    }

    #[test]
    fn funding_rate_above_hundred_is_rejected() {
        let err = FundingTerms::compute(dec!(100), dec!(101)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAmount(_)));
    }

    #[test]
    fn only_approved_invoices_are_funded() {
        let mut invoice = approved_invoice(dec!(10000)).with_status(InvoiceStatus::Uploaded);
        let terms = FundingTerms::compute(dec!(10000), dec!(5)).unwrap();
        let err = invoice.mark_funded(&terms, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(invoice.status, InvoiceStatus::Uploaded);
    }

    #[test]
    fn funding_must_cover_the_face_amount() {
        let mut invoice = approved_invoice(dec!(100000));
        for amount in [dec!(50000), dec!(100000.01)] {
            let terms = FundingTerms::compute(amount, dec!(5)).unwrap();
            let err = invoice.mark_funded(&terms, Utc::now()).unwrap_err();
            assert!(matches!(err, DomainError::InvalidAmount(_)));
        }
        assert_eq!(invoice.status, InvoiceStatus::Approved);
        assert_eq!(invoice.funded_amount, None);
    }

    #[test]
    fn oversized_funding_is_rejected_without_panicking() {
        let err = FundingTerms::compute(Decimal::MAX, dec!(50)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAmount(_)));
    }

    #[test]
    fn payments_move_through_partial_to_fully_paid() {
        let mut invoice = approved_invoice(dec!(10000));
        let terms = FundingTerms::compute(dec!(10000), dec!(5)).unwrap();
        invoice.mark_funded(&terms, Utc::now()).unwrap();
        assert_eq!(invoice.funded_amount, Some(dec!(9500)));

        let status = invoice.apply_payment(dec!(4000), Utc::now()).unwrap();
        assert_eq!(status, InvoiceStatus::PartiallyPaid);
        assert_eq!(invoice.amount_due(), dec!(6000));

        let err = invoice.apply_payment(dec!(6000.01), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAmount(_)));

        let status = invoice.apply_payment(dec!(6000), Utc::now()).unwrap();
        assert_eq!(status, InvoiceStatus::FullyPaid);
        assert!(!invoice.can_accept_payment());
    }

    proptest! {
        /// Property: discount plus funded amount always reconstitutes the face amount.
        #[test]
        fn funding_split_is_exact(cents in 1i64..10_000_000_000i64, rate_bp in 0u32..=10_000u32) {
            let amount = Decimal::new(cents, 2);
            let rate = Decimal::new(rate_bp as i64, 2);
            let terms = FundingTerms::compute(amount, rate).unwrap();
            prop_assert_eq!(terms.discount_amount + terms.funded_amount, amount);
        }
    }
}
