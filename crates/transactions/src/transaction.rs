use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::{
    DomainError, DomainResult, Entity, InvoiceId, Money, OrganizationId, TransactionId,
    money::ensure_bounded,
};
use scf_facilities::FacilityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    InvoiceUpload,
    InvoiceFunding,
    Payment,
    LimitAdjustment,
    FeeCharge,
    TreasuryFunding,
}

impl TransactionType {
    /// Prefix of the generated journal reference.
    pub fn reference_prefix(self) -> &'static str {
        match self {
            TransactionType::InvoiceUpload => "UPL",
            TransactionType::InvoiceFunding => "FUND",
            TransactionType::Payment => "PAY",
            TransactionType::LimitAdjustment => "LADJ",
            TransactionType::FeeCharge => "FEE",
            TransactionType::TreasuryFunding => "TRSY",
        }
    }

    pub fn requires_invoice(self) -> bool {
        matches!(
            self,
            TransactionType::InvoiceUpload
                | TransactionType::InvoiceFunding
                | TransactionType::Payment
        )
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransactionType::InvoiceUpload => "Invoice Upload",
            TransactionType::InvoiceFunding => "Invoice Funding",
            TransactionType::Payment => "Payment",
            TransactionType::LimitAdjustment => "Limit Adjustment",
            TransactionType::FeeCharge => "Fee Charge",
            TransactionType::TreasuryFunding => "Treasury Funding",
        };
        f.write_str(label)
    }
}

/// Business event submitted to the recorder.
///
/// `amount` is positive except for a limit adjustment, where its sign is the
/// direction of the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub transaction_type: TransactionType,
    pub facility_type: FacilityType,
    pub organization_id: OrganizationId,
    pub invoice_id: Option<InvoiceId>,
    pub description: String,
    pub amount: Money,
    pub interest_or_discount_rate: Option<Decimal>,
    pub transaction_date: DateTime<Utc>,
    pub maturity_date: Option<DateTime<Utc>>,
    pub is_paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(
        transaction_type: TransactionType,
        organization_id: OrganizationId,
        amount: Money,
        transaction_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            transaction_type,
            facility_type: FacilityType::InvoiceFinancing,
            organization_id,
            invoice_id: None,
            description: String::new(),
            amount,
            interest_or_discount_rate: None,
            transaction_date,
            maturity_date: None,
            is_paid: false,
            payment_date: None,
        }
    }

    pub fn with_invoice(mut self, invoice_id: InvoiceId) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    pub fn with_facility_type(mut self, facility_type: FacilityType) -> Self {
        self.facility_type = facility_type;
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.interest_or_discount_rate = Some(rate);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_maturity(mut self, maturity: DateTime<Utc>) -> Self {
        self.maturity_date = Some(maturity);
        self
    }

    pub fn paid(mut self, at: DateTime<Utc>) -> Self {
        self.is_paid = true;
        self.payment_date = Some(at);
        self
    }

    /// Shape checks that need no stored state.
    pub fn validate(&self) -> DomainResult<()> {
        match self.transaction_type {
            TransactionType::LimitAdjustment if self.amount.is_zero() => {
                return Err(DomainError::invalid_amount("limit adjustment must be non-zero"));
            }
            TransactionType::LimitAdjustment => {}
            _ if self.amount <= Decimal::ZERO => {
                return Err(DomainError::invalid_amount(format!(
                    "transaction amount must be positive (got {})",
                    self.amount
                )));
            }
            _ => {}
        }
        ensure_bounded(self.amount, "transaction amount")?;
        if let Some(rate) = self.interest_or_discount_rate {
            ensure_bounded(rate, "rate")?;
        }
        if self.transaction_type.requires_invoice() && self.invoice_id.is_none() {
            return Err(DomainError::validation(format!(
                "{} transaction requires an invoice",
                self.transaction_type
            )));
        }
        Ok(())
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }
}
