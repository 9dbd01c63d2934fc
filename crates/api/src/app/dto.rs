//! Request bodies and query strings, plus their mapping onto domain types.
//!
//! Identifiers in paths and query strings arrive as bare UUIDs; bodies use the
//! domain id types directly.

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use scf_accounting::{AccountCategory, JournalEntryHeader, JournalEntryLine, JournalFilter};
use scf_core::{AccountId, InvoiceId, Money, OrganizationId, UserId};
use scf_facilities::{FacilitySpec, FacilityType};
use scf_invoicing::{Invoice, InvoiceStatus};
use scf_parties::{ContactInfo, Organization};
use scf_transactions::{Transaction, TransactionType};

use crate::app::errors;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub code: String,
    pub name: String,
    pub category: AccountCategory,
}

#[derive(Debug, Deserialize)]
pub struct AccountActivityRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct JournalLineRequest {
    pub account_id: AccountId,
    #[serde(default)]
    pub debit_amount: Money,
    #[serde(default)]
    pub credit_amount: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
}

impl From<JournalLineRequest> for JournalEntryLine {
    fn from(line: JournalLineRequest) -> Self {
        JournalEntryLine {
            account_id: line.account_id,
            debit_amount: line.debit_amount,
            credit_amount: line.credit_amount,
            description: line.description,
            organization_id: line.organization_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateJournalEntryRequest {
    /// Empty or absent means a generated manual reference.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub lines: Vec<JournalLineRequest>,
}

impl CreateJournalEntryRequest {
    pub fn into_parts(self, now: DateTime<Utc>) -> (JournalEntryHeader, Vec<JournalEntryLine>) {
        let header = JournalEntryHeader::new(
            self.reference.unwrap_or_default(),
            self.transaction_date.unwrap_or(now),
            self.description,
        )
        .for_organization(self.organization_id)
        .for_invoice(self.invoice_id)
        .created_by(self.created_by);
        let lines = self.lines.into_iter().map(JournalEntryLine::from).collect();
        (header, lines)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ActingUserRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    pub status: Option<String>,
    pub date: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl JournalQuery {
    pub fn filter(&self) -> Result<JournalFilter, axum::response::Response> {
        if let Some(date) = self.date {
            return Ok(JournalFilter::OnDate(date));
        }
        match self.status.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("all") => Ok(JournalFilter::All),
            Some("pending") => Ok(JournalFilter::Pending),
            Some("posted") => Ok(JournalFilter::Posted),
            Some(_) => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "status must be one of: all, pending, posted",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    pub as_of: Option<DateTime<Utc>>,
    pub user_id: Option<uuid::Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub is_buyer: bool,
    #[serde(default)]
    pub is_seller: bool,
    #[serde(default)]
    pub is_bank: bool,
}

impl From<CreateOrganizationRequest> for Organization {
    fn from(req: CreateOrganizationRequest) -> Self {
        let mut org = Organization::new(req.name);
        org.tax_id = req.tax_id;
        org.contact = req.contact;
        org.is_buyer = req.is_buyer;
        org.is_seller = req.is_seller;
        org.is_bank = req.is_bank;
        org
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub number: String,
    pub amount: Money,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub seller_id: Option<OrganizationId>,
    #[serde(default)]
    pub buyer_id: Option<OrganizationId>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
}

impl From<CreateInvoiceRequest> for Invoice {
    fn from(req: CreateInvoiceRequest) -> Self {
        let mut invoice = Invoice::new(req.number, req.amount, req.issue_date, req.due_date);
        invoice.description = req.description;
        invoice.seller_id = req.seller_id;
        invoice.buyer_id = req.buyer_id;
        if let Some(currency) = req.currency {
            invoice.currency = currency;
        }
        if let Some(status) = req.status {
            invoice.status = status;
        }
        invoice
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCreditLimitRequest {
    pub master_limit: Money,
    #[serde(default)]
    pub facilities: Vec<FacilitySpec>,
    #[serde(default)]
    pub ceiling: Option<Money>,
}

#[derive(Debug, Deserialize)]
pub struct AddFacilityRequest {
    pub facility_type: FacilityType,
    pub total_limit: Money,
    pub review_end_date: DateTime<Utc>,
    #[serde(default)]
    pub grace_period_days: Option<u32>,
    /// Used only when the organization has no credit limit yet.
    #[serde(default)]
    pub master_limit: Money,
}

#[derive(Debug, Deserialize)]
pub struct AllocateBuyerRequest {
    pub buyer_id: OrganizationId,
    #[serde(default = "default_facility_type")]
    pub facility_type: FacilityType,
    pub amount: Money,
}

#[derive(Debug, Deserialize)]
pub struct AllocateCounterpartyRequest {
    pub party_id: OrganizationId,
    pub amount: Money,
}

#[derive(Debug, Deserialize)]
pub struct UtilizationRequest {
    pub delta: Money,
}

#[derive(Debug, Deserialize)]
pub struct RecordTransactionRequest {
    pub transaction_type: TransactionType,
    pub organization_id: OrganizationId,
    pub amount: Money,
    #[serde(default)]
    pub transaction_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    #[serde(default)]
    pub facility_type: Option<FacilityType>,
    #[serde(default)]
    pub interest_or_discount_rate: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub maturity_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl RecordTransactionRequest {
    pub fn into_transaction(self, now: DateTime<Utc>) -> (Transaction, Option<UserId>) {
        let date = self.transaction_date.unwrap_or(now);
        let mut tx = Transaction::new(self.transaction_type, self.organization_id, self.amount, date);
        if let Some(invoice_id) = self.invoice_id {
            tx = tx.with_invoice(invoice_id);
        }
        if let Some(facility_type) = self.facility_type {
            tx = tx.with_facility_type(facility_type);
        }
        if let Some(rate) = self.interest_or_discount_rate {
            tx = tx.with_rate(rate);
        }
        if let Some(description) = self.description {
            tx = tx.with_description(description);
        }
        if let Some(maturity) = self.maturity_date {
            tx = tx.with_maturity(maturity);
        }
        if self.is_paid {
            tx = tx.paid(self.payment_date.unwrap_or(date));
        }
        (tx, self.user_id)
    }
}

fn default_facility_type() -> FacilityType {
    FacilityType::InvoiceFinancing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(status: Option<&str>, date: Option<NaiveDate>) -> JournalQuery {
        JournalQuery {
            status: status.map(str::to_string),
            date,
            limit: None,
        }
    }

    #[test]
    fn journal_query_maps_to_filter() {
        assert_eq!(query(None, None).filter().ok(), Some(JournalFilter::All));
        assert_eq!(query(Some("Posted"), None).filter().ok(), Some(JournalFilter::Posted));
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert_eq!(
            query(Some("pending"), Some(day)).filter().ok(),
            Some(JournalFilter::OnDate(day))
        );
        assert!(query(Some("void"), None).filter().is_err());
    }

    #[test]
    fn paid_fee_defaults_payment_date_to_transaction_date() {
        let body = serde_json::json!({
            "transaction_type": "fee_charge",
            "organization_id": OrganizationId::new(),
            "amount": "150",
            "transaction_date": "2025-06-02T09:00:00Z",
            "is_paid": true
        });
        let req: RecordTransactionRequest = serde_json::from_value(body).unwrap();
        let (tx, user) = req.into_transaction(Utc::now());
        assert!(tx.is_paid);
        assert_eq!(tx.payment_date, Some(tx.transaction_date));
        assert!(user.is_none());
    }
}
