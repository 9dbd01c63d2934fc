//! Double-entry journal entries.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::{
    AccountId, DomainError, DomainResult, Entity, InvoiceId, JournalEntryId, Money,
    OrganizationId, TransactionId, UserId, money::ensure_bounded,
};

use crate::account::ChartOfAccounts;

/// Journal entry lifecycle.
///
/// `Pending -> Posted | Cancelled`, `Posted -> Reversed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalEntryStatus {
    Pending,
    Posted,
    Reversed,
    Cancelled,
}

impl JournalEntryStatus {
    /// Whether the entry's lines are reflected in account balances.
    pub fn affects_balances(self) -> bool {
        matches!(self, JournalEntryStatus::Posted | JournalEntryStatus::Reversed)
    }
}

/// One leg of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    pub account_id: AccountId,
    pub debit_amount: Money,
    pub credit_amount: Money,
    pub description: Option<String>,
    /// `None` means the bank's own book.
    pub organization_id: Option<OrganizationId>,
}

impl JournalEntryLine {
    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: None,
            organization_id: None,
        }
    }

    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            description: None,
            organization_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn for_organization(mut self, organization_id: Option<OrganizationId>) -> Self {
        self.organization_id = organization_id;
        self
    }

    /// Amounts are non-negative and bounded, and exactly one leg is non-zero.
    pub fn validate(&self) -> DomainResult<()> {
        if self.debit_amount < Decimal::ZERO || self.credit_amount < Decimal::ZERO {
            return Err(DomainError::invalid_amount(format!(
                "line on account {} has a negative amount",
                self.account_id
            )));
        }
        ensure_bounded(self.debit_amount, "debit amount")?;
        ensure_bounded(self.credit_amount, "credit amount")?;
        let debit = !self.debit_amount.is_zero();
        let credit = !self.credit_amount.is_zero();
        if debit == credit {
            return Err(DomainError::invalid_amount(format!(
                "line on account {} must have exactly one non-zero side",
                self.account_id
            )));
        }
        Ok(())
    }

    /// The same leg on the opposite side.
    pub fn swapped(&self) -> Self {
        Self {
            account_id: self.account_id,
            debit_amount: self.credit_amount,
            credit_amount: self.debit_amount,
            description: self.description.clone(),
            organization_id: self.organization_id,
        }
    }
}

/// Header fields supplied when creating an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryHeader {
    pub reference: String,
    pub transaction_date: DateTime<Utc>,
    pub description: String,
    pub organization_id: Option<OrganizationId>,
    pub invoice_id: Option<InvoiceId>,
    pub transaction_id: Option<TransactionId>,
    pub created_by: Option<UserId>,
}

impl JournalEntryHeader {
    pub fn new(
        reference: impl Into<String>,
        transaction_date: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            reference: reference.into(),
            transaction_date,
            description: description.into(),
            organization_id: None,
            invoice_id: None,
            transaction_id: None,
            created_by: None,
        }
    }

    pub fn for_organization(mut self, organization_id: Option<OrganizationId>) -> Self {
        self.organization_id = organization_id;
        self
    }

    pub fn for_invoice(mut self, invoice_id: Option<InvoiceId>) -> Self {
        self.invoice_id = invoice_id;
        self
    }

    pub fn for_transaction(mut self, transaction_id: Option<TransactionId>) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    pub fn created_by(mut self, user: Option<UserId>) -> Self {
        self.created_by = user;
        self
    }
}

/// Double-entry journal entry with ordered lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub reference: String,
    pub transaction_date: DateTime<Utc>,
    pub description: String,
    pub organization_id: Option<OrganizationId>,
    pub invoice_id: Option<InvoiceId>,
    pub transaction_id: Option<TransactionId>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub status: JournalEntryStatus,
    pub posted_date: Option<DateTime<Utc>>,
    pub posted_by: Option<UserId>,
    /// Set on an entry that offsets another.
    pub reversal_of: Option<JournalEntryId>,
    /// Set on a reversed entry.
    pub reversed_by: Option<JournalEntryId>,
    lines: Vec<JournalEntryLine>,
}

impl JournalEntry {
    /// Build a pending entry. Every line must reference an account in `chart`.
    ///
    /// Balance is not required here; see [`JournalEntry::post`].
    pub fn create(
        header: JournalEntryHeader,
        lines: Vec<JournalEntryLine>,
        chart: &ChartOfAccounts,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("journal entry must have lines"));
        }
        for line in &lines {
            line.validate()?;
            chart.require(line.account_id)?;
        }

        Ok(Self {
            id: JournalEntryId::new(),
            reference: header.reference,
            transaction_date: header.transaction_date,
            description: header.description,
            organization_id: header.organization_id,
            invoice_id: header.invoice_id,
            transaction_id: header.transaction_id,
            created_by: header.created_by,
            created_at,
            status: JournalEntryStatus::Pending,
            posted_date: None,
            posted_by: None,
            reversal_of: None,
            reversed_by: None,
            lines,
        })
    }

    pub fn lines(&self) -> &[JournalEntryLine] {
        &self.lines
    }

    pub fn total_debit(&self) -> Money {
        self.lines.iter().map(|l| l.debit_amount).sum()
    }

    pub fn total_credit(&self) -> Money {
        self.lines.iter().map(|l| l.credit_amount).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }

    /// Post the entry and apply every line to `chart`.
    ///
    /// All checks run before the first balance is touched, so a failure leaves
    /// both the entry and the chart unchanged.
    pub fn post(
        &mut self,
        chart: &mut ChartOfAccounts,
        user: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != JournalEntryStatus::Pending {
            return Err(DomainError::already_posted(format!(
                "journal entry {} is {:?}",
                self.reference, self.status
            )));
        }

        let (debit, credit) = (self.total_debit(), self.total_credit());
        if debit != credit {
            return Err(DomainError::Unbalanced { debit, credit });
        }

        for line in &self.lines {
            let account = chart.require(line.account_id)?;
            if !account.is_active {
                return Err(DomainError::invalid_state(format!(
                    "account {} is inactive",
                    account.code
                )));
            }
        }

        for line in &self.lines {
            chart.apply_line(line.account_id, line.debit_amount, line.credit_amount)?;
        }

        self.status = JournalEntryStatus::Posted;
        self.posted_date = Some(at);
        self.posted_by = Some(user);
        Ok(())
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        match self.status {
            JournalEntryStatus::Pending => {
                self.status = JournalEntryStatus::Cancelled;
                Ok(())
            }
            JournalEntryStatus::Posted | JournalEntryStatus::Reversed => Err(
                DomainError::already_posted(format!("journal entry {} was posted", self.reference)),
            ),
            JournalEntryStatus::Cancelled => Err(DomainError::invalid_state(format!(
                "journal entry {} is already cancelled",
                self.reference
            ))),
        }
    }

    /// Pending entry with every leg swapped, linked to the same parties.
    ///
    /// The caller posts it and then calls [`JournalEntry::mark_reversed`].
    pub fn reversal(
        &self,
        reference: impl Into<String>,
        chart: &ChartOfAccounts,
        at: DateTime<Utc>,
        user: Option<UserId>,
    ) -> DomainResult<JournalEntry> {
        if self.status != JournalEntryStatus::Posted {
            return Err(DomainError::invalid_state(format!(
                "only posted entries can be reversed ({} is {:?})",
                self.reference, self.status
            )));
        }

        let header = JournalEntryHeader::new(
            reference,
            at,
            format!("Reversal of {}", self.reference),
        )
        .for_organization(self.organization_id)
        .for_invoice(self.invoice_id)
        .for_transaction(self.transaction_id)
        .created_by(user);

        let lines = self.lines.iter().map(JournalEntryLine::swapped).collect();
        let mut reversal = JournalEntry::create(header, lines, chart, at)?;
        reversal.reversal_of = Some(self.id);
        Ok(reversal)
    }

    pub fn mark_reversed(&mut self, reversal_id: JournalEntryId) -> DomainResult<()> {
        if self.status != JournalEntryStatus::Posted {
            return Err(DomainError::invalid_state(format!(
                "journal entry {} is {:?}",
                self.reference, self.status
            )));
        }
        self.status = JournalEntryStatus::Reversed;
        self.reversed_by = Some(reversal_id);
        Ok(())
    }
}

impl Entity for JournalEntry {
    type Id = JournalEntryId;

    fn id(&self) -> JournalEntryId {
        self.id
    }
}

/// Journal listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum JournalFilter {
    #[default]
    All,
    Pending,
    Posted,
    OnDate(NaiveDate),
}

impl JournalFilter {
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        match self {
            JournalFilter::All => true,
            JournalFilter::Pending => entry.status == JournalEntryStatus::Pending,
            JournalFilter::Posted => entry.status == JournalEntryStatus::Posted,
            JournalFilter::OnDate(date) => entry.transaction_date.date_naive() == *date,
        }
    }
}

/// `PREFIX-YYYYMMDD-NNNNNN`.
pub fn format_reference(prefix: &str, date: DateTime<Utc>, sequence: u64) -> String {
    format!("{prefix}-{}-{sequence:06}", date.format("%Y%m%d"))
}
