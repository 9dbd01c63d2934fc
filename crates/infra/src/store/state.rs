use std::collections::HashMap;

use chrono::{DateTime, Utc};

use scf_accounting::{ChartOfAccounts, JournalEntry, format_reference};
use scf_core::{
    DomainError, DomainResult, FacilityId, InvoiceId, JournalEntryId, OrganizationId,
    TransactionId,
};
use scf_facilities::CreditLimitInfo;
use scf_invoicing::Invoice;
use scf_parties::Organization;
use scf_transactions::Transaction;

/// Everything the engine persists.
///
/// Journal entries and transactions are append-only logs with id indices;
/// credit limits are keyed by owner with a facility → owner index.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    pub organizations: HashMap<OrganizationId, Organization>,
    pub invoices: HashMap<InvoiceId, Invoice>,
    pub chart: ChartOfAccounts,
    journal: Vec<JournalEntry>,
    journal_index: HashMap<JournalEntryId, usize>,
    transactions: Vec<Transaction>,
    transaction_index: HashMap<TransactionId, usize>,
    credit_limits: HashMap<OrganizationId, CreditLimitInfo>,
    facility_owners: HashMap<FacilityId, OrganizationId>,
    reference_sequence: u64,
}

impl LedgerState {
    pub fn organization(&self, id: OrganizationId) -> DomainResult<&Organization> {
        self.organizations
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("organization {id}")))
    }

    pub fn invoice_mut(&mut self, id: InvoiceId) -> DomainResult<&mut Invoice> {
        self.invoices
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("invoice {id}")))
    }

    /// Next journal reference, unique within this store.
    pub fn next_reference(&mut self, prefix: &str, date: DateTime<Utc>) -> String {
        self.reference_sequence += 1;
        format_reference(prefix, date, self.reference_sequence)
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn journal_entry(&self, id: JournalEntryId) -> DomainResult<&JournalEntry> {
        self.journal_index
            .get(&id)
            .map(|&i| &self.journal[i])
            .ok_or_else(|| DomainError::not_found(format!("journal entry {id}")))
    }

    pub fn journal_entry_mut(&mut self, id: JournalEntryId) -> DomainResult<&mut JournalEntry> {
        match self.journal_index.get(&id) {
            Some(&i) => Ok(&mut self.journal[i]),
            None => Err(DomainError::not_found(format!("journal entry {id}"))),
        }
    }

    pub fn push_journal_entry(&mut self, entry: JournalEntry) -> JournalEntryId {
        let id = entry.id;
        self.journal_index.insert(id, self.journal.len());
        self.journal.push(entry);
        id
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: TransactionId) -> DomainResult<&Transaction> {
        self.transaction_index
            .get(&id)
            .map(|&i| &self.transactions[i])
            .ok_or_else(|| DomainError::not_found(format!("transaction {id}")))
    }

    pub fn push_transaction(&mut self, tx: Transaction) -> DomainResult<TransactionId> {
        let id = tx.id;
        if self.transaction_index.contains_key(&id) {
            return Err(DomainError::conflict(format!("transaction {id} already recorded")));
        }
        self.transaction_index.insert(id, self.transactions.len());
        self.transactions.push(tx);
        Ok(id)
    }

    pub fn credit_limits(&self) -> impl Iterator<Item = &CreditLimitInfo> + '_ {
        self.credit_limits.values()
    }

    pub fn credit_limit(&self, organization_id: OrganizationId) -> DomainResult<&CreditLimitInfo> {
        self.credit_limits.get(&organization_id).ok_or_else(|| {
            DomainError::not_found(format!("credit limit for organization {organization_id}"))
        })
    }

    pub fn has_credit_limit(&self, organization_id: OrganizationId) -> bool {
        self.credit_limits.contains_key(&organization_id)
    }

    pub fn insert_credit_limit(&mut self, info: CreditLimitInfo) -> DomainResult<()> {
        let owner = info.organization_id;
        if self.credit_limits.contains_key(&owner) {
            return Err(DomainError::conflict(format!(
                "organization {owner} already has a credit limit"
            )));
        }
        self.credit_limits.insert(owner, info);
        self.reindex_facilities(owner);
        Ok(())
    }

    /// Mutate one organization's credit limit and refresh the facility index.
    pub fn update_credit_limit<R>(
        &mut self,
        organization_id: OrganizationId,
        f: impl FnOnce(&mut CreditLimitInfo) -> DomainResult<R>,
    ) -> DomainResult<R> {
        let info = self.credit_limits.get_mut(&organization_id).ok_or_else(|| {
            DomainError::not_found(format!("credit limit for organization {organization_id}"))
        })?;
        let out = f(info)?;
        self.reindex_facilities(organization_id);
        Ok(out)
    }

    pub fn facility_owner(&self, facility_id: FacilityId) -> DomainResult<OrganizationId> {
        self.facility_owners
            .get(&facility_id)
            .copied()
            .ok_or_else(|| DomainError::not_found(format!("facility {facility_id}")))
    }

    fn reindex_facilities(&mut self, owner: OrganizationId) {
        if let Some(info) = self.credit_limits.get(&owner) {
            for facility in info.facilities() {
                self.facility_owners.insert(facility.id, owner);
            }
        }
    }
}
