//! Transaction recorder: one business event, one unit of work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scf_accounting::{JournalEntry, JournalEntryHeader, JournalEntryLine, Side};
use scf_core::{
    Clock, DomainError, DomainResult, FacilityId, Money, OrganizationId, TransactionId, UserId,
};
use scf_facilities::FacilityType;
use scf_invoicing::InvoiceStatus;
use scf_transactions::{
    JournalPattern, Transaction, TransactionType, UtilizationEffect, journal_pattern,
};

use crate::config::EngineConfig;
use crate::error::ServiceResult;
use crate::services::journal::{create_in, post_in};
use crate::services::limits::update_utilization_in;
use crate::store::{LedgerState, LedgerStore};

/// Everything a recorded transaction changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedTransaction {
    pub transaction: Transaction,
    pub journal_entry: Option<JournalEntry>,
    pub facility_id: Option<FacilityId>,
    /// Facility utilization after the change, when one was drawn or released.
    pub utilization: Option<Money>,
    pub invoice_status: Option<InvoiceStatus>,
}

pub struct TransactionRecorder<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: Arc<EngineConfig>,
}

impl<S> Clone for TransactionRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: LedgerStore> TransactionRecorder<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Persist `tx` together with its journal entry, facility change and
    /// invoice update. Either all of them apply or none does.
    #[tracing::instrument(
        skip(self, tx),
        fields(transaction_id = %tx.id, kind = %tx.transaction_type, amount = %tx.amount)
    )]
    pub fn record_transaction(
        &self,
        tx: Transaction,
        user: Option<UserId>,
    ) -> ServiceResult<RecordedTransaction> {
        tx.validate()?;
        let now = self.clock.now();
        let config = Arc::clone(&self.config);
        let recorded = self
            .store
            .transact(|state| record_in(state, &config, tx, user, now))?;
        tracing::info!(
            transaction_id = %recorded.transaction.id,
            organization_id = %recorded.transaction.organization_id,
            entry = ?recorded.journal_entry.as_ref().map(|e| e.reference.as_str()),
            facility_id = ?recorded.facility_id,
            utilization = ?recorded.utilization,
            "transaction recorded"
        );
        Ok(recorded)
    }

    pub fn transaction(&self, id: TransactionId) -> ServiceResult<Transaction> {
        Ok(self.store.read(|state| state.transaction(id).cloned())??)
    }

    /// Transactions of one organization, newest first.
    pub fn transaction_history(
        &self,
        organization_id: OrganizationId,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Transaction>> {
        self.store.read(|state| {
            let mut history: Vec<Transaction> = state
                .transactions()
                .iter()
                .filter(|t| t.organization_id == organization_id)
                .cloned()
                .collect();
            history.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date));
            if let Some(limit) = limit {
                history.truncate(limit);
            }
            history
        })
    }
}

fn record_in(
    state: &mut LedgerState,
    config: &EngineConfig,
    tx: Transaction,
    user: Option<UserId>,
    now: DateTime<Utc>,
) -> DomainResult<RecordedTransaction> {
    let pattern = journal_pattern(&tx)?;
    state.organization(tx.organization_id)?;

    let (owner, counterparty, invoice_status) = apply_invoice_effect(state, &tx, &pattern)?;
    let (facility_id, utilization) =
        apply_facility_effect(state, config, &tx, pattern.utilization, owner, counterparty, now)?;

    let journal_entry = if pattern.has_entry() {
        let entry = create_entry(state, &tx, &pattern, user, now)?;
        if config.auto_post {
            Some(post_in(state, entry.id, user.unwrap_or(config.system_user), now)?)
        } else {
            Some(entry)
        }
    } else {
        None
    };

    state.push_transaction(tx.clone())?;
    Ok(RecordedTransaction {
        transaction: tx,
        journal_entry,
        facility_id,
        utilization,
        invoice_status,
    })
}

/// Update the linked invoice; returns the facility owner and counterparty
/// for drawdowns against it.
fn apply_invoice_effect(
    state: &mut LedgerState,
    tx: &Transaction,
    pattern: &JournalPattern,
) -> DomainResult<(OrganizationId, Option<OrganizationId>, Option<InvoiceStatus>)> {
    let Some(invoice_id) = tx.invoice_id else {
        return Ok((tx.organization_id, None, None));
    };
    let invoice = state.invoice_mut(invoice_id)?;
    let owner = invoice.seller_id.unwrap_or(tx.organization_id);
    let counterparty = invoice.buyer_id;

    let status = match (tx.transaction_type, pattern.funding.as_ref()) {
        (TransactionType::InvoiceFunding, Some(terms)) => {
            invoice.mark_funded(terms, tx.transaction_date)?;
            Some(invoice.status)
        }
        (TransactionType::Payment, _) => Some(invoice.apply_payment(tx.amount, tx.transaction_date)?),
        _ => None,
    };
    Ok((owner, counterparty, status))
}

fn apply_facility_effect(
    state: &mut LedgerState,
    config: &EngineConfig,
    tx: &Transaction,
    effect: UtilizationEffect,
    owner: OrganizationId,
    counterparty: Option<OrganizationId>,
    now: DateTime<Utc>,
) -> DomainResult<(Option<FacilityId>, Option<Money>)> {
    let delta = match effect {
        UtilizationEffect::None => return Ok((None, None)),
        UtilizationEffect::AdjustLimit(delta) => {
            let facility_id = base_facility(state, tx.organization_id, tx.facility_type)?;
            state.update_credit_limit(tx.organization_id, |info| {
                info.adjust_facility_limit(facility_id, delta)
            })?;
            return Ok((Some(facility_id), None));
        }
        UtilizationEffect::Draw(amount) => amount,
        UtilizationEffect::Release(amount) => -amount,
    };

    let resolved = state
        .credit_limit(owner)
        .ok()
        .and_then(|info| info.resolve_facility(tx.facility_type, counterparty))
        .map(|f| f.id);

    match resolved {
        Some(facility_id) => {
            let utilization = update_utilization_in(state, facility_id, delta, now)?;
            Ok((Some(facility_id), Some(utilization)))
        }
        None if config.require_facility && delta.is_sign_positive() => {
            Err(DomainError::not_found(format!(
                "{} facility for organization {owner}",
                tx.facility_type
            )))
        }
        None => {
            tracing::warn!(
                transaction_id = %tx.id,
                organization_id = %owner,
                facility_type = %tx.facility_type,
                "no facility to consume; recording without utilization"
            );
            Ok((None, None))
        }
    }
}

fn base_facility(
    state: &LedgerState,
    organization_id: OrganizationId,
    facility_type: FacilityType,
) -> DomainResult<FacilityId> {
    state
        .credit_limit(organization_id)?
        .base_facility(facility_type)
        .map(|f| f.id)
        .ok_or_else(|| {
            DomainError::not_found(format!(
                "{facility_type} facility for organization {organization_id}"
            ))
        })
}

fn create_entry(
    state: &mut LedgerState,
    tx: &Transaction,
    pattern: &JournalPattern,
    user: Option<UserId>,
    now: DateTime<Utc>,
) -> DomainResult<JournalEntry> {
    // Internal transfers stay on the bank's own book.
    let attribution = match tx.transaction_type {
        TransactionType::LimitAdjustment | TransactionType::TreasuryFunding => None,
        _ => Some(tx.organization_id),
    };

    let lines = pattern
        .legs
        .iter()
        .map(|leg| {
            let account = state.chart.require_code(leg.account_code)?;
            let line = match leg.side {
                Side::Debit => JournalEntryLine::debit(account.id, leg.amount),
                Side::Credit => JournalEntryLine::credit(account.id, leg.amount),
            };
            Ok(line
                .with_description(leg.description)
                .for_organization(attribution))
        })
        .collect::<DomainResult<Vec<_>>>()?;

    let description = if tx.description.trim().is_empty() {
        tx.transaction_type.to_string()
    } else {
        tx.description.clone()
    };
    let header = JournalEntryHeader::new(String::new(), tx.transaction_date, description)
        .for_organization(Some(tx.organization_id))
        .for_invoice(tx.invoice_id)
        .for_transaction(Some(tx.id))
        .created_by(user);

    create_in(state, header, lines, tx.transaction_type.reference_prefix(), now)
}
