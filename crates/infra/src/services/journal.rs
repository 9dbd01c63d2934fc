//! Journal engine service: chart of accounts, entries, posting and reports.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scf_accounting::{
    Account, AccountCategory, BalanceDiscrepancy, BalanceSummary, JournalEntry,
    JournalEntryHeader, JournalEntryLine, JournalFilter, TrialBalance, verify_balances,
};
use scf_core::{AccountId, Clock, DomainError, DomainResult, JournalEntryId, Money, UserId};
use scf_parties::OrganizationDirectory;

use crate::error::ServiceResult;
use crate::store::{LedgerState, LedgerStore};

pub const MANUAL_PREFIX: &str = "MAN";
pub const REVERSAL_PREFIX: &str = "REV";

/// Journal line enriched for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineView {
    pub account_code: String,
    pub account_name: String,
    pub debit_amount: Money,
    pub credit_amount: Money,
    pub description: Option<String>,
    pub organization_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryDetail {
    pub entry: JournalEntry,
    pub organization_name: String,
    pub total_debit: Money,
    pub total_credit: Money,
    pub is_balanced: bool,
    pub lines: Vec<JournalLineView>,
}

/// Outcome of a reversal: the reversed entry and its offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reversal {
    pub original: JournalEntry,
    pub reversal: JournalEntry,
}

pub struct JournalService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for JournalService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: LedgerStore> JournalService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Seed the default chart unless accounts already exist.
    #[tracing::instrument(skip(self))]
    pub fn initialize_chart_of_accounts(&self) -> ServiceResult<usize> {
        let now = self.clock.now();
        let created = self.store.transact(|state| Ok(state.chart.seed_defaults(now)))?;
        if created > 0 {
            tracing::info!(created, "chart of accounts initialized");
        }
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    pub fn create_account(
        &self,
        code: String,
        name: String,
        category: AccountCategory,
    ) -> ServiceResult<Account> {
        let now = self.clock.now();
        let account = self.store.transact(|state| {
            let id = state.chart.insert(Account::new(code, name, category, now))?;
            Ok(state.chart.require(id)?.clone())
        })?;
        tracing::info!(account_id = %account.id, code = %account.code, "account created");
        Ok(account)
    }

    /// Toggle whether entries touching the account may be posted.
    #[tracing::instrument(skip(self))]
    pub fn set_account_active(&self, id: AccountId, active: bool) -> ServiceResult<Account> {
        let account = self.store.transact(|state| {
            state.chart.set_active(id, active)?;
            Ok(state.chart.require(id)?.clone())
        })?;
        tracing::info!(account_id = %id, code = %account.code, active, "account activity changed");
        Ok(account)
    }

    pub fn accounts(&self) -> ServiceResult<Vec<Account>> {
        self.store.read(|state| state.chart.iter().cloned().collect())
    }

    pub fn account(&self, id: AccountId) -> ServiceResult<Account> {
        Ok(self.store.read(|state| state.chart.require(id).cloned())??)
    }

    /// Create a pending entry. An empty reference is replaced by a generated
    /// manual reference.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn create_journal_entry(
        &self,
        header: JournalEntryHeader,
        lines: Vec<JournalEntryLine>,
    ) -> ServiceResult<JournalEntry> {
        let now = self.clock.now();
        let entry = self
            .store
            .transact(|state| create_in(state, header, lines, MANUAL_PREFIX, now))?;
        if !entry.is_balanced() {
            tracing::warn!(
                reference = %entry.reference,
                debit = %entry.total_debit(),
                credit = %entry.total_credit(),
                "journal entry created unbalanced; it cannot be posted until corrected"
            );
        }
        tracing::info!(
            entry_id = %entry.id,
            reference = %entry.reference,
            amount = %entry.total_debit(),
            "journal entry created"
        );
        Ok(entry)
    }

    #[tracing::instrument(skip(self))]
    pub fn post_journal_entry(&self, id: JournalEntryId, user: UserId) -> ServiceResult<JournalEntry> {
        let now = self.clock.now();
        let entry = self.store.transact(|state| post_in(state, id, user, now))?;
        tracing::info!(
            entry_id = %entry.id,
            reference = %entry.reference,
            amount = %entry.total_debit(),
            posted_by = %user,
            "journal entry posted"
        );
        Ok(entry)
    }

    #[tracing::instrument(skip(self))]
    pub fn cancel_journal_entry(&self, id: JournalEntryId) -> ServiceResult<JournalEntry> {
        let entry = self.store.transact(|state| {
            let entry = state.journal_entry_mut(id)?;
            entry.cancel()?;
            Ok(entry.clone())
        })?;
        tracing::info!(entry_id = %id, reference = %entry.reference, "journal entry cancelled");
        Ok(entry)
    }

    /// Mark a posted entry reversed and post its offsetting entry.
    #[tracing::instrument(skip(self))]
    pub fn reverse_journal_entry(&self, id: JournalEntryId, user: UserId) -> ServiceResult<Reversal> {
        let now = self.clock.now();
        let out = self.store.transact(|state| {
            let reference = state.next_reference(REVERSAL_PREFIX, now);
            let reversal = state
                .journal_entry(id)?
                .reversal(reference, &state.chart, now, Some(user))?;
            let reversal_id = state.push_journal_entry(reversal);
            let reversal = post_in(state, reversal_id, user, now)?;
            let original = state.journal_entry_mut(id)?;
            original.mark_reversed(reversal_id)?;
            Ok(Reversal {
                original: original.clone(),
                reversal,
            })
        })?;
        tracing::info!(
            entry_id = %id,
            reversal_id = %out.reversal.id,
            reference = %out.reversal.reference,
            "journal entry reversed"
        );
        Ok(out)
    }

    pub fn journal_entry(&self, id: JournalEntryId) -> ServiceResult<JournalEntryDetail> {
        Ok(self.store.read(|state| {
            let entry = state.journal_entry(id)?;
            Ok::<_, DomainError>(detail(state, entry))
        })??)
    }

    /// Entries matching `filter`, newest first.
    pub fn list_journal_entries(
        &self,
        filter: JournalFilter,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<JournalEntry>> {
        self.store.read(|state| {
            let mut entries: Vec<JournalEntry> = state
                .journal()
                .iter()
                .filter(|e| filter.matches(e))
                .cloned()
                .collect();
            entries.sort_by(|a, b| {
                b.transaction_date
                    .cmp(&a.transaction_date)
                    .then(b.created_at.cmp(&a.created_at))
            });
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            entries
        })
    }

    /// Trial balance as of `as_of` (now when `None`).
    ///
    /// Running balances answer the common case; when any balance-affecting
    /// entry is dated after `as_of` the journal is replayed instead.
    #[tracing::instrument(skip(self))]
    pub fn generate_trial_balance(
        &self,
        as_of: Option<DateTime<Utc>>,
        user: UserId,
    ) -> ServiceResult<TrialBalance> {
        let now = self.clock.now();
        let as_of = as_of.unwrap_or(now);
        let tb = self.store.read(|state| {
            let needs_replay = state
                .journal()
                .iter()
                .any(|e| e.status.affects_balances() && e.transaction_date > as_of);
            if needs_replay {
                TrialBalance::replayed(&state.chart, state.journal(), as_of, now, user)
            } else {
                TrialBalance::from_running_balances(&state.chart, as_of, now, user)
            }
        })?;
        tracing::debug!(
            replayed = tb.replayed,
            balanced = tb.is_balanced(),
            total_debits = %tb.total_debits(),
            "trial balance generated"
        );
        Ok(tb)
    }

    pub fn balance_summary(&self) -> ServiceResult<BalanceSummary> {
        self.store.read(|state| state.chart.summary())
    }

    /// Accounts whose running balance disagrees with a replay of the journal.
    pub fn verify_balances(&self) -> ServiceResult<Vec<BalanceDiscrepancy>> {
        let drift = self
            .store
            .read(|state| verify_balances(&state.chart, state.journal()))?;
        if !drift.is_empty() {
            tracing::warn!(accounts = drift.len(), "running balances disagree with journal");
        }
        Ok(drift)
    }
}

/// Create and store a pending entry inside a unit of work.
pub(crate) fn create_in(
    state: &mut LedgerState,
    mut header: JournalEntryHeader,
    lines: Vec<JournalEntryLine>,
    prefix: &str,
    now: DateTime<Utc>,
) -> DomainResult<JournalEntry> {
    if header.reference.trim().is_empty() {
        header.reference = state.next_reference(prefix, header.transaction_date);
    }
    let entry = JournalEntry::create(header, lines, &state.chart, now)?;
    state.push_journal_entry(entry.clone());
    Ok(entry)
}

/// Post a stored entry inside a unit of work.
pub(crate) fn post_in(
    state: &mut LedgerState,
    id: JournalEntryId,
    user: UserId,
    now: DateTime<Utc>,
) -> DomainResult<JournalEntry> {
    let mut entry = state.journal_entry(id)?.clone();
    entry.post(&mut state.chart, user, now)?;
    *state.journal_entry_mut(id)? = entry.clone();
    Ok(entry)
}

fn detail(state: &LedgerState, entry: &JournalEntry) -> JournalEntryDetail {
    let lines = entry
        .lines()
        .iter()
        .map(|line| {
            let (code, name) = state
                .chart
                .get(line.account_id)
                .map(|a| (a.code.clone(), a.name.clone()))
                .unwrap_or_else(|| (String::new(), scf_parties::UNKNOWN_LABEL.to_string()));
            JournalLineView {
                account_code: code,
                account_name: name,
                debit_amount: line.debit_amount,
                credit_amount: line.credit_amount,
                description: line.description.clone(),
                organization_name: state.organizations.display_name(line.organization_id),
            }
        })
        .collect();

    JournalEntryDetail {
        organization_name: state.organizations.display_name(entry.organization_id),
        total_debit: entry.total_debit(),
        total_credit: entry.total_credit(),
        is_balanced: entry.is_balanced(),
        entry: entry.clone(),
        lines,
    }
}
