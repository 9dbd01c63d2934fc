//! Trial balance snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::{AccountId, Money, UserId};

use crate::account::{Account, AccountType, ChartOfAccounts, Side};
use crate::journal::JournalEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    pub account_id: AccountId,
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub debit_balance: Money,
    pub credit_balance: Money,
}

impl TrialBalanceLine {
    /// Bucket `balance` by the account's normal side. A negative balance lands
    /// in the opposite column as an absolute value.
    pub fn new(account: &Account, balance: Money) -> Self {
        let side = match (account.account_type.normal_side(), balance < Decimal::ZERO) {
            (side, false) => side,
            (Side::Debit, true) => Side::Credit,
            (Side::Credit, true) => Side::Debit,
        };
        let amount = balance.abs();
        let (debit_balance, credit_balance) = match side {
            Side::Debit => (amount, Decimal::ZERO),
            Side::Credit => (Decimal::ZERO, amount),
        };
        Self {
            account_id: account.id,
            account_code: account.code.clone(),
            account_name: account.name.clone(),
            account_type: account.account_type,
            debit_balance,
            credit_balance,
        }
    }
}

/// Point-in-time snapshot of every account's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub as_of: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub generated_by: UserId,
    /// Whether balances were recomputed from journal history.
    pub replayed: bool,
    pub lines: Vec<TrialBalanceLine>,
}

impl TrialBalance {
    /// Snapshot from the chart's running balances.
    pub fn from_running_balances(
        chart: &ChartOfAccounts,
        as_of: DateTime<Utc>,
        generated_at: DateTime<Utc>,
        generated_by: UserId,
    ) -> Self {
        Self {
            as_of,
            generated_at,
            generated_by,
            replayed: false,
            lines: chart
                .iter()
                .map(|account| TrialBalanceLine::new(account, account.balance()))
                .collect(),
        }
    }

    /// Snapshot recomputed from posted entries dated on or before `as_of`.
    pub fn replayed<'a>(
        chart: &ChartOfAccounts,
        entries: impl IntoIterator<Item = &'a JournalEntry>,
        as_of: DateTime<Utc>,
        generated_at: DateTime<Utc>,
        generated_by: UserId,
    ) -> Self {
        let balances = replay_balances(
            chart,
            entries
                .into_iter()
                .filter(|entry| entry.transaction_date <= as_of),
        );
        Self {
            as_of,
            generated_at,
            generated_by,
            replayed: true,
            lines: chart
                .iter()
                .map(|account| {
                    let balance = balances.get(&account.id).copied().unwrap_or_default();
                    TrialBalanceLine::new(account, balance)
                })
                .collect(),
        }
    }

    pub fn total_debits(&self) -> Money {
        self.lines.iter().map(|l| l.debit_balance).sum()
    }

    pub fn total_credits(&self) -> Money {
        self.lines.iter().map(|l| l.credit_balance).sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total_debits() == self.total_credits()
    }
}

/// Fold the effect of every balance-affecting entry into per-account balances.
pub fn replay_balances<'a>(
    chart: &ChartOfAccounts,
    entries: impl IntoIterator<Item = &'a JournalEntry>,
) -> HashMap<AccountId, Money> {
    let mut balances: HashMap<AccountId, Money> = HashMap::new();
    for entry in entries {
        if !entry.status.affects_balances() {
            continue;
        }
        for line in entry.lines() {
            let Some(account) = chart.get(line.account_id) else {
                continue;
            };
            *balances.entry(account.id).or_default() += account
                .account_type
                .balance_effect(line.debit_amount, line.credit_amount);
        }
    }
    balances
}

/// An account whose running balance disagrees with the replayed journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDiscrepancy {
    pub account_id: AccountId,
    pub account_code: String,
    pub running_balance: Money,
    pub replayed_balance: Money,
}

/// Compare running balances against a full replay of `entries`.
pub fn verify_balances<'a>(
    chart: &ChartOfAccounts,
    entries: impl IntoIterator<Item = &'a JournalEntry>,
) -> Vec<BalanceDiscrepancy> {
    let replayed = replay_balances(chart, entries);
    chart
        .iter()
        .filter_map(|account| {
            let replayed_balance = replayed.get(&account.id).copied().unwrap_or_default();
            (replayed_balance != account.balance()).then(|| BalanceDiscrepancy {
                account_id: account.id,
                account_code: account.code.clone(),
                running_balance: account.balance(),
                replayed_balance,
            })
        })
        .collect()
}
