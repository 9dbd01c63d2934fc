//! Chart-of-accounts entries and the account registry.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use scf_core::{AccountId, DomainError, DomainResult, Entity, Money};

/// High-level account type (determines normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

/// Side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl AccountType {
    pub const ALL: [AccountType; 5] = [
        AccountType::Asset,
        AccountType::Liability,
        AccountType::Equity,
        AccountType::Revenue,
        AccountType::Expense,
    ];

    /// Side on which the balance increases.
    pub fn normal_side(self) -> Side {
        match self {
            AccountType::Asset | AccountType::Expense => Side::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => Side::Credit,
        }
    }

    /// Signed change to a running balance caused by one journal line.
    pub fn balance_effect(self, debit: Money, credit: Money) -> Money {
        match self.normal_side() {
            Side::Debit => debit - credit,
            Side::Credit => credit - debit,
        }
    }
}

/// Reporting category within an account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    CurrentAssets,
    FixedAssets,
    IntangibleAssets,
    CurrentLiabilities,
    LongTermLiabilities,
    ShareCapital,
    RetainedEarnings,
    OtherEquity,
    OperatingRevenue,
    NonOperatingRevenue,
    OperatingExpenses,
    FinancingExpenses,
    NonOperatingExpenses,
}

impl AccountCategory {
    pub fn account_type(self) -> AccountType {
        use AccountCategory::*;
        match self {
            CurrentAssets | FixedAssets | IntangibleAssets => AccountType::Asset,
            CurrentLiabilities | LongTermLiabilities => AccountType::Liability,
            ShareCapital | RetainedEarnings | OtherEquity => AccountType::Equity,
            OperatingRevenue | NonOperatingRevenue => AccountType::Revenue,
            OperatingExpenses | FinancingExpenses | NonOperatingExpenses => AccountType::Expense,
        }
    }
}

/// Chart-of-accounts entry.
///
/// `balance` is only ever changed by posting journal lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub category: AccountCategory,
    balance: Money,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// New active account with a zero balance; the type follows the category.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category: AccountCategory,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            account_type: category.account_type(),
            category,
            balance: Decimal::ZERO,
            is_active: true,
            created_at,
        }
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub(crate) fn apply_line(&mut self, debit: Money, credit: Money) {
        self.balance += self.account_type.balance_effect(debit, credit);
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}

/// Per-type balance totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub assets: Money,
    pub liabilities: Money,
    pub equity: Money,
    pub revenue: Money,
    pub expenses: Money,
}

impl BalanceSummary {
    /// Zero whenever income has been closed into equity; otherwise equals net income.
    pub fn assets_less_liabilities_and_equity(&self) -> Money {
        self.assets - self.liabilities - self.equity
    }

    pub fn net_income(&self) -> Money {
        self.revenue - self.expenses
    }

    fn add(&mut self, account_type: AccountType, amount: Money) {
        match account_type {
            AccountType::Asset => self.assets += amount,
            AccountType::Liability => self.liabilities += amount,
            AccountType::Equity => self.equity += amount,
            AccountType::Revenue => self.revenue += amount,
            AccountType::Expense => self.expenses += amount,
        }
    }
}

/// Account registry keyed by id with a unique, sorted code index.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: HashMap<AccountId, Account>,
    by_code: BTreeMap<String, AccountId>,
}

impl ChartOfAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Register an account; codes are unique.
    pub fn insert(&mut self, account: Account) -> DomainResult<AccountId> {
        if self.by_code.contains_key(&account.code) {
            return Err(DomainError::conflict(format!(
                "account code {} already exists",
                account.code
            )));
        }
        let id = account.id;
        self.by_code.insert(account.code.clone(), id);
        self.accounts.insert(id, account);
        Ok(id)
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn by_code(&self, code: &str) -> Option<&Account> {
        self.by_code.get(code).and_then(|id| self.accounts.get(id))
    }

    pub fn require(&self, id: AccountId) -> DomainResult<&Account> {
        self.get(id)
            .ok_or_else(|| DomainError::not_found(format!("account {id}")))
    }

    pub fn require_code(&self, code: &str) -> DomainResult<&Account> {
        self.by_code(code)
            .ok_or_else(|| DomainError::not_found(format!("account code {code}")))
    }

    /// Accounts ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = &Account> + '_ {
        self.by_code.values().filter_map(|id| self.accounts.get(id))
    }

    pub fn set_active(&mut self, id: AccountId, active: bool) -> DomainResult<()> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("account {id}")))?;
        account.is_active = active;
        Ok(())
    }

    pub(crate) fn apply_line(&mut self, id: AccountId, debit: Money, credit: Money) -> DomainResult<()> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(format!("account {id}")))?;
        account.apply_line(debit, credit);
        Ok(())
    }

    pub fn summary(&self) -> BalanceSummary {
        let mut summary = BalanceSummary::default();
        for account in self.accounts.values() {
            summary.add(account.account_type, account.balance);
        }
        summary
    }
}
