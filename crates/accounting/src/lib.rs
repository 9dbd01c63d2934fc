//! Account registry, journal entries and trial balances.

pub mod account;
pub mod chart;
pub mod journal;
pub mod trial_balance;

pub use account::{Account, AccountCategory, AccountType, BalanceSummary, ChartOfAccounts, Side};
pub use chart::codes;
pub use journal::{
    JournalEntry, JournalEntryHeader, JournalEntryLine, JournalEntryStatus, JournalFilter,
    format_reference,
};
pub use trial_balance::{
    BalanceDiscrepancy, TrialBalance, TrialBalanceLine, replay_balances, verify_balances,
};
