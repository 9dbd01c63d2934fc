//! Default chart of accounts.

use chrono::{DateTime, Utc};

use crate::account::{Account, AccountCategory, ChartOfAccounts};

/// Well-known account codes referenced by transaction journal patterns.
pub mod codes {
    pub const CASH: &str = "1000";
    pub const TREASURY_RESERVE: &str = "1010";
    pub const LENDING_BOOK_LIQUIDITY: &str = "1020";
    pub const LOANS_TO_CUSTOMERS: &str = "1100";
    pub const FEE_RECEIVABLE: &str = "1200";
    pub const EQUIPMENT: &str = "1500";
    pub const SOFTWARE: &str = "1600";
    pub const CUSTOMER_PAYABLES: &str = "2000";
    pub const DUE_TO_TREASURY: &str = "2100";
    pub const LONG_TERM_BORROWINGS: &str = "2500";
    pub const SHARE_CAPITAL: &str = "3000";
    pub const RETAINED_EARNINGS: &str = "3100";
    pub const INTEREST_INCOME: &str = "4000";
    pub const FEE_INCOME: &str = "4100";
    pub const OTHER_INCOME: &str = "4200";
    pub const INTEREST_EXPENSE: &str = "5000";
    pub const OPERATING_EXPENSES: &str = "5100";
    pub const CREDIT_LOSS_EXPENSE: &str = "5200";
}

const DEFAULT_CHART: &[(&str, &str, AccountCategory)] = &[
    (codes::CASH, "Cash", AccountCategory::CurrentAssets),
    (codes::TREASURY_RESERVE, "Treasury Reserve", AccountCategory::CurrentAssets),
    (codes::LENDING_BOOK_LIQUIDITY, "Lending Book Liquidity", AccountCategory::CurrentAssets),
    (codes::LOANS_TO_CUSTOMERS, "Loans to Customers", AccountCategory::CurrentAssets),
    (codes::FEE_RECEIVABLE, "Fee Receivable", AccountCategory::CurrentAssets),
    (codes::EQUIPMENT, "Equipment", AccountCategory::FixedAssets),
    (codes::SOFTWARE, "Software", AccountCategory::IntangibleAssets),
    (codes::CUSTOMER_PAYABLES, "Customer Payables", AccountCategory::CurrentLiabilities),
    (codes::DUE_TO_TREASURY, "Due to Treasury", AccountCategory::CurrentLiabilities),
    (codes::LONG_TERM_BORROWINGS, "Long-term Borrowings", AccountCategory::LongTermLiabilities),
    (codes::SHARE_CAPITAL, "Share Capital", AccountCategory::ShareCapital),
    (codes::RETAINED_EARNINGS, "Retained Earnings", AccountCategory::RetainedEarnings),
    (codes::INTEREST_INCOME, "Interest & Discount Income", AccountCategory::OperatingRevenue),
    (codes::FEE_INCOME, "Fee Income", AccountCategory::OperatingRevenue),
    (codes::OTHER_INCOME, "Other Income", AccountCategory::NonOperatingRevenue),
    (codes::INTEREST_EXPENSE, "Interest Expense", AccountCategory::FinancingExpenses),
    (codes::OPERATING_EXPENSES, "Operating Expenses", AccountCategory::OperatingExpenses),
    (codes::CREDIT_LOSS_EXPENSE, "Credit Loss Expense", AccountCategory::NonOperatingExpenses),
];

impl ChartOfAccounts {
    /// Seed the default chart. No-op when any account already exists; returns
    /// the number of accounts created.
    pub fn seed_defaults(&mut self, now: DateTime<Utc>) -> usize {
        if !self.is_empty() {
            return 0;
        }
        let mut created = 0;
        for (code, name, category) in DEFAULT_CHART {
            if self.insert(Account::new(*code, *name, *category, now)).is_ok() {
                created += 1;
            }
        }
        created
    }

    /// Chart populated with the default accounts.
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        let mut chart = Self::new();
        chart.seed_defaults(now);
        chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;

    #[test]
    fn seeding_is_idempotent() {
        let mut chart = ChartOfAccounts::new();
        assert_eq!(chart.seed_defaults(Utc::now()), DEFAULT_CHART.len());
        assert_eq!(chart.seed_defaults(Utc::now()), 0);
        assert_eq!(chart.len(), DEFAULT_CHART.len());
    }

    #[test]
    fn default_codes_have_expected_types() {
        let chart = ChartOfAccounts::with_defaults(Utc::now());
        let ty = |code| chart.by_code(code).map(|a| a.account_type);

        assert_eq!(ty(codes::CASH), Some(AccountType::Asset));
        assert_eq!(ty(codes::DUE_TO_TREASURY), Some(AccountType::Liability));
        assert_eq!(ty(codes::SHARE_CAPITAL), Some(AccountType::Equity));
        assert_eq!(ty(codes::FEE_INCOME), Some(AccountType::Revenue));
        assert_eq!(ty(codes::CREDIT_LOSS_EXPENSE), Some(AccountType::Expense));
    }
}
