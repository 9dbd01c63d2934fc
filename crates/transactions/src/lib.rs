//! Business transactions and the journal pattern each one produces.

pub mod pattern;
pub mod transaction;

pub use pattern::{JournalPattern, PatternLeg, UtilizationEffect, journal_pattern};
pub use transaction::{Transaction, TransactionType};
