//! `scf-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    AccountId, CreditLimitId, FacilityId, InvoiceId, JournalEntryId, OrganizationId,
    TransactionId, UserId,
};
pub use money::Money;
