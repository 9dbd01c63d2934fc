//! Invoice records as seen by the financing engine.
//!
//! The invoice lifecycle is owned externally; the engine reads amounts and
//! parties and writes back funding/payment fields when a transaction is
//! recorded.

pub mod invoice;

pub use invoice::{FundingTerms, Invoice, InvoiceStatus};
