//! Durable-store boundary.
//!
//! Every mutating engine operation runs as one unit of work through
//! [`LedgerStore::transact`]; readers go through [`LedgerStore::read`].

mod in_memory;
mod state;

pub use in_memory::InMemoryLedgerStore;
pub use state::LedgerState;

use scf_core::DomainResult;

use crate::error::ServiceResult;

/// Store supporting serializable multi-record units of work.
///
/// `transact` must either apply every change the closure made or none of
/// them: when the closure returns an error the stored state is untouched.
pub trait LedgerStore: Send + Sync {
    fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> ServiceResult<R>;

    fn transact<R>(&self, f: impl FnOnce(&mut LedgerState) -> DomainResult<R>) -> ServiceResult<R>;
}
