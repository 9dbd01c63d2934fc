use std::sync::RwLock;

use scf_core::DomainResult;

use super::{LedgerState, LedgerStore};
use crate::error::{ServiceResult, StoreError};

/// In-memory store.
///
/// Writers are serialized by a single lock and work on a copy of the state
/// that replaces the original only when the unit of work succeeds.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> ServiceResult<R> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&state))
    }

    fn transact<R>(&self, f: impl FnOnce(&mut LedgerState) -> DomainResult<R>) -> ServiceResult<R> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let mut draft = state.clone();
        let out = f(&mut draft)?;
        *state = draft;
        Ok(out)
    }
}
