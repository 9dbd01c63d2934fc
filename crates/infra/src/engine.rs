use std::sync::Arc;

use scf_core::{Clock, SystemClock};

use crate::config::EngineConfig;
use crate::services::{JournalService, LimitService, Registry, TransactionRecorder};
use crate::store::{InMemoryLedgerStore, LedgerStore};

/// All engine services sharing one store, clock and configuration.
pub struct Engine<S> {
    pub registry: Registry<S>,
    pub journal: JournalService<S>,
    pub limits: LimitService<S>,
    pub recorder: TransactionRecorder<S>,
    pub config: Arc<EngineConfig>,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            journal: self.journal.clone(),
            limits: self.limits.clone(),
            recorder: self.recorder.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: LedgerStore> Engine<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        let config = Arc::new(config);
        Self {
            registry: Registry::new(Arc::clone(&store)),
            journal: JournalService::new(Arc::clone(&store), Arc::clone(&clock)),
            limits: LimitService::new(Arc::clone(&store), Arc::clone(&clock), Arc::clone(&config)),
            recorder: TransactionRecorder::new(store, clock, Arc::clone(&config)),
            config,
        }
    }
}

impl Engine<InMemoryLedgerStore> {
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(SystemClock),
            config,
        )
    }
}
