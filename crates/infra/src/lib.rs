//! Infrastructure layer: store, services, configuration.

pub mod config;
pub mod engine;
pub mod error;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ServiceError, ServiceResult, StoreError};
pub use store::{InMemoryLedgerStore, LedgerState, LedgerStore};
