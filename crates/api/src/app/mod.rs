//! HTTP API application wiring (Axum router + engine wiring).
//!
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and their mapping onto domain types
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use scf_infra::{Engine, InMemoryLedgerStore};

pub mod dto;
pub mod errors;
pub mod routes;

/// Engine type served over HTTP.
pub type AppEngine = Engine<InMemoryLedgerStore>;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(engine: AppEngine) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(engine)))
}
