use axum::Router;

pub mod accounts;
pub mod journal;
pub mod limits;
pub mod registry;
pub mod reports;
pub mod system;
pub mod transactions;

/// Router for all engine endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(accounts::router())
        .merge(journal::router())
        .merge(reports::router())
        .merge(registry::router())
        .merge(limits::router())
        .merge(transactions::router())
}
