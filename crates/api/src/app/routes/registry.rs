use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};

use scf_core::{InvoiceId, OrganizationId};
use scf_invoicing::Invoice;
use scf_parties::Organization;

use crate::app::{AppEngine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/organizations", get(list_organizations).post(create_organization))
        .route("/organizations/:id", get(get_organization))
        .route("/organizations/:id/counterparties", get(list_counterparties))
        .route("/invoices", post(create_invoice))
        .route("/invoices/:id", get(get_invoice))
}

pub async fn create_organization(
    Extension(engine): Extension<AppEngine>,
    Json(body): Json<dto::CreateOrganizationRequest>,
) -> axum::response::Response {
    let result = engine
        .registry
        .upsert_organization(Organization::from(body))
        .map(|id| serde_json::json!({ "id": id }));
    errors::json_result(StatusCode::CREATED, result)
}

pub async fn list_organizations(Extension(engine): Extension<AppEngine>) -> axum::response::Response {
    let result = engine
        .registry
        .organizations()
        .map(|items| serde_json::json!({ "items": items }));
    errors::json_result(StatusCode::OK, result)
}

pub async fn get_organization(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(
        StatusCode::OK,
        engine.registry.organization(OrganizationId::from_uuid(id)),
    )
}

pub async fn list_counterparties(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    let result = engine
        .registry
        .counterparties(OrganizationId::from_uuid(id))
        .map(|items| serde_json::json!({ "items": items }));
    errors::json_result(StatusCode::OK, result)
}

pub async fn create_invoice(
    Extension(engine): Extension<AppEngine>,
    Json(body): Json<dto::CreateInvoiceRequest>,
) -> axum::response::Response {
    let result = engine
        .registry
        .upsert_invoice(Invoice::from(body))
        .map(|id| serde_json::json!({ "id": id }));
    errors::json_result(StatusCode::CREATED, result)
}

pub async fn get_invoice(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(StatusCode::OK, engine.registry.invoice(InvoiceId::from_uuid(id)))
}
