use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch, post},
};

use scf_core::AccountId;

use crate::app::{AppEngine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/initialize", post(initialize_chart))
        .route("/accounts/:id", get(get_account))
        .route("/accounts/:id/activity", patch(set_account_activity))
}

pub async fn initialize_chart(Extension(engine): Extension<AppEngine>) -> axum::response::Response {
    let result = engine
        .journal
        .initialize_chart_of_accounts()
        .map(|created| serde_json::json!({ "created": created }));
    errors::json_result(StatusCode::OK, result)
}

pub async fn list_accounts(Extension(engine): Extension<AppEngine>) -> axum::response::Response {
    let result = engine
        .journal
        .accounts()
        .map(|items| serde_json::json!({ "items": items }));
    errors::json_result(StatusCode::OK, result)
}

pub async fn get_account(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(StatusCode::OK, engine.journal.account(AccountId::from_uuid(id)))
}

pub async fn create_account(
    Extension(engine): Extension<AppEngine>,
    Json(body): Json<dto::CreateAccountRequest>,
) -> axum::response::Response {
    let result = engine
        .journal
        .create_account(body.code, body.name, body.category);
    errors::json_result(StatusCode::CREATED, result)
}

pub async fn set_account_activity(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<dto::AccountActivityRequest>,
) -> axum::response::Response {
    let result = engine
        .journal
        .set_account_active(AccountId::from_uuid(id), body.is_active);
    errors::json_result(StatusCode::OK, result)
}
