use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use scf_core::{OrganizationId, TransactionId};

use crate::app::{AppEngine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/transactions", post(record_transaction))
        .route("/transactions/:id", get(get_transaction))
        .route("/organizations/:id/transactions", get(transaction_history))
}

pub async fn record_transaction(
    Extension(engine): Extension<AppEngine>,
    Json(body): Json<dto::RecordTransactionRequest>,
) -> axum::response::Response {
    let (tx, user) = body.into_transaction(Utc::now());
    errors::json_result(StatusCode::CREATED, engine.recorder.record_transaction(tx, user))
}

pub async fn get_transaction(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(
        StatusCode::OK,
        engine.recorder.transaction(TransactionId::from_uuid(id)),
    )
}

pub async fn transaction_history(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<dto::LimitQuery>,
) -> axum::response::Response {
    let result = engine
        .recorder
        .transaction_history(OrganizationId::from_uuid(id), query.limit)
        .map(|items| serde_json::json!({ "items": items }));
    errors::json_result(StatusCode::OK, result)
}
