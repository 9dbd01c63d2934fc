use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use scf_core::JournalEntryId;

use crate::app::{AppEngine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/journal", get(list_entries).post(create_entry))
        .route("/journal/:id", get(get_entry))
        .route("/journal/:id/post", post(post_entry))
        .route("/journal/:id/cancel", post(cancel_entry))
        .route("/journal/:id/reverse", post(reverse_entry))
}

pub async fn create_entry(
    Extension(engine): Extension<AppEngine>,
    Json(body): Json<dto::CreateJournalEntryRequest>,
) -> axum::response::Response {
    let (header, lines) = body.into_parts(Utc::now());
    errors::json_result(
        StatusCode::CREATED,
        engine.journal.create_journal_entry(header, lines),
    )
}

pub async fn list_entries(
    Extension(engine): Extension<AppEngine>,
    Query(query): Query<dto::JournalQuery>,
) -> axum::response::Response {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let result = engine
        .journal
        .list_journal_entries(filter, query.limit)
        .map(|items| serde_json::json!({ "items": items }));
    errors::json_result(StatusCode::OK, result)
}

pub async fn get_entry(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(
        StatusCode::OK,
        engine.journal.journal_entry(JournalEntryId::from_uuid(id)),
    )
}

pub async fn post_entry(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    body: Option<Json<dto::ActingUserRequest>>,
) -> axum::response::Response {
    let user = acting_user(&engine, body);
    errors::json_result(
        StatusCode::OK,
        engine.journal.post_journal_entry(JournalEntryId::from_uuid(id), user),
    )
}

pub async fn cancel_entry(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(
        StatusCode::OK,
        engine.journal.cancel_journal_entry(JournalEntryId::from_uuid(id)),
    )
}

pub async fn reverse_entry(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    body: Option<Json<dto::ActingUserRequest>>,
) -> axum::response::Response {
    let user = acting_user(&engine, body);
    errors::json_result(
        StatusCode::CREATED,
        engine.journal.reverse_journal_entry(JournalEntryId::from_uuid(id), user),
    )
}

fn acting_user(
    engine: &AppEngine,
    body: Option<Json<dto::ActingUserRequest>>,
) -> scf_core::UserId {
    body.and_then(|Json(b)| b.user_id)
        .unwrap_or(engine.config.system_user)
}
