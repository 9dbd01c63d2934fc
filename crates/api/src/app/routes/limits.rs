use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch, post},
};

use scf_core::{FacilityId, OrganizationId};
use scf_facilities::FacilityUpdate;

use crate::app::{AppEngine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/organizations/:id/credit-limit",
            get(get_credit_limit).post(create_credit_limit),
        )
        .route("/organizations/:id/facilities", post(add_facility))
        .route("/organizations/:id/buyer-allocations", post(allocate_buyer_limit))
        .route("/organizations/:id/limit-tree", get(limit_tree))
        .route("/organizations/:id/limit-table", get(limit_table))
        .route("/facilities/:id", patch(modify_facility))
        .route("/facilities/:id/allocations", post(allocate_to_counterparty))
        .route("/facilities/:id/utilization", post(update_utilization))
}

pub async fn get_credit_limit(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(
        StatusCode::OK,
        engine.limits.credit_limit_info(OrganizationId::from_uuid(id)),
    )
}

pub async fn create_credit_limit(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<dto::CreateCreditLimitRequest>,
) -> axum::response::Response {
    let result = engine.limits.create_credit_limit_with_facilities(
        OrganizationId::from_uuid(id),
        body.master_limit,
        body.facilities,
        body.ceiling,
    );
    errors::json_result(StatusCode::CREATED, result)
}

pub async fn add_facility(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<dto::AddFacilityRequest>,
) -> axum::response::Response {
    let result = engine
        .limits
        .add_facility(
            OrganizationId::from_uuid(id),
            body.facility_type,
            body.total_limit,
            body.review_end_date,
            body.grace_period_days,
            body.master_limit,
        )
        .map(|facility_id| serde_json::json!({ "id": facility_id }));
    errors::json_result(StatusCode::CREATED, result)
}

pub async fn allocate_buyer_limit(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<dto::AllocateBuyerRequest>,
) -> axum::response::Response {
    let result = engine
        .limits
        .allocate_buyer_limit(
            OrganizationId::from_uuid(id),
            body.buyer_id,
            body.facility_type,
            body.amount,
        )
        .map(|facility_id| serde_json::json!({ "id": facility_id }));
    errors::json_result(StatusCode::CREATED, result)
}

pub async fn modify_facility(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<FacilityUpdate>,
) -> axum::response::Response {
    let result = engine
        .limits
        .modify_facility(FacilityId::from_uuid(id), body)
        .map(|()| serde_json::json!({ "id": id }));
    errors::json_result(StatusCode::OK, result)
}

pub async fn allocate_to_counterparty(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<dto::AllocateCounterpartyRequest>,
) -> axum::response::Response {
    let result = engine
        .limits
        .allocate_to_counterparty(FacilityId::from_uuid(id), body.party_id, body.amount)
        .map(|facility_id| serde_json::json!({ "id": facility_id }));
    errors::json_result(StatusCode::CREATED, result)
}

pub async fn update_utilization(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<dto::UtilizationRequest>,
) -> axum::response::Response {
    let result = engine
        .limits
        .update_utilization(FacilityId::from_uuid(id), body.delta)
        .map(|utilization| serde_json::json!({ "id": id, "current_utilization": utilization }));
    errors::json_result(StatusCode::OK, result)
}

pub async fn limit_tree(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    errors::json_result(
        StatusCode::OK,
        engine.limits.limit_tree(OrganizationId::from_uuid(id)),
    )
}

pub async fn limit_table(
    Extension(engine): Extension<AppEngine>,
    Path(id): Path<uuid::Uuid>,
) -> axum::response::Response {
    let result = engine
        .limits
        .limit_table(OrganizationId::from_uuid(id))
        .map(|rows| serde_json::json!({ "items": rows }));
    errors::json_result(StatusCode::OK, result)
}
