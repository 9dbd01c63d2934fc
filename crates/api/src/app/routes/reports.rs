use axum::{
    Router,
    extract::{Extension, Query},
    http::StatusCode,
    routing::get,
};

use scf_core::UserId;

use crate::app::{AppEngine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/reports/trial-balance", get(trial_balance))
        .route("/reports/balance-summary", get(balance_summary))
        .route("/reports/verify-balances", get(verify_balances))
}

pub async fn trial_balance(
    Extension(engine): Extension<AppEngine>,
    Query(query): Query<dto::TrialBalanceQuery>,
) -> axum::response::Response {
    let user = query
        .user_id
        .map(UserId::from_uuid)
        .unwrap_or(engine.config.system_user);
    let result = engine
        .journal
        .generate_trial_balance(query.as_of, user)
        .map(|tb| {
            serde_json::json!({
                "as_of": tb.as_of,
                "generated_at": tb.generated_at,
                "generated_by": tb.generated_by,
                "replayed": tb.replayed,
                "total_debits": tb.total_debits(),
                "total_credits": tb.total_credits(),
                "is_balanced": tb.is_balanced(),
                "lines": tb.lines,
            })
        });
    errors::json_result(StatusCode::OK, result)
}

pub async fn balance_summary(Extension(engine): Extension<AppEngine>) -> axum::response::Response {
    let result = engine.journal.balance_summary().map(|s| {
        serde_json::json!({
            "assets": s.assets,
            "liabilities": s.liabilities,
            "equity": s.equity,
            "revenue": s.revenue,
            "expenses": s.expenses,
            "net_income": s.net_income(),
            "assets_less_liabilities_and_equity": s.assets_less_liabilities_and_equity(),
        })
    });
    errors::json_result(StatusCode::OK, result)
}

pub async fn verify_balances(Extension(engine): Extension<AppEngine>) -> axum::response::Response {
    let result = engine.journal.verify_balances().map(|drift| {
        serde_json::json!({
            "consistent": drift.is_empty(),
            "discrepancies": drift,
        })
    });
    errors::json_result(StatusCode::OK, result)
}
