use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use scf_core::DomainError;
use scf_infra::{ServiceError, ServiceResult, StoreError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let status = match &err {
        ServiceError::Domain(e) => match e {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unbalanced { .. }
            | DomainError::InvalidAmount(_)
            | DomainError::Validation(_)
            | DomainError::InvalidId(_) => StatusCode::BAD_REQUEST,
            DomainError::AlreadyPosted(_)
            | DomainError::InvalidState(_)
            | DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::LimitExceeded(_) | DomainError::Expired(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        },
        ServiceError::Store(StoreError::Poisoned) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, code = err.code(), "request failed");
    }
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Serialize `result` with `status` on success, or map the failure.
pub fn json_result<T: Serialize>(
    status: StatusCode,
    result: ServiceResult<T>,
) -> axum::response::Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(e) => service_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let cases = [
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::already_posted("x"), StatusCode::CONFLICT),
            (DomainError::limit_exceeded("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::expired("x"), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            let resp = service_error_to_response(err.into());
            assert_eq!(resp.status(), status);
        }
    }

    #[test]
    fn store_failures_are_server_errors() {
        let resp = service_error_to_response(StoreError::Poisoned.into());
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
