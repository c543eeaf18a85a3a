use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockledger_core::{MovementId, ProductId};
use stockledger_infra::{ExportError, QueryError, ServiceError, StoreError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ref rejected @ ServiceError::InsufficientStock {
            attempted,
            available,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": rejected.to_string(),
                "attempted": attempted,
                "available": available,
            })),
        )
            .into_response(),
        ServiceError::Duplicate(key) => json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("product id {key} is already registered"),
        ),
        ServiceError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        ServiceError::Store(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!("store error: {err}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn query_error_to_response(err: QueryError) -> axum::response::Response {
    match err {
        QueryError::NotReadOnly | QueryError::MultipleStatements => {
            json_error(StatusCode::FORBIDDEN, "query_refused", err.to_string())
        }
        QueryError::Execution(msg) => json_error(StatusCode::BAD_REQUEST, "query_failed", msg),
    }
}

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    tracing::error!("export failed: {err}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_error", err.to_string())
}

/// Malformed, missing or mistyped request body fields.
pub fn rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_product_id(s: &str) -> Result<ProductId, axum::response::Response> {
    ProductId::new(s).map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

pub fn parse_movement_id(s: &str) -> Result<MovementId, axum::response::Response> {
    s.parse().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            "movement id must be an integer",
        )
    })
}
