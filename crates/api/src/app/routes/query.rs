use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};

use stockledger_infra::export;

use crate::app::{AppServices, dto, errors};

pub async fn run(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::QueryRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    match services.console.run(&body.sql).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => errors::query_error_to_response(e),
    }
}

pub async fn run_csv(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::QueryRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    let result = match services.console.run(&body.sql).await {
        Ok(result) => result,
        Err(e) => return errors::query_error_to_response(e),
    };

    match export::query_result_csv(&result) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"query_result.csv\""),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => errors::export_error_to_response(e),
    }
}

pub async fn history(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    Json(dto::QueryHistoryResponse {
        history: services.console.history(),
    })
    .into_response()
}
