use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    http::header,
    response::IntoResponse,
    routing::get,
};

use stockledger_infra::export;

use crate::app::{AppServices, errors};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn router() -> Router {
    Router::new()
        .route("/export/ledger.csv", get(ledger_csv))
        .route("/export/inventory.xlsx", get(inventory_xlsx))
        .route("/export/database", get(database))
}

pub async fn ledger_csv(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let movements = match services.inventory.list_movements().await {
        Ok(m) => m,
        Err(e) => return errors::service_error_to_response(e),
    };

    match export::ledger_csv(&movements) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"inventory_log.csv\""),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => errors::export_error_to_response(e),
    }
}

pub async fn inventory_xlsx(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let products = match services.inventory.list_products().await {
        Ok(p) => p,
        Err(e) => return errors::service_error_to_response(e),
    };
    let movements = match services.inventory.list_movements().await {
        Ok(m) => m,
        Err(e) => return errors::service_error_to_response(e),
    };

    match export::inventory_workbook(&products, &movements) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"inventory.xlsx\""),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => errors::export_error_to_response(e),
    }
}

/// The whole SQLite database file.
pub async fn database(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.store.snapshot().await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/vnd.sqlite3"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"inventory.db\""),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
