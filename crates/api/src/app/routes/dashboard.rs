use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::{AppServices, dto};

/// Per-product summaries and low-stock warnings, recomputed from full reads.
pub async fn overview(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let low_stock_threshold = services.inventory.policy().threshold();

    let response = match services.inventory.overview().await {
        Ok(overview) => {
            let notice = overview
                .is_empty()
                .then(|| "No inventory data yet. Register a product to get started.".to_string());
            dto::DashboardResponse {
                low_stock_threshold,
                summaries: overview.summaries,
                warnings: overview.warnings,
                notice,
            }
        }
        Err(e) => {
            tracing::warn!("failed to build dashboard: {e}");
            dto::DashboardResponse {
                low_stock_threshold,
                summaries: vec![],
                warnings: vec![],
                notice: Some(format!("Inventory data could not be read: {e}")),
            }
        }
    };

    Json(response).into_response()
}
