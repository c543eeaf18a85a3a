use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::{AppServices, dto, errors};

pub async fn record(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RecordMovementRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    let recorded = match services.inventory.record_movement(body.into_command(Utc::now())).await {
        Ok(r) => r,
        Err(e) => return errors::service_error_to_response(e),
    };

    let low_stock = services.inventory.policy().evaluate(
        &recorded.movement.product_id,
        &recorded.movement.product_name,
        recorded.totals,
    );
    if let Some(warning) = &low_stock {
        tracing::warn!(
            product_id = %warning.product_id,
            balance = warning.balance,
            "{}",
            warning.message()
        );
    }

    (
        StatusCode::CREATED,
        Json(dto::RecordedMovementResponse {
            total_in: recorded.totals.total_in,
            total_out: recorded.totals.total_out,
            balance: recorded.balance,
            movement: recorded.movement,
            low_stock,
        }),
    )
        .into_response()
}

pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let response = match services.inventory.list_movements().await {
        Ok(movements) if movements.is_empty() => dto::MovementList {
            movements,
            notice: Some("No stock movements recorded yet.".to_string()),
        },
        Ok(movements) => dto::MovementList {
            movements,
            notice: None,
        },
        Err(e) => {
            tracing::warn!("failed to read inventory log: {e}");
            dto::MovementList {
                movements: vec![],
                notice: Some(format!("Inventory log could not be read: {e}")),
            }
        }
    };

    Json(response).into_response()
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_movement_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.inventory.delete_movement(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
