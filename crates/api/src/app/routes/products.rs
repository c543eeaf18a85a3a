use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use stockledger_core::ProductId;
use stockledger_infra::ServiceError;

use crate::app::{AppServices, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list).post(register))
        .route("/products/:id", get(fetch).delete(remove))
        .route("/products/:id/movements", get(movements))
        .route("/products/:id/balance", get(balance))
        .route("/products/:id/trend", get(trend))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::rejection_to_response(rejection),
    };

    let cmd = body.into_command(Utc::now().date_naive());
    match services.inventory.register_product(cmd).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let response = match services.inventory.list_products().await {
        Ok(products) if products.is_empty() => dto::ProductList {
            products,
            notice: Some("No products registered yet.".to_string()),
        },
        Ok(products) => dto::ProductList {
            products,
            notice: None,
        },
        Err(e) => {
            tracing::warn!("failed to read product registry: {e}");
            dto::ProductList {
                products: vec![],
                notice: Some(format!("Product registry could not be read: {e}")),
            }
        }
    };

    Json(response).into_response()
}

pub async fn fetch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.inventory.get_product(&id).await {
        Ok(product) => Json(product).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.inventory.delete_product(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn movements(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let movements = match services.inventory.product_movements(&id).await {
        Ok(m) => m,
        Err(e) => return errors::service_error_to_response(e),
    };
    if movements.is_empty() {
        if let Err(e) = services.inventory.get_product(&id).await {
            return errors::service_error_to_response(e);
        }
    }

    Json(dto::MovementList {
        movements,
        notice: None,
    })
    .into_response()
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let name = match product_name(&services, &id).await {
        Ok(name) => name,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services.inventory.product_balance(&id).await {
        Ok(totals) => {
            let low_stock = services.inventory.policy().evaluate(&id, &name, totals);
            Json(dto::BalanceResponse::new(id, totals, low_stock)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn trend(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_product_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    if let Err(e) = product_name(&services, &id).await {
        return errors::service_error_to_response(e);
    }

    match services.inventory.product_trend(&id).await {
        Ok(trend) => Json(trend).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Name from the registry, or from the ledger for a product that was deleted
/// after recording movements. Unknown to both is `NotFound`.
async fn product_name(services: &AppServices, id: &ProductId) -> Result<String, ServiceError> {
    match services.inventory.get_product(id).await {
        Ok(product) => Ok(product.name),
        Err(ServiceError::NotFound(what)) => {
            let movements = services.inventory.product_movements(id).await?;
            movements
                .last()
                .map(|m| m.product_name.clone())
                .ok_or(ServiceError::NotFound(what))
        }
        Err(e) => Err(e),
    }
}
