use axum::{
    Router,
    routing::{delete, get, post},
};

pub mod dashboard;
pub mod export;
pub mod movements;
pub mod products;
pub mod query;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .merge(products::router())
        .route("/movements", get(movements::list).post(movements::record))
        .route("/movements/:id", delete(movements::remove))
        .route("/dashboard", get(dashboard::overview))
        .route("/query", post(query::run))
        .route("/query/history", get(query::history))
        .route("/query/csv", post(query::run_csv))
        .merge(export::router())
}
