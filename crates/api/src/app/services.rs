use std::sync::Arc;

use anyhow::Context;

use stockledger_infra::{AppConfig, InventoryService, QueryConsole, SqliteRepository};

/// State shared by every handler.
#[derive(Debug)]
pub struct AppServices {
    pub store: Arc<SqliteRepository>,
    pub inventory: InventoryService<Arc<SqliteRepository>>,
    pub console: QueryConsole,
}

impl AppServices {
    pub fn new(store: SqliteRepository, config: &AppConfig) -> anyhow::Result<Self> {
        let policy = config.low_stock_policy()?;
        let console = QueryConsole::new(store.pool().clone(), config.query_history_limit);
        let store = Arc::new(store);

        Ok(Self {
            inventory: InventoryService::new(store.clone(), policy),
            console,
            store,
        })
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = SqliteRepository::connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    AppServices::new(store, config)
}
