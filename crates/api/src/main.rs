use anyhow::Context;

use stockledger_infra::{AppConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let config = AppConfig::load().context("failed to load configuration")?;
    stockledger_observability::init(config.log_format == LogFormat::Json);

    let addr = config.socket_addr()?;
    let app = stockledger_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        database = %config.database_url,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
