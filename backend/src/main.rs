use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use expense_tracker_backend::config::AppConfig;
use expense_tracker_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    let bind_address = config.server.bind_address.clone();

    let state = initialize_backend(config)?;
    let app = create_router(state)?;

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Expense tracker listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
