use std::net::SocketAddr;

use listkeeper::application::sessions::SessionRegistry;
use listkeeper::domain::store::Store;
use listkeeper::http::{routing, AppState};
use listkeeper::infrastructure::sqlite_store::SqliteStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://listkeeper.db".to_string());
    let store = SqliteStore::connect(&database_url).await?;
    store.init().await?;

    // Sessions live in memory only; a restart logs everyone out.
    let sessions = SessionRegistry::new();
    let router = routing::app(AppState::new(store, sessions));

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
