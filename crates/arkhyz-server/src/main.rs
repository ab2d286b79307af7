mod config;
mod keepalive;
mod site;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use arkhyz_api::{Dispatcher, build_router};
use arkhyz_db::{LeadStore, SqliteStore};

use crate::config::{Config, StorageConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "arkhyz=debug,arkhyz_api=debug,arkhyz_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;
    config.log_summary();
    site::check_layout(&config.static_dir, &config.admin_page, &config.admin)?;

    // A storage failure here aborts startup rather than serving half-initialized.
    let store = open_store(&config.storage)?;
    info!("Storage engine: {}", store.engine());

    let dispatcher = Dispatcher::new(store, config.dispatch.clone());

    if let Some(keepalive) = config.keepalive.clone() {
        tokio::spawn(keepalive::run_keepalive_loop(keepalive));
    }

    let app = build_router(dispatcher, &config.admin)
        .merge(site::static_site(&config.static_dir, &config.admin_page, &config.admin))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Arkhyz server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn open_store(storage: &StorageConfig) -> anyhow::Result<Arc<dyn LeadStore>> {
    match storage {
        StorageConfig::Sqlite(path) => Ok(Arc::new(SqliteStore::open(path)?)),
        #[cfg(feature = "postgres")]
        StorageConfig::Postgres(url) => Ok(Arc::new(arkhyz_db::PgStore::connect(url)?)),
        #[cfg(not(feature = "postgres"))]
        StorageConfig::Postgres(_) => {
            anyhow::bail!("PostgreSQL storage requested but this build lacks the `postgres` feature")
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
