mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use parkwatch_feed::{FavoriteStore, FileStore, Pipeline};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(parkwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let sources = match &config.sources_path {
        Some(path) => parkwatch_core::load_sources(path)?,
        None => parkwatch_core::default_sources(),
    };
    tracing::info!(
        env = %config.env,
        sources = sources.len(),
        data_dir = %config.data_dir.display(),
        "starting parkwatch server"
    );

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let favorites = FavoriteStore::new(Arc::clone(&store));
    favorites.ensure_initialized()?;

    let pipeline = Arc::new(Mutex::new(Pipeline::from_config(&config, &sources, store)?));
    let _scheduler = scheduler::build_scheduler(Arc::clone(&pipeline), Arc::clone(&config)).await?;

    let app = build_app(AppState {
        pipeline,
        favorites,
        config: Arc::clone(&config),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
