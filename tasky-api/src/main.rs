//! # Tasky API Server
//!
//! Serves the login and todo pages, the signup/login endpoints and the
//! per-user todo JSON API.
//!
//! ## Usage
//!
//! ```bash
//! SESSION_SECRET=$(openssl rand -hex 32) STORAGE_BACKEND=memory cargo run -p tasky-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use tasky_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
    telemetry::Telemetry,
};
use tasky_shared::store::{MemoryStore, PgStore, TodoStore};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    let telemetry = Telemetry::init(&config.telemetry)?;

    info!("Tasky API Server v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config.env_file {
        info!(path = %path.display(), "Applied .env overrides");
    }

    let store: Arc<dyn TodoStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let store = PgStore::connect(config.storage.database_config())
                .await
                .context("failed to open PostgreSQL store")?;
            info!("Connected to PostgreSQL, migrations applied");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let address = config.bind_address();
    let state = AppState::new(store.clone(), config);
    let app = build_router(state, &telemetry);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Server listening on http://{}", address);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    info!("Storage closed");

    if let Err(e) = &served {
        error!(error = %e, "Server exited with error");
    }
    telemetry.shutdown();

    served.context("server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
