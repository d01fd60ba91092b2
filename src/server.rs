//! Server Module
//!
//! Wires the user database, store worker and router together and runs the
//! HTTP listener until the store shuts down or the process is signalled.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::store::ShutdownListener;
use crate::users::UserStorage;

/// Runs the key-value server with the given configuration.
///
/// # Startup Sequence
/// 1. Load the user database from `users_path`
/// 2. Spawn the store worker and register the shutdown listener
/// 3. Bind the HTTP listener on `0.0.0.0:server_port`
/// 4. Serve until the store reports shutdown, or Ctrl+C / SIGTERM
pub async fn listen(config: Config) -> anyhow::Result<()> {
    let users = Arc::new(UserStorage::load(&config.users_path));
    info!(
        "Loaded {} user(s) from {}",
        users.len(),
        config.users_path.display()
    );

    let state = AppState::from_config(&config, users);
    let store_stopped = state
        .store
        .register_shutdown_listener()
        .await
        .context("store worker stopped before the server started")?;
    info!(
        "Store initialized: depth={}, grace={}ms",
        config.lru_depth, config.shutdown_grace_ms
    );

    let http_tracer = state.tracer.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(store_stopped))
        .await
        .context("server error")?;

    http_tracer.close();
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves when the store has shut down, or on Ctrl+C or SIGTERM.
async fn shutdown_signal(store_stopped: ShutdownListener) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        stopped = store_stopped.wait() => {
            if stopped {
                info!("Store shut down, closing server...");
            } else {
                warn!("Store worker ended without notifying, closing server...");
            }
        }
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
