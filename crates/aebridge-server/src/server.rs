//! Listener setup and the serve loop.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::evaluator::Evaluator;
use crate::router::build_router;
use crate::state::AppState;

/// Binds the configured address and serves until Ctrl-C.
///
/// A bind failure (for example, the port is taken) is returned as
/// [`BridgeError::BindFailure`].
pub async fn serve(config: &BridgeConfig, evaluator: Arc<dyn Evaluator>) -> Result<(), BridgeError> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| BridgeError::BindFailure { addr, source })?;

    tracing::info!("Server running at http://{}", addr);
    serve_with_listener(listener, AppState::new(config, evaluator), shutdown_signal()).await
}

/// Serves the bridge on an already bound listener until `shutdown` resolves.
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), BridgeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed, never resolves.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!("failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
