use crate::handlers;
use axum::Router;
use axum::routing::get;
use paylog_core::{CaptureStore, RecorderConfig, RecorderError};
use std::net::SocketAddr;
use tracing::info;

/// Build the front-door router around a capture store.
///
/// `GET /_logs` reads the buffer; everything else — other paths with
/// any method, and non-GET methods on `/_logs` itself — is routed to
/// the capture handler.
pub fn build_router(store: CaptureStore) -> Router {
    Router::new()
        .route("/_logs", get(handlers::get_logs).fallback(handlers::capture))
        .fallback(handlers::capture)
        .with_state(store)
}

/// Run the capture listener on `127.0.0.1:<port>` until SIGINT/SIGTERM.
///
/// The store lives for the lifetime of this call; nothing is persisted
/// across restarts.
pub async fn serve(config: RecorderConfig) -> Result<(), RecorderError> {
    let store = CaptureStore::new(config.window);
    let app = build_router(store);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(port = config.port, window = config.window, "Payload log service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Payload log service stopped");
    Ok(())
}

/// SIGTERM (supervisor stop) + SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
