use tokio::signal;

/// Resolves on Ctrl+C so axum can drain in-flight requests.
pub async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }

    #[cfg(not(windows))]
    println!();
    tracing::info!("Ctrl+C received. Finishing in-flight requests.");
}
