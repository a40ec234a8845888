//! Shutdown signal handling

use std::future::Future;
use std::io;

use tracing::error;

/// Resolve on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<io::Result<()>>();

    first_signal(tokio::signal::ctrl_c(), terminate).await
}

/// Resolve when either signal fires
///
/// A source whose handler cannot be installed is logged and never resolves.
pub async fn first_signal<C, T>(ctrl_c: C, terminate: T)
where
    C: Future<Output = io::Result<()>>,
    T: Future<Output = io::Result<()>>,
{
    tokio::select! {
        _ = watch("Ctrl+C", ctrl_c) => {},
        _ = watch("SIGTERM", terminate) => {},
    }
}

async fn watch(name: &str, signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        error!("Failed to install {} handler: {}", name, e);
        std::future::pending::<()>().await;
    }
}
