use tokio_util::sync::CancellationToken;

/// Cancel the returned token on the first SIGINT or SIGTERM.
///
/// The gRPC server stops accepting calls once the token fires and drains
/// the ones in flight.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Got signal, stopping gRPC server gracefully");
        trigger.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        name = ctrl_c() => name,
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for SIGINT");
        // Never resolve rather than shutting down spuriously.
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
