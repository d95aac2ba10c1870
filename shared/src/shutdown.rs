use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Spawn a task that cancels the returned token on SIGTERM or Ctrl-C.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.cancel();
    });

    token
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, initiating graceful shutdown...");
                    }
                    _ = ctrl_c() => {
                        info!("SIGINT received, initiating graceful shutdown...");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler, listening for Ctrl-C only");
                ctrl_c().await;
                info!("SIGINT received, initiating graceful shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
        info!("Ctrl-C received, initiating graceful shutdown...");
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a working handler the process only stops on SIGTERM
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
