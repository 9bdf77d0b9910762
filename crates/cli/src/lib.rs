//! Shared start-up code for the `diagram-engine` and `diagram-bot` binaries.
//!
//! Responsibilities:
//!
//! 1. **Wire observability**: configure `tracing-subscriber` with an env
//!    filter and a plain or JSON formatter, plus an OpenTelemetry OTLP exporter
//!    when `OTEL_EXPORTER_OTLP_ENDPOINT` is set. All `tracing` spans and
//!    structured events emitted by every crate in the workspace flow through
//!    this layer.
//! 2. **Read the environment**: [`env_var`] is the lookup passed to every
//!    `from_lookup` configuration constructor.
//! 3. **Stop cleanly**: [`shutdown_signal`] resolves on Ctrl-C / SIGTERM.

pub mod telemetry;

/// Environment lookup used by the configuration loaders.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolves when the process receives Ctrl-C or (on Unix) SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
