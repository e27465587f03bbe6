//! Claude Code usage exporter.
//!
//! - Polls the usage report API every `POLL_INTERVAL_SEC` (today, else yesterday)
//! - Serves the latest values on `/metrics` for Prometheus
//! - SIGINT/SIGTERM: mark draining, stop the poller, finish in-flight scrapes

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use ccusage_core::error::{ExporterError, Result};
use ccusage_exporter::fetch::UsageApiClient;
use ccusage_exporter::obs::MetricsRegistry;
use ccusage_exporter::poller::Poller;
use ccusage_exporter::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load_from_env().inspect_err(|e| {
        tracing::error!(error = %e, kind = e.kind().as_str(), "config load failed");
    })?;
    tracing::debug!(?cfg, "config loaded");

    let metrics = Arc::new(MetricsRegistry::new());
    let shutdown = CancellationToken::new();

    let source = Arc::new(UsageApiClient::new(&cfg, Arc::clone(&metrics))?);
    let poller = Poller::new(source, Arc::clone(&metrics), cfg.poll_interval, shutdown.clone());
    let poll_task = tokio::spawn(poller.run());

    let state = app_state::AppState::new(Arc::clone(&metrics));
    let app = router::build_router(state);

    tracing::info!(listen = %cfg.listen, "ccusage-exporter starting");
    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .map_err(|e| ExporterError::Internal(format!("failed to bind {}: {e}", cfg.listen)))?;
    tracing::info!("metrics available at http://{}/metrics", cfg.listen);

    let drain_metrics = Arc::clone(&metrics);
    let drain_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            drain_metrics.set_draining();
            drain_token.cancel();
        })
        .await
        .map_err(|e| ExporterError::Internal(format!("server failed: {e}")))?;

    shutdown.cancel();
    if let Err(e) = poll_task.await {
        tracing::error!(error = %e, "poll task ended abnormally");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
