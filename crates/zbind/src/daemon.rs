//! Daemon lifecycle: store setup, health check, scheduled purge, HTTP server

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use zbin_core::config::ZbinConfig;
use zbin_store::{NoteService, PurgeOptions};

use crate::http::{self, AppState};

pub async fn run(config: ZbinConfig) -> Result<()> {
    info!("daemon starting");

    let store = zbin_store::open_store(&config.storage).context("opening document store")?;
    match store.check_health().await {
        Ok(()) => info!(backend = ?config.storage.backend, "storage: connected"),
        // keep going; /readyz reports the outage until the backend returns
        Err(e) => warn!(backend = ?config.storage.backend, "storage: {e}"),
    }

    let service = Arc::new(NoteService::new(store, PurgeOptions::from(&config.purge)));
    let state = AppState::new(service);

    if config.purge.interval_secs > 0 {
        let every = Duration::from_secs(config.purge.interval_secs);
        tokio::spawn(purge_schedule(state.clone(), every));
        info!(interval_secs = config.purge.interval_secs, "purge: scheduled");
    } else {
        info!("purge: schedule disabled (POST /purge still available)");
    }

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .with_context(|| format!("binding {}", config.server.listen))?;
    info!(addr = %config.server.listen, "http: listening");

    notify_ready();

    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    info!("daemon stopped");
    Ok(())
}

async fn purge_schedule(state: AppState, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match http::run_purge(&state).await {
            Ok(report) if report.deleted > 0 => {
                info!(rounds = report.rounds, deleted = report.deleted, "scheduled purge")
            }
            Ok(_) => {}
            Err(e) => error!("scheduled purge failed: {e}"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("ctrl-c handler unavailable: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

fn notify_ready() {
    // sd_notify(READY=1) via $NOTIFY_SOCKET; no-op outside systemd
    #[cfg(unix)]
    if let Ok(socket) = std::env::var("NOTIFY_SOCKET") {
        use std::os::unix::net::UnixDatagram;
        if let Ok(sock) = UnixDatagram::unbound() {
            let _ = sock.send_to(b"READY=1\n", &socket);
            tracing::debug!(notify_socket = %socket, "sent systemd READY=1");
        }
    }
}
