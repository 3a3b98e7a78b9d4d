//! Prometheus /metrics + health check HTTP endpoints
//!
//! Endpoints:
//!   GET /metrics  Prometheus text format
//!   GET /healthz  Liveness probe (always 200 if process is running)
//!   GET /readyz   Readiness probe (200 if the document store is reachable)

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus_client::{encoding::text::encode, metrics::counter::Counter, registry::Registry};
use zbin_store::PurgeReport;

use crate::http::AppState;

/// Note service counters. Clones share the underlying atomics.
#[derive(Clone, Default)]
pub struct NoteMetrics {
    pub stored: Counter,
    pub retrieved: Counter,
    pub deleted: Counter,
    pub rejected: Counter,
    pub purge_rounds: Counter,
    pub purged: Counter,
}

impl NoteMetrics {
    pub fn register(registry: &mut Registry) -> Self {
        let metrics = Self::default();
        registry.register(
            "zbin_notes_stored",
            "Notes accepted and persisted",
            metrics.stored.clone(),
        );
        registry.register(
            "zbin_notes_retrieved",
            "Notes served to readers",
            metrics.retrieved.clone(),
        );
        registry.register(
            "zbin_notes_deleted",
            "Notes deleted by id",
            metrics.deleted.clone(),
        );
        registry.register(
            "zbin_notes_rejected",
            "Records refused by the schema gate",
            metrics.rejected.clone(),
        );
        registry.register(
            "zbin_purge_rounds",
            "Delete batches committed by the expiration purger",
            metrics.purge_rounds.clone(),
        );
        registry.register(
            "zbin_purged_notes",
            "Expired notes removed by the purger",
            metrics.purged.clone(),
        );
        metrics
    }

    pub fn record_purge(&self, report: &PurgeReport) {
        self.purge_rounds.inc_by(report.rounds as u64);
        self.purged.inc_by(report.deleted as u64);
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut body = String::new();
    match encode(&mut body, &state.registry) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!("metrics encode failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                e.to_string(),
            )
        }
    }
}

async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.healthcheck().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage unreachable"),
    }
}
