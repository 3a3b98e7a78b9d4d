//! HTTP surface for the note service.
//!
//! ```text
//! GET    /?id=<id>  | /notes/{id}   200 document | 404 {"error"}
//! POST   /          | /notes        200 {"id"}   | 422 {"error": gate message}
//! DELETE /?id=<id>  | /notes/{id}   200 {"id"}   | 404 {"error"}
//! POST   /purge                     200 {"rounds", "deleted"}
//! ```
//!
//! Store failures are 500. A purge that overruns its budget is 503. Bodies
//! that are not JSON keep axum's status (400/415) but use the same
//! `{"error"}` shape.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus_client::registry::Registry;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;
use zbin_core::StoredDocument;
use zbin_store::{NoteService, PurgeError, PurgeReport, ServiceError};

use crate::metrics::{self, NoteMetrics};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NoteService>,
    pub metrics: NoteMetrics,
    pub registry: Arc<Registry>,
}

impl AppState {
    pub fn new(service: Arc<NoteService>) -> Self {
        let mut registry = Registry::default();
        let metrics = NoteMetrics::register(&mut registry);
        Self {
            service,
            metrics,
            registry: Arc::new(registry),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_by_query).post(create).delete(delete_by_query))
        .route("/notes", post(create))
        .route("/notes/{id}", get(get_by_path).delete(delete_by_path))
        .route("/purge", post(purge))
        .merge(metrics::routes())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct IdQuery {
    #[serde(default)]
    id: String,
}

/// A service failure rendered as `{"error": message}`.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    NotAnObject,
    Body(JsonRejection),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotAnObject => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "record must be a JSON object".to_string(),
            ),
            Self::Body(rejection) => (rejection.status(), rejection.body_text()),
            Self::Service(e) => {
                let status = match &e {
                    ServiceError::NoId | ServiceError::NotFound => StatusCode::NOT_FOUND,
                    ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    ServiceError::Purge(PurgeError::TimedOut(_)) => StatusCode::SERVICE_UNAVAILABLE,
                    ServiceError::EmptyDocument(_)
                    | ServiceError::Store(_)
                    | ServiceError::Purge(PurgeError::Store(_)) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                if status.is_server_error() {
                    error!(error = %e, "request failed");
                }
                (status, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn get_by_query(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> Result<Json<StoredDocument>, ApiError> {
    retrieve(&state, &q.id).await
}

async fn get_by_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredDocument>, ApiError> {
    retrieve(&state, &id).await
}

async fn retrieve(state: &AppState, raw_id: &str) -> Result<Json<StoredDocument>, ApiError> {
    let doc = state.service.retrieve(raw_id).await?;
    state.metrics.retrieved.inc();
    Ok(Json(doc))
}

async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            state.metrics.rejected.inc();
            return Err(ApiError::Body(rejection));
        }
    };
    let Value::Object(record) = body else {
        state.metrics.rejected.inc();
        return Err(ApiError::NotAnObject);
    };
    match state.service.store(&record).await {
        Ok(doc) => {
            state.metrics.stored.inc();
            Ok(Json(json!({ "id": doc.id })))
        }
        Err(e) => {
            if matches!(e, ServiceError::Validation(_)) {
                state.metrics.rejected.inc();
            }
            Err(e.into())
        }
    }
}

async fn delete_by_query(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    delete(&state, &q.id).await
}

async fn delete_by_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    delete(&state, &id).await
}

async fn delete(state: &AppState, raw_id: &str) -> Result<Json<Value>, ApiError> {
    let id = state.service.delete(raw_id).await?;
    state.metrics.deleted.inc();
    Ok(Json(json!({ "id": id })))
}

async fn purge(State(state): State<AppState>) -> Result<Json<PurgeReport>, ApiError> {
    let report = run_purge(&state).await?;
    Ok(Json(report))
}

/// Run one purge and count what it removed, including partial work from a
/// purge that timed out.
pub async fn run_purge(state: &AppState) -> Result<PurgeReport, ServiceError> {
    match state.service.purge().await {
        Ok(report) => {
            state.metrics.record_purge(&report);
            Ok(report)
        }
        Err(e) => {
            if let ServiceError::Purge(PurgeError::TimedOut(partial)) = &e {
                state.metrics.record_purge(partial);
            }
            Err(e)
        }
    }
}
