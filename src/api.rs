use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{debug, error, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::filter::FilterStats;
use crate::fingerprint::Fingerprint;
use crate::types::AppState;

pub const CLEAN: &str = "Y-God: clean";
pub const TAMPER_DETECTED: &str = "tamper detected";
pub const UNREADABLE_PAYLOAD: &str = "unreadable payload";
pub const READ_TIMED_OUT: &str = "payload read timed out";
pub const INTERNAL_ERROR: &str = "internal error";

#[derive(OpenApi)]
#[openapi(
    paths(health_check, ingest, filter_stats),
    components(schemas(FilterStats)),
    tags(
        (name = "tamper-gate", description = "Payload integrity gateway")
    )
)]
struct ApiDoc;

/// Check API health
#[utoipa::path(
    get,
    path = "/health",
    tag = "tamper-gate",
    responses(
        (status = 200, description = "API is healthy")
    )
)]
async fn health_check() -> impl IntoResponse {
    debug!("Health check");
    StatusCode::OK
}

/// Screen a payload against the known-good fingerprints
#[utoipa::path(
    post,
    path = "/ingest",
    tag = "tamper-gate",
    request_body(
        content = String,
        content_type = "application/octet-stream",
        description = "Opaque payload"
    ),
    responses(
        (status = 200, description = "Payload is known-good", body = String),
        (status = 403, description = "Tamper detected, alert fired", body = String),
        (status = 400, description = "Body could not be read in full", body = String),
        (status = 408, description = "Body read timed out", body = String),
        (status = 500, description = "Internal server error", body = String)
    )
)]
async fn ingest(State(state): State<Arc<AppState>>, body: Body) -> Response {
    let payload = match read_payload(&state, body).await {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let fingerprint = Fingerprint::of(&payload);
    drop(payload);

    match state.filter.test(fingerprint.as_ref()) {
        Ok(true) => {
            info!(fingerprint = %fingerprint.short(), "Payload clean");
            (StatusCode::OK, CLEAN).into_response()
        }
        Ok(false) => {
            warn!(
                fingerprint = %fingerprint.short(),
                "BLOOM FAIL: potential tamper"
            );
            state.alerts.trigger(fingerprint);
            (StatusCode::FORBIDDEN, TAMPER_DETECTED).into_response()
        }
        Err(e) => {
            error!(fingerprint = %fingerprint.short(), "Filter query failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR).into_response()
        }
    }
}

/// Collects the whole body or fails closed. Partial bodies are never
/// fingerprinted.
async fn read_payload(
    state: &AppState,
    body: Body,
) -> std::result::Result<Bytes, Response> {
    let read = axum::body::to_bytes(body, state.max_body_bytes);
    match tokio::time::timeout(state.body_read_timeout, read).await {
        Ok(Ok(payload)) => Ok(payload),
        Ok(Err(e)) => {
            warn!(
                limit = state.max_body_bytes,
                "Rejecting unreadable payload: {}", e
            );
            Err((StatusCode::BAD_REQUEST, UNREADABLE_PAYLOAD).into_response())
        }
        Err(_) => {
            warn!(
                timeout = ?state.body_read_timeout,
                "Rejecting payload: body read timed out"
            );
            Err((StatusCode::REQUEST_TIMEOUT, READ_TIMED_OUT).into_response())
        }
    }
}

/// Report filter load
#[utoipa::path(
    get,
    path = "/stats",
    tag = "tamper-gate",
    responses(
        (status = 200, description = "Current filter statistics", body = FilterStats)
    )
)]
async fn filter_stats(State(state): State<Arc<AppState>>) -> Json<FilterStats> {
    Json(state.filter.stats())
}

/// Builds the gateway router. Panics in any handler are turned into `500`
/// responses by the router itself, so every caller gets the same containment.
pub fn create_router(state: Arc<AppState>) -> Router {
    let openapi = ApiDoc::openapi();

    Router::new()
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi),
        )
        .route("/health", get(health_check))
        .route("/ingest", post(ingest))
        .route("/stats", get(filter_stats))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
