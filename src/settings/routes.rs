//! REST endpoints for the connection settings page.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::presenter::SettingsPresenter;
use super::view::FormSchema;
use crate::connections::ProfileId;
use crate::error::StoreError;

/// Shared state for settings routes.
#[derive(Clone)]
pub struct SettingsRouteState {
    pub presenter: Arc<SettingsPresenter>,
}

/// Build the settings REST routes.
pub fn settings_routes(presenter: Arc<SettingsPresenter>) -> Router {
    let state = SettingsRouteState { presenter };

    Router::new()
        .route("/health", get(health))
        .route("/api/connections", get(list_connections).post(add_connection))
        .route("/api/connections/form", get(form_schema))
        .route("/api/connections/{id}/endpoint", put(update_endpoint))
        .route("/api/connections/{id}/credential", put(update_credential))
        .route("/api/connections/{id}/test", post(test_connection))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Deserialize)]
struct ValueRequest {
    value: String,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn form_schema() -> impl IntoResponse {
    Json(FormSchema::connections())
}

/// GET /api/connections
async fn list_connections(State(state): State<SettingsRouteState>) -> impl IntoResponse {
    Json(state.presenter.rows().await)
}

/// POST /api/connections
async fn add_connection(State(state): State<SettingsRouteState>) -> Response {
    match state.presenter.add_profile().await {
        Ok(id) => {
            info!(profile_id = %id, "Connection added via API");
            match state.presenter.row(id).await {
                Some(row) => (StatusCode::CREATED, Json(row)).into_response(),
                None => store_error(StoreError::ProfileNotFound { id: id.as_uuid() }),
            }
        }
        Err(e) => store_error(e),
    }
}

/// PUT /api/connections/{id}/endpoint
async fn update_endpoint(
    State(state): State<SettingsRouteState>,
    Path(id): Path<String>,
    Json(body): Json<ValueRequest>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.presenter.set_endpoint(id, body.value).await {
        Ok(()) => row_response(&state, id).await,
        Err(e) => store_error(e),
    }
}

/// PUT /api/connections/{id}/credential
async fn update_credential(
    State(state): State<SettingsRouteState>,
    Path(id): Path<String>,
    Json(body): Json<ValueRequest>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state
        .presenter
        .set_credential(id, SecretString::from(body.value))
        .await
    {
        Ok(()) => row_response(&state, id).await,
        Err(e) => store_error(e),
    }
}

/// POST /api/connections/{id}/test
///
/// Always 200 for a known profile; the probe outcome is in the body.
async fn test_connection(
    State(state): State<SettingsRouteState>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.presenter.test_connection(id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => store_error(e),
    }
}

fn parse_id(raw: &str) -> Result<ProfileId, Response> {
    raw.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid connection ID"})),
        )
            .into_response()
    })
}

async fn row_response(state: &SettingsRouteState, id: ProfileId) -> Response {
    match state.presenter.row(id).await {
        Some(row) => (StatusCode::OK, Json(row)).into_response(),
        None => store_error(StoreError::ProfileNotFound { id: id.as_uuid() }),
    }
}

fn store_error(err: StoreError) -> Response {
    let status = match err {
        StoreError::ProfileNotFound { .. } | StoreError::UnknownProfile { .. } => {
            StatusCode::NOT_FOUND
        }
        StoreError::AmbiguousProfile { .. } => StatusCode::BAD_REQUEST,
        StoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({"error": err.to_string()}))).into_response()
}
