//! HTTP route definitions.
//!
//! ```text
//! GET    /              - Status document
//! GET    /health        - Status document
//! POST   /{action}      - Dispatch with the raw body as payload
//! GET    /{action}      - Dispatch with `?payload=` as payload
//! ```
//!
//! `health` is therefore not reachable as an action over `GET`.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::{rejection::PathRejection, DefaultBodyLimit, Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use parking_lot::RwLock;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use meteion_core::{log_failure, ActionRegistry};
use meteion_protocols::ActionError;

use crate::server::{ControlConfig, ServerState};

/// Shared router state.
#[derive(Clone)]
pub struct RouterState {
    pub registry: Arc<ActionRegistry>,
    pub server_state: Arc<RwLock<ServerState>>,
}

impl RouterState {
    pub fn new(registry: Arc<ActionRegistry>, server_state: Arc<RwLock<ServerState>>) -> Self {
        Self {
            registry,
            server_state,
        }
    }
}

/// Body of `GET /` and `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthDocument {
    pub status: String,
    pub state: String,
    pub version: String,
    pub actions: Vec<String>,
}

/// Build the control router with body limit, exchange timeout and tracing.
pub fn create_router(state: RouterState, config: &ControlConfig) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/{action}", get(dispatch_query).post(dispatch_body))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<RouterState>) -> Json<HealthDocument> {
    Json(HealthDocument {
        status: "ok".to_string(),
        state: state.server_state.read().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        actions: state.registry.names(),
    })
}

async fn dispatch_body(
    State(state): State<RouterState>,
    action: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Response {
    let action = match action {
        Ok(Path(action)) => action,
        Err(rejection) => return malformed("", rejection.body_text()),
    };
    let payload = match String::from_utf8(body.to_vec()) {
        Ok(payload) => payload,
        Err(e) => return malformed(&action, format!("body is not valid UTF-8: {}", e)),
    };
    dispatch(state.registry, action, payload).await
}

async fn dispatch_query(
    State(state): State<RouterState>,
    action: Result<Path<String>, PathRejection>,
    RawQuery(query): RawQuery,
) -> Response {
    let action = match action {
        Ok(Path(action)) => action,
        Err(rejection) => return malformed("", rejection.body_text()),
    };
    match payload_from_query(query.as_deref()) {
        Ok(payload) => dispatch(state.registry, action, payload).await,
        Err(detail) => malformed(&action, detail),
    }
}

fn malformed(action: &str, detail: impl Into<String>) -> Response {
    let err = ActionError::MalformedRequest(detail.into());
    log_failure(action, &err);
    (StatusCode::BAD_REQUEST, err.to_string()).into_response()
}

/// Decode the `payload` query parameter strictly. Absent means empty.
fn payload_from_query(query: Option<&str>) -> Result<String, String> {
    let mut payload = None;
    for pair in query.unwrap_or_default().split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if decode_component(key)? != "payload" {
            continue;
        }
        if payload.is_some() {
            return Err("duplicate query parameter 'payload'".to_string());
        }
        payload = Some(decode_component(value)?);
    }
    Ok(payload.unwrap_or_default())
}

/// Form encoding: `+` is a space, `%XX` must yield UTF-8.
fn decode_component(raw: &str) -> Result<String, String> {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| format!("query is not valid UTF-8: {}", e))
}

/// Handlers may block on the host, so they run on the blocking pool.
async fn dispatch(registry: Arc<ActionRegistry>, action: String, payload: String) -> Response {
    let name = action.clone();
    let result = tokio::task::spawn_blocking(move || registry.try_dispatch(&action, &payload)).await;

    match result {
        Ok(Ok(response)) => (StatusCode::OK, response).into_response(),
        Ok(Err(err)) => {
            log_failure(&name, &err);
            let status = match err {
                ActionError::NoSuchAction(_) => StatusCode::NOT_FOUND,
                ActionError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::OK,
            };
            (status, err.to_string()).into_response()
        }
        Err(e) => {
            error!(action = %name, error = %e, "Dispatch task failed");
            let err = ActionError::HandlerFault(e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
