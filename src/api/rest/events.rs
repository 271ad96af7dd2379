//! Event endpoints

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, ConnectInfo, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::error;

use super::{ApiError, INVALID_EVENT_OR_FORMAT, INVALID_EVENT_TYPE};
use crate::api::state::AppState;
use crate::service::{QueryOutcome, ServiceError};

/// Query parameters for GET /events
#[derive(Debug, Deserialize)]
pub struct EventsParams {
    /// Restrict the count to one event type
    pub event: Option<String>,
}

/// POST /events - Record one event from the calling host
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    body: Bytes,
) -> Response {
    let source = peer.ip().to_canonical();
    let service = state.service.clone();

    // Detached so a client hanging up cannot cancel between the log append
    // and the counter update
    let outcome = tokio::spawn(async move { service.record(source, &body).await }).await;

    match outcome {
        Ok(Ok(receipt)) => {
            Json(json!({ "msg": format!("Event from {} logged", receipt.source) })).into_response()
        }
        Ok(Err(ServiceError::Parse(_))) => {
            (StatusCode::BAD_REQUEST, INVALID_EVENT_OR_FORMAT).into_response()
        }
        Ok(Err(e @ ServiceError::Durability(_))) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiError::internal(e.to_string()))).into_response()
        }
        Err(e) => {
            error!(%source, error = %e, "record task failed");
            let error = ApiError::internal("event could not be recorded");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        }
    }
}

/// GET /events - Count the calling host's events
///
/// Responds with `{"Events": n}` or `{"<Type>": n}` when `event` is given,
/// or a plain-text notice if the host has never recorded anything. A query
/// string that does not deserialize (e.g. a repeated `event`) is treated as
/// an invalid event type.
pub async fn get_events(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    params: Result<Query<EventsParams>, QueryRejection>,
) -> Response {
    let Ok(Query(params)) = params else {
        return (StatusCode::BAD_REQUEST, INVALID_EVENT_TYPE).into_response();
    };
    let source = peer.ip().to_canonical();
    let event_type = params.event.as_deref().filter(|e| !e.is_empty());

    match state.service.query(source, event_type) {
        Ok(QueryOutcome::Count { scope, count }) => {
            let mut body = Map::new();
            body.insert(scope.label().to_string(), Value::from(count));
            Json(Value::Object(body)).into_response()
        }
        Ok(QueryOutcome::NoData { source }) => {
            format!("No events recorded for {}", source).into_response()
        }
        Err(_) => (StatusCode::BAD_REQUEST, INVALID_EVENT_TYPE).into_response(),
    }
}
