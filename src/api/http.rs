//! HTTP server setup with Axum

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::rest::{events, stats};
use super::state::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/events", get(events::get_events).post(events::post_event))
        .route("/stats", get(stats::get_stats))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the collector on `listener` until `shutdown` resolves
///
/// Handlers identify producers by the peer address, so the router is served
/// with connection info attached.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::AggregationStore;
    use crate::event_log::{DurableLog, EventLogConfig};
    use crate::service::IngestionService;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_health_check() {
        let dir = TempDir::new().unwrap();
        let log = DurableLog::open(&EventLogConfig::new(dir.path().join("events.log")))
            .await
            .unwrap();
        let service = IngestionService::new(Arc::new(AggregationStore::new()), Arc::new(log));
        let app = create_router(Arc::new(AppState::new(service)));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
    }
}
