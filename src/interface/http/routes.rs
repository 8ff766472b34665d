use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::application::MonitoringSession;

use super::handlers::{alerts_handler, check_handler, health_handler, snapshot_handler, AppState};

pub fn create_router(session: Arc<MonitoringSession>) -> Router {
    let state = AppState { session };

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/snapshot", get(snapshot_handler))
        .route("/api/check", post(check_handler))
        .route("/api/alerts", post(alerts_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::MemoryStore;
    use crate::application::probe::tests::FakeSource;
    use crate::application::{AlertDispatcher, HealthProbe};
    use crate::config::MonitorConfig;

    fn app(source: FakeSource) -> Router {
        let config = MonitorConfig::new("docs", 60, 500).unwrap();
        let probe = HealthProbe::new(Arc::new(source), Duration::from_secs(10));
        let session = MonitoringSession::new(
            config,
            probe,
            AlertDispatcher::new(),
            Box::new(MemoryStore::with_default_retention()),
        );
        create_router(Arc::new(session))
    }

    async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app(FakeSource::healthy(&["docs"])), "GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "qdmon");
    }

    #[tokio::test]
    async fn test_check_then_snapshot() {
        let app = app(FakeSource::healthy(&["docs"]));

        let (status, body) = call(&app, "POST", "/api/check").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["healthy"], true);
        assert_eq!(body["verdict"]["kind"], "clear");

        let (status, body) = call(&app, "GET", "/api/snapshot?history_limit=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["target"], "docs");
        assert_eq!(body["phase"], "idle");
        assert_eq!(body["uptime_percent"], 100.0);
        assert_eq!(body["health_history"].as_array().unwrap().len(), 1);
        assert_eq!(body["latency_history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_alerts_require_alertable_verdict() {
        let app = app(FakeSource::healthy(&["docs"]));

        let (status, _) = call(&app, "POST", "/api/alerts").await;
        assert_eq!(status, StatusCode::CONFLICT);

        call(&app, "POST", "/api/check").await;
        let (status, body) = call(&app, "POST", "/api/alerts").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "no alert to send");
    }

    #[tokio::test]
    async fn test_alerts_after_failure() {
        let mut source = FakeSource::healthy(&["docs"]);
        source.reachable = false;
        let app = app(source);

        let (_, body) = call(&app, "POST", "/api/check").await;
        assert_eq!(body["verdict"]["kind"], "failure");
        assert_eq!(body["result"]["detail"]["kind"], "connection_failure");

        let (status, body) = call(&app, "POST", "/api/alerts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"]["reason"], "connection failed: connection refused");
        assert!(body["delivery"]["email"].is_null());
        assert!(body["delivery"]["sms"].is_null());
    }
}
