//! HTTP API module
//!
//! This module contains the gateway's endpoint handlers, request translation
//! and response structures.

pub mod handlers;
pub mod requests;
pub mod responses;

use std::sync::Arc;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/command", get(command_query_handler).post(command_body_handler))
        // Path used by existing webhook integrations
        .route("/sigfox", get(command_query_handler).post(command_body_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{error::BusError, services::CommandPublisher};

    #[derive(Default)]
    struct RecordingPublisher {
        offline: bool,
        sent: Mutex<Vec<(String, Value)>>,
    }

    impl CommandPublisher for RecordingPublisher {
        fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BusError> {
            if self.offline {
                return Err(BusError::NotConnected);
            }
            let payload = serde_json::from_slice(&payload).unwrap();
            self.sent.lock().unwrap().push((topic.to_string(), payload));
            Ok(())
        }

        fn is_connected(&self) -> bool {
            !self.offline
        }
    }

    fn app(publisher: Arc<RecordingPublisher>) -> Router {
        create_router(Arc::new(AppState::new(publisher, 52341, "127.0.0.1".to_string())))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_command_publishes_timer() {
        let publisher = Arc::new(RecordingPublisher::default());
        let response = app(publisher.clone())
            .oneshot(
                Request::builder()
                    .uri("/command?target=bathroom&text=SHOWER&duration=600")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
        let sent = publisher.sent.lock().unwrap();
        assert_eq!(
            sent.as_slice(),
            &[(
                "home/displays/bathroom".to_string(),
                json!({ "name": "SHOWER", "duration": 600 })
            )]
        );
    }

    #[tokio::test]
    async fn post_command_publishes_preset() {
        let publisher = Arc::new(RecordingPublisher::default());
        let response = app(publisher.clone())
            .oneshot(post_json(
                "/command",
                json!({ "target": "wc", "mode": "preset", "preset_id": "on_air", "duration": 60 }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent[0].0, "home/displays/wc");
        assert_eq!(sent[0].1["preset_id"], "on_air");
        assert_eq!(sent[0].1["duration"], 60);
    }

    #[tokio::test]
    async fn bad_requests_get_400_with_reason() {
        let publisher = Arc::new(RecordingPublisher::default());
        let response = app(publisher.clone())
            .oneshot(post_json("/command", json!({ "target": "wc" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing target, text, or duration");

        let response = app(publisher.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/sigfox")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn broker_down_is_500() {
        let publisher = Arc::new(RecordingPublisher {
            offline: true,
            ..Default::default()
        });
        let response = app(publisher)
            .oneshot(post_json(
                "/command",
                json!({ "target": "eva", "name": "NAP", "duration": 1200 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Failed to publish to MQTT");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app(Arc::new(RecordingPublisher::default()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn status_counts_published_and_rejected() {
        let publisher = Arc::new(RecordingPublisher::default());
        let state = Arc::new(AppState::new(publisher, 52341, "127.0.0.1".to_string()));
        let router = create_router(state.clone());

        router
            .clone()
            .oneshot(post_json("/command", json!({ "target": "wc", "name": "A", "duration": 5 })))
            .await
            .unwrap();
        router
            .clone()
            .oneshot(post_json("/command", json!({ "target": "attic", "name": "A", "duration": 5 })))
            .await
            .unwrap();

        let response = router
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(status["published"], 1);
        assert_eq!(status["rejected"], 1);
        assert_eq!(status["broker_connected"], true);
        assert_eq!(status["last_command"], "timer A (5s) -> home/displays/wc");
    }
}
