//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/stop", post(stop_handler))
        .route("/interval", put(interval_handler))
        .route("/preset/:minutes", post(preset_handler))
        .route("/presets", get(presets_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{services::audio::testing::RecordingPlayer, state::IntervalMinutes};

    fn app() -> (Arc<AppState>, Router) {
        let state = Arc::new(AppState::new(
            20554,
            "127.0.0.1".to_string(),
            IntervalMinutes::default(),
            Arc::new(RecordingPlayer::default()),
        ));
        (Arc::clone(&state), create_router(state))
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test(start_paused = true)]
    async fn status_while_idle() {
        let (_, router) = app();
        let (status, body) = call(&router, Method::GET, "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "idle");
        assert_eq!(body["loading"], true);
        assert_eq!(body["clock"], Value::Null);
        assert_eq!(body["selected_minutes"], 15);
        assert_eq!(body["active_cycle_minutes"], Value::Null);
        assert_eq!(body["cycle_label"], "15m cycle");
        assert_eq!(body["next_chime_at"], Value::Null);
        assert_eq!(body["progress"], 0.0);
        assert_eq!(body["controls"]["start"], true);
        assert_eq!(body["controls"]["stop"], false);
        assert_eq!(body["presets"].as_array().map(Vec::len), Some(8));
        assert_eq!(body["port"], 20554);
    }

    #[tokio::test(start_paused = true)]
    async fn control_flow_over_http() {
        let (_, router) = app();

        let (status, body) = call(&router, Method::POST, "/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert_eq!(body["bell"]["active_cycle_minutes"], 15);
        assert_eq!(body["bell"]["remaining_seconds"], 900);
        assert_eq!(body["bell"]["controls"]["pause"], true);
        assert!(body["bell"]["next_chime_at"].is_string());

        let (status, body) = call(&router, Method::POST, "/start", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "cannot start: timer is running");

        let (status, body) = call(&router, Method::POST, "/pause", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paused");
        assert_eq!(body["bell"]["controls"]["resume"], true);
        assert!(body["bell"]["next_chime_at"].is_string());

        let (status, body) = call(&router, Method::POST, "/resume", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");

        let (status, body) = call(&router, Method::POST, "/stop", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "idle");
        assert_eq!(body["bell"]["active_cycle_minutes"], Value::Null);

        let (status, _) = call(&router, Method::POST, "/stop", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let (status, _) = call(&router, Method::POST, "/resume", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_edits_validate_input() {
        let (state, router) = app();

        let (status, body) = call(&router, Method::PUT, "/interval", Some(serde_json::json!({"minutes": 25}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bell"]["selected_minutes"], 25);

        let (status, body) = call(&router, Method::PUT, "/interval", Some(serde_json::json!({"minutes": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("positive"));

        let (status, _) = call(&router, Method::PUT, "/interval", Some(serde_json::json!({"minutes": "abc"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.snapshot().selected.get(), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_edits_reject_malformed_bodies() {
        let (state, router) = app();

        for body in [serde_json::json!({}), serde_json::json!({"mins": 5})] {
            let (status, reply) = call(&router, Method::PUT, "/interval", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(reply["error"].as_str().unwrap().contains("minutes"));
            assert!(reply["timestamp"].is_string());
        }

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/interval")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("minutes=5"))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let reply: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(reply["error"].is_string());

        let (status, _) = call(&router, Method::PUT, "/interval", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.snapshot().selected.get(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn preset_selection_while_idle() {
        let (state, router) = app();

        let (status, body) = call(&router, Method::POST, "/preset/60", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "idle");
        assert_eq!(body["bell"]["selected_minutes"], 60);
        assert!(!state.snapshot().chime_pending);

        let (_, presets) = call(&router, Method::GET, "/presets", None).await;
        let selected: Vec<&Value> = presets
            .as_array()
            .unwrap()
            .iter()
            .filter(|p| p["selected"] == true)
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["minutes"], 60);

        let (status, _) = call(&router, Method::POST, "/preset/7", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_edit_while_running_keeps_cycle() {
        let (_, router) = app();
        call(&router, Method::POST, "/start", None).await;

        let (_, body) = call(&router, Method::POST, "/preset/90", None).await;
        assert_eq!(body["bell"]["selected_minutes"], 90);
        assert_eq!(body["bell"]["active_cycle_minutes"], 15);
        assert_eq!(body["bell"]["cycle_label"], "15m cycle");
    }

    #[tokio::test(start_paused = true)]
    async fn status_shows_clock_after_tick() {
        let (state, router) = app();
        state.record_clock(chrono::Local::now());

        let (_, body) = call(&router, Method::GET, "/status", None).await;
        assert_eq!(body["loading"], false);
        assert_eq!(body["clock"].as_str().map(str::len), Some(8));
    }

    #[tokio::test]
    async fn health() {
        let (_, router) = app();
        let (status, body) = call(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
