//! HTTP surface: thin DTO and status mapping over the engine facade. Wire
//! field names are frozen; existing front-ends depend on them.

pub mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::engine::Engine;
use crate::error::EngineError;

pub fn create_router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/session/start", post(handlers::start_session))
        .route("/v1/session/:id/event", post(handlers::append_event))
        .route("/v1/session/:id/end", post(handlers::end_session))
        .route("/v1/session/:id", get(handlers::get_session))
        .route("/v1/moneyguard/assess", post(handlers::moneyguard_assess))
        .route(
            "/v1/moneyguard/safe_steps",
            post(handlers::moneyguard_safe_steps),
        )
        .route(
            "/v1/inboxguard/analyze_text",
            post(handlers::inboxguard_analyze_text),
        )
        .route(
            "/v1/inboxguard/analyze_url",
            post(handlers::inboxguard_analyze_url),
        )
        .route(
            "/v1/identitywatch/profile",
            post(handlers::identitywatch_profile),
        )
        .route(
            "/v1/identitywatch/check_risk",
            post(handlers::identitywatch_check_risk),
        )
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::Validation { .. } => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::PreconditionFailed(_) => StatusCode::CONFLICT,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use axum_test::TestServer;
    use serde_json::json;

    fn server() -> TestServer {
        let engine = Arc::new(Engine::new(&EngineConfig::default()));
        TestServer::new(create_router(engine)).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = server();
        let response = server.get("/v1/health").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn session_round_trip() {
        let server = server();
        let start = server
            .post("/v1/session/start")
            .json(&json!({
                "user_id": "7f8e2bd2-7f2e-41f8-9a3b-0a5fbb32f111",
                "device_id": "tablet-1",
                "module": "callguard"
            }))
            .await;
        start.assert_status_ok();
        let session_id = start.json::<serde_json::Value>()["session_id"]
            .as_str()
            .unwrap()
            .to_string();

        let event = server
            .post(&format!("/v1/session/{}/event", session_id))
            .json(&json!({
                "type": "signal",
                "payload": { "signal_key": "verification_code_request" },
                "timestamp": "2026-01-10T10:00:00Z"
            }))
            .await;
        event.assert_status_ok();
        let risk: serde_json::Value = event.json();
        assert_eq!(risk["level"], "high");
        assert!(risk["safe_script"].is_object());

        let end = server
            .post(&format!("/v1/session/{}/end", session_id))
            .await;
        end.assert_status_ok();
        let summary: serde_json::Value = end.json();
        assert_eq!(summary["session_id"], session_id.as_str());
        assert!(!summary["key_takeaways"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_404_with_detail() {
        let server = server();
        let response = server
            .post("/v1/session/not-here/event")
            .json(&json!({
                "type": "signal",
                "payload": { "signal_key": "urgency" },
                "timestamp": "2026-01-10T10:00:00Z"
            }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["detail"], "session not found");
    }

    #[tokio::test]
    async fn moneyguard_assess_wire_shape() {
        let server = server();
        let response = server
            .post("/v1/moneyguard/assess")
            .json(&json!({
                "amount": 950,
                "payment_method": "gift_card",
                "recipient": "caller",
                "reason": "fees",
                "did_they_contact_you_first": true,
                "urgency_present": true,
                "asked_to_keep_secret": true,
                "asked_for_verification_code": true,
                "asked_for_remote_access": false,
                "impersonation_type": "bank"
            }))
            .await;
        response.assert_status_ok();
        let risk: serde_json::Value = response.json();
        assert_eq!(risk["score"], 85);
        assert_eq!(risk["level"], "high");
        assert!(risk["safe_script"].is_null());
    }
}
