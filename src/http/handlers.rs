//! Request/response DTOs and handlers for the /v1 surface.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::risk::identitywatch::ProfileRequest;
use crate::risk::inboxguard::Channel;
use crate::risk::moneyguard::{PaymentRequest, SafeSteps};
use crate::risk::{Module, RiskResponse};
use crate::store::{EventIn, SessionDetail, SessionSummary};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
}

pub async fn health(State(engine): State<Arc<Engine>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_sessions: engine.session_count(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SessionStartRequest {
    pub user_id: Uuid,
    pub device_id: String,
    pub module: Module,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SessionStartResponse {
    pub session_id: String,
}

pub async fn start_session(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<SessionStartRequest>,
) -> Json<SessionStartResponse> {
    let session_id = engine.start_session(
        req.module,
        req.user_id.to_string(),
        req.device_id,
        req.context,
    );
    Json(SessionStartResponse { session_id })
}

pub async fn append_event(
    State(engine): State<Arc<Engine>>,
    Path(session_id): Path<String>,
    Json(event): Json<EventIn>,
) -> Result<Json<RiskResponse>, EngineError> {
    engine.append_event(&session_id, event).map(Json)
}

pub async fn end_session(
    State(engine): State<Arc<Engine>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, EngineError> {
    engine.end_session(&session_id).map(Json)
}

pub async fn get_session(
    State(engine): State<Arc<Engine>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetail>, EngineError> {
    engine.get_session(&session_id).map(Json)
}

pub async fn moneyguard_assess(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<RiskResponse>, EngineError> {
    engine.assess_payment(&req).map(Json)
}

#[derive(Debug, Deserialize)]
pub struct SafeStepsRequest {
    #[serde(default)]
    #[allow(dead_code)]
    pub session_id: Option<String>,
}

pub async fn moneyguard_safe_steps(
    State(engine): State<Arc<Engine>>,
    Json(_req): Json<SafeStepsRequest>,
) -> Json<SafeSteps> {
    Json(engine.safe_steps())
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
    pub channel: Channel,
}

pub async fn inboxguard_analyze_text(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<AnalyzeTextRequest>,
) -> Json<RiskResponse> {
    Json(engine.analyze_text(&req.text, req.channel))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeUrlRequest {
    pub url: String,
}

pub async fn inboxguard_analyze_url(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<AnalyzeUrlRequest>,
) -> Result<Json<RiskResponse>, EngineError> {
    engine.analyze_url(&req.url).map(Json)
}

#[derive(Debug, Serialize)]
pub struct ProfileCreatedResponse {
    pub profile_id: String,
    pub created: DateTime<Utc>,
}

pub async fn identitywatch_profile(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileCreatedResponse>, EngineError> {
    let profile = engine.create_profile(req)?;
    Ok(Json(ProfileCreatedResponse {
        profile_id: profile.id,
        created: profile.created_at,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CheckRiskRequest {
    pub profile_id: String,
    pub signals: HashMap<String, bool>,
}

pub async fn identitywatch_check_risk(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<CheckRiskRequest>,
) -> Result<Json<RiskResponse>, EngineError> {
    engine
        .check_identity_risk(&req.profile_id, &req.signals)
        .map(Json)
}
