//! Engine facade: the single entry surface the HTTP layer calls. Routes each
//! request to the matching scoring policy, consulting session/profile state
//! where needed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::risk::identitywatch::{self, ProfileRequest};
use crate::risk::inboxguard::{self, Channel};
use crate::risk::moneyguard::{self, PaymentRequest, SafeSteps};
use crate::risk::{Module, RiskResponse};
use crate::store::{
    EventIn, EventPayload, Profile, ProfileStore, SessionDetail, SessionStore, SessionSummary,
};

pub struct Engine {
    sessions: Arc<SessionStore>,
    profiles: Arc<ProfileStore>,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(&config.session)),
            profiles: Arc::new(ProfileStore::new()),
        }
    }

    /// Start the background eviction sweep; stops when the token cancels.
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        self.sessions.clone().spawn_sweeper(cancel)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.session_count()
    }

    // --- session lifecycle ---

    pub fn start_session(
        &self,
        module: Module,
        user_id: String,
        device_id: String,
        context: Option<Value>,
    ) -> String {
        self.sessions.start(module, user_id, device_id, context)
    }

    pub fn append_event(
        &self,
        session_id: &str,
        event: EventIn,
    ) -> Result<RiskResponse, EngineError> {
        self.sessions.append_event(session_id, event)
    }

    pub fn end_session(&self, session_id: &str) -> Result<SessionSummary, EngineError> {
        self.sessions.end(session_id)
    }

    pub fn get_session(&self, session_id: &str) -> Result<SessionDetail, EngineError> {
        self.sessions.get(session_id)
    }

    // --- one-shot assessments ---

    /// Assess a payment request. When the caller names a live session, the
    /// triggered red flags are appended there as signal events so the session
    /// keeps its own running score; a dead session id is ignored, matching
    /// the one-shot nature of the assessment.
    pub fn assess_payment(&self, req: &PaymentRequest) -> Result<RiskResponse, EngineError> {
        let risk = moneyguard::assess(req)?;
        info!(
            module = "moneyguard",
            score = risk.score,
            level = risk.level.as_str(),
            "payment assessed"
        );

        if let Some(session_id) = &req.session_id {
            let flags = [
                ("asked_for_verification_code", req.asked_for_verification_code),
                ("asked_for_remote_access", req.asked_for_remote_access),
                ("asked_to_keep_secret", req.asked_to_keep_secret),
                ("urgency_present", req.urgency_present),
                ("did_they_contact_you_first", req.did_they_contact_you_first),
            ];
            for (key, set) in flags {
                if set {
                    let _ = self.sessions.append_event(
                        session_id,
                        EventIn {
                            payload: EventPayload::Signal {
                                signal_key: key.to_string(),
                            },
                            timestamp: Utc::now(),
                        },
                    );
                }
            }
        }
        Ok(risk)
    }

    pub fn safe_steps(&self) -> SafeSteps {
        moneyguard::safe_steps()
    }

    pub fn analyze_text(&self, text: &str, channel: Channel) -> RiskResponse {
        let risk = inboxguard::analyze_text(text, channel);
        info!(
            module = "inboxguard",
            channel = channel.as_str(),
            score = risk.score,
            level = risk.level.as_str(),
            "message analyzed"
        );
        risk
    }

    pub fn analyze_url(&self, url: &str) -> Result<RiskResponse, EngineError> {
        let risk = inboxguard::analyze_url(url)?;
        info!(
            module = "inboxguard",
            score = risk.score,
            level = risk.level.as_str(),
            "url analyzed"
        );
        Ok(risk)
    }

    // --- identity watch ---

    pub fn create_profile(&self, req: ProfileRequest) -> Result<Profile, EngineError> {
        identitywatch::validate_profile(&req)?;
        let profile = self.profiles.create(req);
        info!(profile_id = %profile.id, "identity profile created");
        Ok(profile)
    }

    /// The profile must already exist; it is never created implicitly here.
    pub fn check_identity_risk(
        &self,
        profile_id: &str,
        signals: &HashMap<String, bool>,
    ) -> Result<RiskResponse, EngineError> {
        let profile = self.profiles.get(profile_id)?;
        let risk = identitywatch::check(signals);
        info!(
            module = "identitywatch",
            profile_id = %profile.id,
            score = risk.score,
            level = risk.level.as_str(),
            "identity risk checked"
        );
        Ok(risk)
    }
}
