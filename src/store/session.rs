//! Keyed, time-limited registry of in-progress sessions. One mutex guards the
//! map: append (add event + recompute risk + touch timestamp) is a single
//! critical section, so callers and the sweeper always see a consistent view.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::risk::{policy_for, Module, RiskResponse};

/// Event payload as a tagged union keyed by the wire `type` field:
/// `{"type": "signal", "payload": {"signal_key": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EventPayload {
    Signal { signal_key: String },
    Note { text: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventIn {
    #[serde(flatten)]
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(flatten)]
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Ended,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    id: String,
    module: Module,
    #[allow(dead_code)]
    user_id: String,
    #[allow(dead_code)]
    device_id: String,
    #[allow(dead_code)]
    context: Option<Value>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    state: SessionState,
    events: Vec<EventRecord>,
    last_risk: Option<RiskResponse>,
}

/// Derived on `end`; not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub module: Module,
    pub created_at: DateTime<Utc>,
    pub last_risk: RiskResponse,
    pub key_takeaways: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub events: Vec<EventRecord>,
    pub last_risk: Option<RiskResponse>,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    idle_ttl: Duration,
    max_age: Duration,
    sweep_interval_secs: u64,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl: Duration::hours(config.idle_ttl_hours),
            max_age: Duration::hours(config.max_age_hours),
            sweep_interval_secs: config.sweep_interval_secs,
        }
    }

    pub fn start(
        &self,
        module: Module,
        user_id: String,
        device_id: String,
        context: Option<Value>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let record = SessionRecord {
            id: id.clone(),
            module,
            user_id,
            device_id,
            context,
            created_at: now,
            last_accessed_at: now,
            state: SessionState::Active,
            events: Vec::new(),
            last_risk: None,
        };
        self.sessions.lock().expect("lock").insert(id.clone(), record);
        debug!(session_id = %id, module = module.as_str(), "session started");
        id
    }

    /// Append one event and re-score the full cumulative signal set. Scoring
    /// over the set, not the list, makes duplicate or out-of-order signals
    /// harmless.
    pub fn append_event(
        &self,
        session_id: &str,
        event: EventIn,
    ) -> Result<RiskResponse, EngineError> {
        let mut sessions = self.sessions.lock().expect("lock");
        let record = sessions
            .get_mut(session_id)
            .filter(|r| r.state == SessionState::Active)
            .ok_or(EngineError::NotFound("session"))?;

        record.events.push(EventRecord {
            id: Uuid::new_v4().to_string(),
            payload: event.payload,
            timestamp: event.timestamp,
        });

        let signals: BTreeSet<String> = record
            .events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::Signal { signal_key } => Some(signal_key.clone()),
                EventPayload::Note { .. } => None,
            })
            .collect();

        let risk = policy_for(record.module).evaluate(&signals);
        record.last_risk = Some(risk.clone());
        record.last_accessed_at = Utc::now();

        info!(
            session_id = %record.id,
            module = record.module.as_str(),
            score = risk.score,
            level = risk.level.as_str(),
            "session re-scored"
        );
        Ok(risk)
    }

    /// Finalize: no transition back out of Ended. Fails before the first
    /// event, since there is no risk verdict to summarize.
    pub fn end(&self, session_id: &str) -> Result<SessionSummary, EngineError> {
        let mut sessions = self.sessions.lock().expect("lock");
        let record = sessions
            .get_mut(session_id)
            .filter(|r| r.state == SessionState::Active)
            .ok_or(EngineError::NotFound("session"))?;

        let last_risk = record.last_risk.clone().ok_or_else(|| {
            EngineError::PreconditionFailed("no risk available: session has no events".to_string())
        })?;

        record.state = SessionState::Ended;
        record.last_accessed_at = Utc::now();

        let key_takeaways = last_risk.reasons.iter().take(3).cloned().collect();
        Ok(SessionSummary {
            session_id: record.id.clone(),
            module: record.module,
            created_at: record.created_at,
            last_risk,
            key_takeaways,
        })
    }

    pub fn get(&self, session_id: &str) -> Result<SessionDetail, EngineError> {
        let sessions = self.sessions.lock().expect("lock");
        let record = sessions
            .get(session_id)
            .ok_or(EngineError::NotFound("session"))?;
        Ok(SessionDetail {
            events: record.events.clone(),
            last_risk: record.last_risk.clone(),
        })
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().expect("lock").len()
    }

    /// Evict sessions idle past the TTL or older than the max age. Eviction
    /// is silent; callers discover it via NotFound. Contention is not worth
    /// waiting out here: skip and let the next tick retry.
    pub fn sweep_once(&self) -> usize {
        let mut sessions = match self.sessions.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("session map busy, sweep deferred to next tick");
                return 0;
            }
        };
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, r| {
            now.signed_duration_since(r.last_accessed_at) <= self.idle_ttl
                && now.signed_duration_since(r.created_at) <= self.max_age
        });
        before - sessions.len()
    }

    /// Background sweep owned by the store lifecycle: ticks until the token
    /// is cancelled at shutdown.
    pub fn spawn_sweeper(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        let period = std::time::Duration::from_secs(self.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so a fresh store
            // isn't swept at startup.
            tick.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("session sweeper stopped");
                        break;
                    }
                    _ = tick.tick() => {
                        let evicted = self.sweep_once();
                        if evicted > 0 {
                            info!(evicted, "expired sessions evicted");
                        }
                    }
                }
            }
        })
    }
}
