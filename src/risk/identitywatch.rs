//! Identity-compromise watch: profile validation (email/phone format) and
//! boolean signal scoring with a bonus once multiple high-risk signals
//! coincide.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{
    scan_signals, RawVerdict, RecommendedAction, RiskResponse, SessionPolicy,
};
use crate::catalog;
use crate::error::EngineError;

/// Added once at least this many high-risk signals are true together.
const MULTI_SIGNAL_THRESHOLD: usize = 2;
const MULTI_SIGNAL_BONUS: u32 = 15;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email regex")
});

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileRequest {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Reject a profile with missing or malformed contact points. At least one
/// email and one phone are required; phones need 10–20 digits once
/// formatting characters are stripped.
pub fn validate_profile(req: &ProfileRequest) -> Result<(), EngineError> {
    if req.emails.is_empty() {
        return Err(EngineError::validation(
            "emails",
            "at least one email is required",
        ));
    }
    if req.phones.is_empty() {
        return Err(EngineError::validation(
            "phones",
            "at least one phone is required",
        ));
    }
    for email in &req.emails {
        if !EMAIL_RE.is_match(email) {
            return Err(EngineError::validation(
                "emails",
                format!("invalid email address: {}", email),
            ));
        }
    }
    for phone in &req.phones {
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        let stripped_ok = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '));
        if !stripped_ok || !(10..=20).contains(&digits) {
            return Err(EngineError::validation(
                "phones",
                format!("invalid phone number: {}", phone),
            ));
        }
    }
    Ok(())
}

pub fn check(signals: &HashMap<String, bool>) -> RiskResponse {
    let active: BTreeSet<String> = signals
        .iter()
        .filter(|(_, &on)| on)
        .map(|(k, _)| k.clone())
        .collect();
    let scan = scan_signals(catalog::IDENTITYWATCH, &active);

    let mut score = scan.total;
    let mut reasons: Vec<String> = scan
        .matched
        .iter()
        .map(|def| def.label.to_string())
        .collect();

    let high_risk_count = scan.matched.iter().filter(|def| def.high_risk).count();
    if high_risk_count >= MULTI_SIGNAL_THRESHOLD {
        score += MULTI_SIGNAL_BONUS;
        reasons.push("Multiple high-risk identity signals present.".to_string());
    }

    if reasons.is_empty() {
        reasons.push("No high-risk identity signals selected.".to_string());
    }

    let mut metadata = step_metadata();
    if !scan.unrecognized.is_empty() {
        metadata.insert("unrecognized_signals".into(), json!(scan.unrecognized));
    }

    RawVerdict {
        score,
        reasons,
        next_action: NEXT_ACTION.to_string(),
        recommended_actions: default_actions(),
        safe_script: None,
        metadata,
    }
    .into_response()
}

const NEXT_ACTION: &str =
    "Start with a credit freeze and password reset if any suspicion remains.";

fn step_metadata() -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert(
        "suggested_freeze_steps".into(),
        json!([
            "Freeze credit with Equifax, Experian, and TransUnion.",
            "Create a PIN for lifting the freeze later.",
        ]),
    );
    metadata.insert(
        "suggested_password_steps".into(),
        json!([
            "Change passwords starting with email and banking.",
            "Enable passkeys or authenticator apps where possible.",
        ]),
    );
    metadata.insert(
        "monitoring_steps".into(),
        json!([
            "Set alerts for new credit inquiries.",
            "Review bank statements weekly for unusual activity.",
        ]),
    );
    metadata
}

fn default_actions() -> Vec<RecommendedAction> {
    vec![
        RecommendedAction::new(
            "freeze-credit",
            "Freeze your credit",
            "Place a free credit freeze with the major bureaus.",
        ),
        RecommendedAction::new(
            "enable-2fa",
            "Enable 2FA",
            "Turn on multi-factor authentication for key accounts.",
        ),
        RecommendedAction::new(
            "change-passwords",
            "Change passwords",
            "Update passwords on critical accounts and use a manager.",
        ),
        RecommendedAction::new(
            "check-credit",
            "Check your credit report",
            "Review recent inquiries and accounts you don't recognize.",
        ),
    ]
}

/// Session variant: accumulated signal keys are treated as asserted signals.
pub struct IdentityWatchSessionPolicy;

impl SessionPolicy for IdentityWatchSessionPolicy {
    fn evaluate(&self, signals: &BTreeSet<String>) -> RiskResponse {
        let map: HashMap<String, bool> =
            signals.iter().map(|k| (k.clone(), true)).collect();
        check(&map)
    }
}
