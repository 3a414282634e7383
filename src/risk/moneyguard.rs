//! Payment-request assessment: structured one-shot input with method and
//! impersonation tables, red-flag weights from the channel catalog, and a
//! compound bonus when urgency and secrecy appear together.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use super::{
    scan_signals, RawVerdict, RecommendedAction, RiskLevel, RiskResponse, SafeScript,
    SessionPolicy,
};
use crate::catalog;
use crate::error::EngineError;

pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

/// Extra weight when urgency and a secrecy request appear together;
/// the combination is riskier than the sum of its parts.
const URGENCY_SECRECY_BONUS: u32 = 7;

/// Payment methods rated at or above this weight are labeled high-risk.
const HIGH_RISK_METHOD_WEIGHT: u32 = 25;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub payment_method: String,
    pub recipient: String,
    pub reason: String,
    pub did_they_contact_you_first: bool,
    pub urgency_present: bool,
    pub asked_to_keep_secret: bool,
    pub asked_for_verification_code: bool,
    pub asked_for_remote_access: bool,
    pub impersonation_type: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Gift cards and crypto are irreversible and anonymous, so they carry the
/// heaviest base weights by construction.
fn method_weight(method: &str) -> Option<u32> {
    match method {
        "gift_card" => Some(30),
        "prepaid_card" => Some(28),
        "crypto" => Some(28),
        "western_union" => Some(22),
        "moneygram" => Some(22),
        "wire" => Some(18),
        _ => None,
    }
}

fn impersonation_weight(kind: &str) -> Option<(u32, &'static str)> {
    match kind {
        "bank" => Some((5, "bank")),
        "government" => Some((5, "government")),
        "tech_support" => Some((5, "tech support")),
        "charity" => Some((5, "charity")),
        "contractor" => Some((6, "contractor")),
        "medicare" => Some((7, "Medicare")),
        "health_insurance" => Some((7, "health insurance")),
        _ => None,
    }
}

pub fn assess(req: &PaymentRequest) -> Result<RiskResponse, EngineError> {
    if !req.amount.is_finite() || req.amount < 0.0 || req.amount > MAX_AMOUNT {
        return Err(EngineError::validation(
            "amount",
            format!("must be between 0 and {}", MAX_AMOUNT as u64),
        ));
    }

    let mut score: u32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    let method = req.payment_method.to_lowercase();
    if let Some(w) = method_weight(&method) {
        score += w;
        let rating = if w >= HIGH_RISK_METHOD_WEIGHT {
            "high-risk"
        } else {
            "elevated risk"
        };
        reasons.push(format!("Payment method: {} ({})", method, rating));
    }

    // Red flags carry the fixed catalog weights; the amount never moves the
    // score on its own.
    let flags = flag_set(req);
    let scan = scan_signals(catalog::MONEYGUARD, &flags);
    score += scan.total;
    reasons.extend(scan.matched.iter().map(|def| def.label.to_string()));

    if req.urgency_present && req.asked_to_keep_secret {
        score += URGENCY_SECRECY_BONUS;
        reasons.push("Urgency combined with secrecy is a strong scam indicator.".to_string());
    }

    let impersonation = req.impersonation_type.to_lowercase();
    if let Some((w, label)) = impersonation_weight(&impersonation) {
        score += w;
        reasons.push(format!("Possible {} impersonation.", label));
    }

    if reasons.is_empty() {
        reasons.push("No high-risk indicators detected.".to_string());
    }

    let mut metadata = Map::new();
    metadata.insert("amount".into(), json!(req.amount));
    metadata.insert("payment_method".into(), json!(method));
    metadata.insert("impersonation_type".into(), json!(impersonation));

    // Refusal scripts for payment flows are served by `safe_steps`; the
    // one-shot verdict itself carries none.
    Ok(RawVerdict {
        score,
        reasons,
        next_action: NEXT_ACTION.to_string(),
        recommended_actions: default_actions(),
        safe_script: None,
        metadata,
    }
    .into_response())
}

fn flag_set(req: &PaymentRequest) -> BTreeSet<String> {
    let mut flags = BTreeSet::new();
    let pairs = [
        ("asked_for_verification_code", req.asked_for_verification_code),
        ("asked_for_remote_access", req.asked_for_remote_access),
        ("asked_to_keep_secret", req.asked_to_keep_secret),
        ("urgency_present", req.urgency_present),
        ("did_they_contact_you_first", req.did_they_contact_you_first),
    ];
    for (key, set) in pairs {
        if set {
            flags.insert(key.to_string());
        }
    }
    flags
}

const NEXT_ACTION: &str = "Verify the recipient using a trusted number or in-person contact.";

fn default_actions() -> Vec<RecommendedAction> {
    vec![
        RecommendedAction::new(
            "pause-payment",
            "Pause payment",
            "Stop and verify the request using a trusted channel.",
        ),
        RecommendedAction::new(
            "call-bank",
            "Call your bank",
            "Use the number on your card to confirm if this request is legitimate.",
        ),
        RecommendedAction::new(
            "no-otp",
            "Never share verification codes",
            "Banks and legitimate services will not ask for OTP codes or remote access.",
        ),
    ]
}

/// Static checklist and delay scripts for the safe-steps surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeSteps {
    pub checklist: Vec<RecommendedAction>,
    pub scripts: Vec<RecommendedAction>,
}

pub fn safe_steps() -> SafeSteps {
    SafeSteps {
        checklist: vec![
            RecommendedAction::new(
                "pause",
                "Pause the payment",
                "Give yourself time to verify the request.",
            ),
            RecommendedAction::new(
                "verify",
                "Verify independently",
                "Use an official number or app to confirm the request.",
            ),
            RecommendedAction::new(
                "invoice",
                "Ask for documentation",
                "Request a written invoice and validate the business directly.",
            ),
        ],
        scripts: vec![
            RecommendedAction::new(
                "delay",
                "Delay script",
                "I need to verify this request first. I'll follow up shortly.",
            ),
            RecommendedAction::new(
                "no-otp",
                "No OTP script",
                "I don't share verification codes with anyone.",
            ),
        ],
    }
}

/// Session variant: scores red-flag signals a MoneyGuard session has
/// accumulated. Unlike the one-shot assessment, a live payment flow at
/// medium or high tier carries a refusal script.
pub struct MoneyGuardSessionPolicy;

impl SessionPolicy for MoneyGuardSessionPolicy {
    fn evaluate(&self, signals: &BTreeSet<String>) -> RiskResponse {
        let scan = scan_signals(catalog::MONEYGUARD, signals);

        let mut score = scan.total;
        let mut reasons: Vec<String> = scan
            .matched
            .iter()
            .map(|def| def.label.to_string())
            .collect();

        if signals.contains("urgency_present") && signals.contains("asked_to_keep_secret") {
            score += URGENCY_SECRECY_BONUS;
            reasons.push("Urgency combined with secrecy is a strong scam indicator.".to_string());
        }
        if reasons.is_empty() {
            reasons.push("No high-risk indicators detected.".to_string());
        }

        let mut metadata = Map::new();
        metadata.insert(
            "primary_signal".into(),
            json!(scan.top.map_or("none", |def| def.key)),
        );
        if !scan.unrecognized.is_empty() {
            metadata.insert("unrecognized_signals".into(), json!(scan.unrecognized));
        }

        let level = RiskLevel::from_score(super::clamp_score(score));
        let safe_script = if level == RiskLevel::Low {
            None
        } else {
            Some(SafeScript::new(
                "I need to verify this request independently before sending any money.",
                "I won't proceed without verification. I'll follow up after I confirm.",
            ))
        };

        RawVerdict {
            score,
            reasons,
            next_action: NEXT_ACTION.to_string(),
            recommended_actions: default_actions(),
            safe_script,
            metadata,
        }
        .into_response()
    }
}
