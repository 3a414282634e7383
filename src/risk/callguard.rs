//! Call-channel scoring: evaluates the signal set a live call session has
//! accumulated and picks a refusal script for the dominant signal.

use std::collections::BTreeSet;

use serde_json::{json, Map};

use super::{
    scan_signals, RawVerdict, RecommendedAction, RiskLevel, RiskResponse, SafeScript,
    SessionPolicy,
};
use crate::catalog;

pub struct CallGuardPolicy;

impl SessionPolicy for CallGuardPolicy {
    fn evaluate(&self, signals: &BTreeSet<String>) -> RiskResponse {
        let scan = scan_signals(catalog::CALLGUARD, signals);

        let reasons: Vec<String> = if scan.matched.is_empty() {
            vec!["No high-risk signals detected.".to_string()]
        } else {
            scan.matched
                .iter()
                .map(|def| format!("Signal detected: {}", def.label))
                .collect()
        };

        let mut metadata = Map::new();
        metadata.insert(
            "primary_signal".into(),
            json!(scan.top.map_or("none", |def| def.key)),
        );
        metadata.insert("signals_count".into(), json!(signals.len()));
        metadata.insert("signals_recognized".into(), json!(scan.matched.len()));
        if !scan.unrecognized.is_empty() {
            metadata.insert("unrecognized_signals".into(), json!(scan.unrecognized));
        }

        let level = RiskLevel::from_score(super::clamp_score(scan.total));
        let safe_script = if level == RiskLevel::Low {
            None
        } else {
            Some(script_for(scan.top.map_or("", |def| def.key)))
        };

        RawVerdict {
            score: scan.total,
            reasons,
            next_action: next_action(level),
            recommended_actions: default_actions(),
            safe_script,
            metadata,
        }
        .into_response()
    }
}

fn next_action(level: RiskLevel) -> String {
    match level {
        RiskLevel::Low => {
            "Stay alert and avoid sharing personal details until the caller is verified."
        }
        RiskLevel::Medium => {
            "Verify the caller using an official phone number before sharing anything."
        }
        RiskLevel::High => "Hang up and call back using an official number you trust.",
    }
    .to_string()
}

fn default_actions() -> Vec<RecommendedAction> {
    vec![
        RecommendedAction::new(
            "pause-call",
            "Pause and verify",
            "Take a breath, avoid sharing info, and verify the caller independently.",
        ),
        RecommendedAction::new(
            "hang-up",
            "Hang up if pressured",
            "If they demand urgency or secrecy, end the call and call back using a trusted number.",
        ),
    ]
}

/// Refusal script for the dominant triggered signal; generic fallback when
/// the signal has no dedicated script.
fn script_for(signal_key: &str) -> SafeScript {
    match signal_key {
        "bank_impersonation" => SafeScript::new(
            "I will call the bank back using the number on my card.",
            "I don't share information on inbound calls. I'll reach out directly.",
        ),
        "government_impersonation" => SafeScript::new(
            "I don't handle legal matters over the phone. I will contact the agency directly.",
            "Please send official mail. I won't continue this call.",
        ),
        "tech_support" | "remote_access_request" => SafeScript::new(
            "I don't grant remote access. I'll contact support using the official site.",
            "No remote access. I'm ending the call now.",
        ),
        "verification_code_request" => SafeScript::new(
            "I never share verification codes.",
            "Without that, I can't proceed. Goodbye.",
        ),
        "gift_cards" | "crypto_payment" => SafeScript::new(
            "I don't pay with gift cards or crypto.",
            "That payment method isn't acceptable. I'm ending this call.",
        ),
        "grandparent_scam" => SafeScript::new(
            "I need to verify this is really you. What's your middle name?",
            "I'll call you back on the number I have saved. If it's an emergency, \
             contact other family members.",
        ),
        "family_emergency_scam" => SafeScript::new(
            "I need to verify this independently. Let me call other family members first.",
            "I don't make payments under pressure. I'll verify this separately and call back.",
        ),
        "medicare_scam" => SafeScript::new(
            "I don't share my Medicare number over the phone. I'll contact Medicare directly if needed.",
            "Medicare doesn't call unsolicited. I'm ending this call.",
        ),
        "health_insurance_scam" => SafeScript::new(
            "I'll verify my benefits through my insurance portal or by calling the number on my card.",
            "I don't share personal information on inbound calls. Goodbye.",
        ),
        "romance_scam" | "wont_meet_in_person" | "refuses_video_chat" => SafeScript::new(
            "I'd prefer to verify your identity through video chat before discussing money.",
            "I don't send money to people I haven't met in person.",
        ),
        "lottery_scam" | "sweepstakes_scam" | "upfront_payment_request" => SafeScript::new(
            "I don't recall entering any contest. Please send official documentation by mail.",
            "Real prizes don't require upfront payments. This call is over.",
        ),
        "investment_scam" => SafeScript::new(
            "I don't make investment decisions on cold calls. I'll consult my financial advisor.",
            "No legitimate investment requires immediate action. I'm ending this call.",
        ),
        "charity_scam" | "disaster_relief_scam" => SafeScript::new(
            "I'll verify the charity through Charity Navigator before donating.",
            "I don't donate to charities that pressure me. Goodbye.",
        ),
        "contractor_scam" | "home_repair_scam" => SafeScript::new(
            "I need a written contract and references before any work begins.",
            "I don't make decisions under pressure. I'll get multiple quotes first. Goodbye.",
        ),
        _ => SafeScript::new(
            "I'm not comfortable continuing this call. I'll verify and call back through an official number.",
            "I'm hanging up now.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn verification_code_alone_is_high() {
        let resp = CallGuardPolicy.evaluate(&keys(&["verification_code_request"]));
        assert!(resp.score >= 60);
        assert_eq!(resp.level, RiskLevel::High);
        assert!(resp.safe_script.is_some());
        assert!(resp
            .reasons
            .iter()
            .any(|r| r.contains("verification code")));
    }

    #[test]
    fn empty_signal_set_is_low_with_no_script() {
        let resp = CallGuardPolicy.evaluate(&BTreeSet::new());
        assert_eq!(resp.score, 0);
        assert_eq!(resp.level, RiskLevel::Low);
        assert!(resp.safe_script.is_none());
        assert_eq!(resp.reasons, vec!["No high-risk signals detected."]);
    }

    #[test]
    fn script_matches_dominant_signal() {
        let resp = CallGuardPolicy.evaluate(&keys(&["urgency", "bank_impersonation"]));
        assert_eq!(resp.level, RiskLevel::Medium);
        let script = resp.safe_script.expect("medium tier carries a script");
        assert!(script.say_this.contains("call the bank back"));
    }
}
