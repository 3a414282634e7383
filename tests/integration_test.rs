//! Integration tests: the acceptance scenarios for all four channels plus
//! session lifecycle, idempotence, and TTL eviction.

use std::collections::HashMap;

use chrono::Utc;
use guardian_engine::config::{EngineConfig, SessionConfig};
use guardian_engine::error::EngineError;
use guardian_engine::risk::identitywatch::ProfileRequest;
use guardian_engine::risk::inboxguard::Channel;
use guardian_engine::risk::moneyguard::PaymentRequest;
use guardian_engine::risk::{Module, RiskLevel};
use guardian_engine::store::{EventIn, EventPayload, SessionStore};
use guardian_engine::Engine;

fn engine() -> Engine {
    Engine::new(&EngineConfig::default())
}

fn signal(key: &str) -> EventIn {
    EventIn {
        payload: EventPayload::Signal {
            signal_key: key.to_string(),
        },
        timestamp: Utc::now(),
    }
}

#[test]
fn callguard_verification_code_scenario() {
    let engine = engine();
    let id = engine.start_session(Module::Callguard, "u1".into(), "phone".into(), None);
    let risk = engine
        .append_event(&id, signal("verification_code_request"))
        .unwrap();

    assert!(risk.score >= 60);
    assert_eq!(risk.level, RiskLevel::High);
    assert!(risk.safe_script.is_some());
    assert!(risk.reasons.iter().any(|r| r.contains("verification code")));
}

#[test]
fn duplicate_signals_do_not_double_count() {
    let engine = engine();
    let id = engine.start_session(Module::Callguard, "u1".into(), "phone".into(), None);
    let once = engine.append_event(&id, signal("gift_cards")).unwrap();
    let twice = engine.append_event(&id, signal("gift_cards")).unwrap();
    assert_eq!(once.score, twice.score);
}

#[test]
fn moneyguard_gift_card_scenario() {
    let engine = engine();
    let risk = engine
        .assess_payment(&PaymentRequest {
            amount: 950.0,
            payment_method: "gift_card".into(),
            recipient: "caller".into(),
            reason: "unpaid fees".into(),
            did_they_contact_you_first: true,
            urgency_present: true,
            asked_to_keep_secret: true,
            asked_for_verification_code: true,
            asked_for_remote_access: false,
            impersonation_type: "bank".into(),
            session_id: None,
        })
        .unwrap();

    assert_eq!(risk.score, 85);
    assert_eq!(risk.level, RiskLevel::High);
    assert!(risk.safe_script.is_none());
    assert!(risk
        .reasons
        .iter()
        .any(|r| r == "Payment method: gift_card (high-risk)"));
}

#[test]
fn inboxguard_text_scenario() {
    let engine = engine();
    let risk = engine.analyze_text("Final notice, verify now", Channel::Sms);

    assert_eq!(risk.level, RiskLevel::High);
    let terms = risk.metadata["detected_terms"].as_array().unwrap();
    assert!(terms.iter().any(|t| t == "verify"));
    assert!(terms.iter().any(|t| t == "final notice"));
}

#[test]
fn inboxguard_url_scenario() {
    let engine = engine();
    let risk = engine.analyze_url("https://bit.ly/example").unwrap();

    assert_eq!(risk.level, RiskLevel::Medium);
    assert_eq!(risk.metadata["url_type"], "shortened");
}

#[test]
fn identitywatch_scenario() {
    let engine = engine();
    let profile = engine
        .create_profile(ProfileRequest {
            emails: vec!["ruth@example.com".into()],
            phones: vec!["555-010-2030".into()],
            full_name: None,
            state: None,
        })
        .unwrap();

    let mut signals = HashMap::new();
    signals.insert("account_opened".to_string(), true);
    signals.insert("password_reset_unknown".to_string(), true);

    let risk = engine
        .check_identity_risk(&profile.id, &signals)
        .unwrap();
    assert_eq!(risk.level, RiskLevel::High);
    assert!(risk.safe_script.is_none());

    assert!(matches!(
        engine.check_identity_risk("missing", &signals),
        Err(EngineError::NotFound("profile"))
    ));
}

#[test]
fn session_lifecycle_errors() {
    let engine = engine();

    assert!(matches!(
        engine.append_event("ghost", signal("urgency")),
        Err(EngineError::NotFound("session"))
    ));

    let id = engine.start_session(Module::Callguard, "u1".into(), "phone".into(), None);
    assert!(matches!(
        engine.end_session(&id),
        Err(EngineError::PreconditionFailed(_))
    ));

    let last = engine.append_event(&id, signal("bank_impersonation")).unwrap();
    let summary = engine.end_session(&id).unwrap();
    assert_eq!(summary.last_risk.score, last.score);
    assert_eq!(summary.last_risk.reasons, last.reasons);
    assert_eq!(summary.key_takeaways.len(), last.reasons.len().min(3));
}

#[test]
fn ttl_sweep_makes_sessions_unreachable() {
    let store = SessionStore::new(&SessionConfig {
        idle_ttl_hours: 0,
        max_age_hours: 48,
        sweep_interval_secs: 3600,
    });
    let id = store.start(Module::Callguard, "u1".into(), "phone".into(), None);

    // Reachable right up to the sweep.
    assert!(store.get(&id).is_ok());
    assert_eq!(store.sweep_once(), 1);
    assert!(matches!(
        store.get(&id),
        Err(EngineError::NotFound("session"))
    ));
}

#[test]
fn scores_stay_in_bounds_with_many_signals() {
    let engine = engine();
    let id = engine.start_session(Module::Callguard, "u1".into(), "phone".into(), None);
    let mut last = None;
    for key in [
        "urgency",
        "bank_impersonation",
        "government_impersonation",
        "tech_support",
        "remote_access_request",
        "verification_code_request",
        "gift_cards",
        "crypto_payment",
        "threats_or_arrest",
    ] {
        last = Some(engine.append_event(&id, signal(key)).unwrap());
    }
    let risk = last.unwrap();
    assert_eq!(risk.score, 100);
    assert_eq!(risk.level, RiskLevel::High);
}

#[test]
fn unknown_signals_are_ignored_but_recorded() {
    let engine = engine();
    let id = engine.start_session(Module::Callguard, "u1".into(), "phone".into(), None);
    let risk = engine.append_event(&id, signal("made_up_signal")).unwrap();
    assert_eq!(risk.score, 0);
    let unknown = risk.metadata["unrecognized_signals"].as_array().unwrap();
    assert_eq!(unknown.len(), 1);
}
