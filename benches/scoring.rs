//! Scoring benchmark: the policies are pure string/arithmetic work and sit on
//! the request hot path, so regressions show up directly in latency.

use std::collections::{BTreeSet, HashMap};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use guardian_engine::risk::inboxguard::{analyze_text, Channel};
use guardian_engine::risk::moneyguard::{assess, PaymentRequest};
use guardian_engine::risk::{identitywatch, policy_for, Module};

fn bench_callguard_session_scoring(c: &mut Criterion) {
    let signals: BTreeSet<String> = [
        "urgency",
        "bank_impersonation",
        "verification_code_request",
        "gift_cards",
        "caller_id_mismatch",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let policy = policy_for(Module::Callguard);

    c.bench_function("callguard_evaluate_5_signals", |b| {
        b.iter(|| black_box(policy.evaluate(black_box(&signals))))
    });
}

fn bench_moneyguard_assess(c: &mut Criterion) {
    let req = PaymentRequest {
        amount: 950.0,
        payment_method: "gift_card".to_string(),
        recipient: "caller".to_string(),
        reason: "unpaid fees".to_string(),
        did_they_contact_you_first: true,
        urgency_present: true,
        asked_to_keep_secret: true,
        asked_for_verification_code: true,
        asked_for_remote_access: false,
        impersonation_type: "bank".to_string(),
        session_id: None,
    };

    c.bench_function("moneyguard_assess", |b| {
        b.iter(|| black_box(assess(black_box(&req)).unwrap()))
    });
}

fn bench_inboxguard_text_scan(c: &mut Criterion) {
    let text = "Final notice: your account will be closed today. Verify now at \
                https://secure-login-update.example.com or pay the processing fee \
                with a gift card immediately.";

    c.bench_function("inboxguard_analyze_text", |b| {
        b.iter(|| black_box(analyze_text(black_box(text), Channel::Sms)))
    });
}

fn bench_identitywatch_check(c: &mut Criterion) {
    let signals: HashMap<String, bool> = [
        ("account_opened", true),
        ("password_reset_unknown", true),
        ("reused_passwords", false),
        ("clicked_suspicious_link", true),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), *v))
    .collect();

    c.bench_function("identitywatch_check", |b| {
        b.iter(|| black_box(identitywatch::check(black_box(&signals))))
    });
}

criterion_group!(
    benches,
    bench_callguard_session_scoring,
    bench_moneyguard_assess,
    bench_inboxguard_text_scan,
    bench_identitywatch_check
);
criterion_main!(benches);
