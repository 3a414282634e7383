//! Per-channel signal catalogs: known signal keys, fixed weights, reason labels.
//! Signals are defined here at compile time and never created at runtime.
//! Catalog order is load-bearing: reasons are emitted in catalog order and the
//! highest-weight tie-break picks the earlier entry.

/// One known signal for a channel.
#[derive(Debug, Clone, Copy)]
pub struct SignalDef {
    pub key: &'static str,
    /// Fixed contribution to the risk score, 0–100.
    pub weight: u8,
    /// Human-readable fragment used in reason text.
    pub label: &'static str,
    /// Marks the designated high-risk subset (compound bonuses key off this).
    pub high_risk: bool,
}

const fn sig(key: &'static str, weight: u8, label: &'static str) -> SignalDef {
    SignalDef {
        key,
        weight,
        label,
        high_risk: false,
    }
}

const fn sig_hr(key: &'static str, weight: u8, label: &'static str) -> SignalDef {
    SignalDef {
        key,
        weight,
        label,
        high_risk: true,
    }
}

/// Live phone-call signals.
pub const CALLGUARD: &[SignalDef] = &[
    sig("urgency", 10, "urgency or pressure"),
    sig("bank_impersonation", 25, "bank impersonation"),
    sig("government_impersonation", 25, "government impersonation"),
    sig("tech_support", 20, "tech support pitch"),
    sig_hr("remote_access_request", 30, "remote access request"),
    sig_hr("verification_code_request", 70, "verification code request"),
    sig_hr("gift_cards", 30, "gift card payment request"),
    sig_hr("crypto_payment", 30, "crypto payment request"),
    sig("threats_or_arrest", 25, "threats or arrest claims"),
    sig("too_good_to_be_true", 15, "too-good-to-be-true offer"),
    sig("asks_to_keep_secret", 15, "request to keep it secret"),
    sig("caller_id_mismatch", 20, "caller ID mismatch"),
    sig_hr("grandparent_scam", 30, "grandparent scam pattern"),
    sig_hr("family_emergency_scam", 30, "family emergency scam pattern"),
    sig("medicare_scam", 25, "Medicare scam pattern"),
    sig("health_insurance_scam", 25, "health insurance scam pattern"),
    sig("romance_scam", 25, "romance scam pattern"),
    sig_hr("lottery_scam", 30, "lottery scam pattern"),
    sig_hr("sweepstakes_scam", 30, "sweepstakes scam pattern"),
    sig("investment_scam", 28, "investment scam pattern"),
    sig("charity_scam", 20, "charity scam pattern"),
    sig("disaster_relief_scam", 20, "disaster relief scam pattern"),
    sig("contractor_scam", 25, "contractor scam pattern"),
    sig("home_repair_scam", 25, "home repair scam pattern"),
    sig("upfront_payment_request", 25, "upfront payment request"),
    sig("wont_meet_in_person", 20, "refusal to meet in person"),
    sig("refuses_video_chat", 15, "refusal to video chat"),
];

/// Payment-request red flags. Also used when a MoneyGuard session accumulates
/// flags as signal events.
pub const MONEYGUARD: &[SignalDef] = &[
    sig_hr(
        "asked_for_verification_code",
        20,
        "They asked for a verification code.",
    ),
    sig_hr(
        "asked_for_remote_access",
        18,
        "They asked for remote access.",
    ),
    sig(
        "asked_to_keep_secret",
        10,
        "They asked you to keep it secret.",
    ),
    sig("urgency_present", 8, "They created urgency or pressure."),
    sig(
        "did_they_contact_you_first",
        5,
        "They contacted you first.",
    ),
];

/// Message/link term categories. The key doubles as the session signal key;
/// the matching vocabulary lives in the inboxguard policy.
pub const INBOXGUARD: &[SignalDef] = &[
    sig("urgency_language", 25, "Urgency language detected"),
    sig("payment_request", 20, "Payment request detected"),
    sig_hr("verification_request", 30, "Verification code request detected"),
    sig("attachment_mention", 10, "Attachment mentioned"),
    sig("impersonation_entity", 20, "Impersonation terms detected"),
    sig("grandparent_scam", 25, "Grandparent/Family emergency scam indicators detected"),
    sig("romance_scam", 23, "Romance scam indicators detected"),
    sig_hr("lottery_scam", 28, "Lottery/Sweepstakes scam indicators detected"),
    sig("investment_scam", 25, "Investment scam indicators detected"),
    sig("charity_scam", 20, "Charity scam indicators detected"),
    sig("contractor_scam", 22, "Contractor scam indicators detected"),
    sig("medicare_scam", 24, "Medicare scam indicators detected"),
];

/// Identity-compromise signals. The high-risk subset drives the
/// multiple-signal bonus.
pub const IDENTITYWATCH: &[SignalDef] = &[
    sig_hr("account_opened", 40, "account opened"),
    sig_hr("suspicious_inquiry", 40, "suspicious inquiry"),
    sig_hr("password_reset_unknown", 25, "password reset unknown"),
    sig_hr(
        "ssn_requested_unexpectedly",
        25,
        "ssn requested unexpectedly",
    ),
    sig("clicked_suspicious_link", 20, "clicked suspicious link"),
    sig("reused_passwords", 15, "reused passwords"),
];

/// Look up a signal by key within one channel catalog.
pub fn find(catalog: &'static [SignalDef], key: &str) -> Option<&'static SignalDef> {
    catalog.iter().find(|def| def.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_in_range() {
        for catalog in [CALLGUARD, MONEYGUARD, INBOXGUARD, IDENTITYWATCH] {
            for def in catalog {
                assert!(def.weight <= 100, "{} out of range", def.key);
            }
        }
    }

    #[test]
    fn keys_unique_per_catalog() {
        for catalog in [CALLGUARD, MONEYGUARD, INBOXGUARD, IDENTITYWATCH] {
            let mut keys: Vec<_> = catalog.iter().map(|d| d.key).collect();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), catalog.len());
        }
    }
}
