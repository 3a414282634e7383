//! Inbound message and link analysis: case-insensitive vocabulary scans with
//! per-channel weighting, and URL classification against a shortener list
//! plus structural heuristics. Both entry points are one-shot; no session
//! state is shared.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use url::Url;

use super::{
    scan_signals, RawVerdict, RecommendedAction, RiskResponse, SessionPolicy,
};
use crate::catalog;
use crate::error::EngineError;

/// Flat addition once any embedded URL trips a heuristic.
const SUSPICIOUS_URL_WEIGHT: u32 = 15;

/// A shortened link hides its destination, which cannot be verified before
/// clicking.
const SHORTENED_URL_WEIGHT: u32 = 45;
const IP_URL_WEIGHT: u32 = 40;

const URL_SHORTENERS: &[&str] = &["bit.ly", "tinyurl.com", "t.co", "goo.gl", "ow.ly"];

const URGENCY_TERMS: &[&str] = &[
    "immediately", "final notice", "today", "urgent", "asap", "emergency", "act now",
    "limited time",
];
const PAYMENT_TERMS: &[&str] = &[
    "gift card", "wire", "crypto", "payment", "invoice", "western union", "moneygram",
    "bitcoin", "ethereum",
];
const VERIFICATION_TERMS: &[&str] = &[
    "code", "otp", "verification", "verify", "one-time code", "verification code",
];
const ATTACHMENT_TERMS: &[&str] = &["attachment"];
const IMPERSONATION_TERMS: &[&str] = &[
    "irs", "usps", "fedex", "bank", "paypal", "microsoft", "medicare", "social security",
    "ssa", "treasury", "fbi", "police", "sheriff",
];
const GRANDPARENT_TERMS: &[&str] = &[
    "grandchild", "grandson", "granddaughter", "in jail", "hospital", "car accident",
    "bail money", "lawyer", "attorney",
];
const ROMANCE_TERMS: &[&str] = &[
    "my love", "sweetheart", "darling", "emergency money", "travel expenses", "visa fees",
    "customs", "stranded",
];
const LOTTERY_TERMS: &[&str] = &[
    "you've won", "prize winner", "lottery", "sweepstakes", "jackpot", "claim your prize",
    "processing fee", "tax payment", "upfront payment",
];
const INVESTMENT_TERMS: &[&str] = &[
    "guaranteed return", "risk-free", "once in a lifetime", "exclusive opportunity",
    "limited offer", "act fast", "get rich quick",
];
const CHARITY_TERMS: &[&str] = &[
    "disaster relief", "hurricane", "flood", "wildfire", "donate now", "help victims",
    "urgent donation", "crisis fund",
];
const CONTRACTOR_TERMS: &[&str] = &[
    "damage inspection", "roof repair", "driveway", "siding", "cash discount", "today only",
    "leftover materials",
];
const MEDICARE_TERMS: &[&str] = &[
    "medicare number", "benefits verification", "new card", "medicare id", "coverage issue",
];

fn vocabulary(category_key: &str) -> &'static [&'static str] {
    match category_key {
        "urgency_language" => URGENCY_TERMS,
        "payment_request" => PAYMENT_TERMS,
        "verification_request" => VERIFICATION_TERMS,
        "attachment_mention" => ATTACHMENT_TERMS,
        "impersonation_entity" => IMPERSONATION_TERMS,
        "grandparent_scam" => GRANDPARENT_TERMS,
        "romance_scam" => ROMANCE_TERMS,
        "lottery_scam" => LOTTERY_TERMS,
        "investment_scam" => INVESTMENT_TERMS,
        "charity_scam" => CHARITY_TERMS,
        "contractor_scam" => CONTRACTOR_TERMS,
        "medicare_scam" => MEDICARE_TERMS,
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
    Other,
}

impl Channel {
    /// SMS carries the least sender context, so it is weighted highest.
    /// Expressed in percent to keep scoring integral.
    fn weight_pct(&self) -> u32 {
        match self {
            Channel::Sms => 130,
            Channel::Whatsapp => 115,
            Channel::Email | Channel::Other => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
            Channel::Whatsapp => "whatsapp",
            Channel::Other => "other",
        }
    }
}

pub fn analyze_text(text: &str, channel: Channel) -> RiskResponse {
    let lower = text.to_lowercase();

    let mut term_score: u32 = 0;
    let mut reasons: Vec<String> = Vec::new();
    let mut detected_terms: Vec<String> = Vec::new();

    for def in catalog::INBOXGUARD {
        let matched: Vec<&str> = vocabulary(def.key)
            .iter()
            .copied()
            .filter(|term| lower.contains(term))
            .collect();
        if !matched.is_empty() {
            term_score += u32::from(def.weight);
            reasons.push(def.label.to_string());
            detected_terms.extend(matched.iter().map(|t| t.to_string()));
        }
    }

    // Channel weighting scales the vocabulary score; URL findings are added
    // afterwards at a flat weight.
    let mut score = term_score * channel.weight_pct() / 100;

    let extracted_urls = extract_urls(text);
    let mut url_flags: Vec<String> = Vec::new();
    for raw in &extracted_urls {
        if let Ok(parsed) = Url::parse(raw) {
            url_flags.extend(heuristic_flags(&parsed, true));
        }
    }
    if !url_flags.is_empty() {
        score += SUSPICIOUS_URL_WEIGHT;
        reasons.push("Suspicious URLs detected".to_string());
    }

    if reasons.is_empty() {
        reasons.push("No obvious red flags detected.".to_string());
    }

    let mut metadata = Map::new();
    metadata.insert("detected_terms".into(), json!(detected_terms));
    metadata.insert("extracted_urls".into(), json!(extracted_urls));
    metadata.insert("channel".into(), json!(channel.as_str()));

    RawVerdict {
        score,
        reasons,
        next_action: "Avoid responding until you verify the sender through official channels."
            .to_string(),
        recommended_actions: text_actions(),
        safe_script: None,
        metadata,
    }
    .into_response()
}

pub fn analyze_url(raw: &str) -> Result<RiskResponse, EngineError> {
    let parsed = Url::parse(raw)
        .map_err(|e| EngineError::validation("url", format!("not a valid URL: {}", e)))?;
    let domain = parsed
        .host_str()
        .ok_or_else(|| EngineError::validation("url", "no host in URL"))?
        .to_lowercase();

    let mut score: u32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    let url_type = classify(&domain);
    match url_type {
        UrlType::Shortened => {
            score += SHORTENED_URL_WEIGHT;
            reasons.push(format!(
                "Shortened link ({}) hides the real destination.",
                domain
            ));
        }
        UrlType::IpAddress => {
            score += IP_URL_WEIGHT;
            reasons.push("IP address used in place of a domain name.".to_string());
        }
        UrlType::Standard => {}
    }

    for flag in heuristic_flags(&parsed, false) {
        score += SUSPICIOUS_URL_WEIGHT;
        reasons.push(flag);
    }

    if reasons.is_empty() {
        reasons.push("No obvious URL red flags detected.".to_string());
    }

    let mut metadata = Map::new();
    metadata.insert("domain".into(), json!(domain));
    metadata.insert("url_type".into(), json!(url_type.as_str()));

    Ok(RawVerdict {
        score,
        reasons,
        next_action: "Avoid clicking. Validate the URL through official channels.".to_string(),
        recommended_actions: url_actions(),
        safe_script: None,
        metadata,
    }
    .into_response())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlType {
    Shortened,
    IpAddress,
    Standard,
}

impl UrlType {
    fn as_str(&self) -> &'static str {
        match self {
            UrlType::Shortened => "shortened",
            UrlType::IpAddress => "ip_address",
            UrlType::Standard => "standard",
        }
    }
}

fn classify(domain: &str) -> UrlType {
    if URL_SHORTENERS.contains(&domain) {
        UrlType::Shortened
    } else if domain
        .split('.')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
    {
        UrlType::IpAddress
    } else {
        UrlType::Standard
    }
}

/// Structural red flags shared by the text and URL analyzers. The URL
/// analyzer classifies shorteners separately, so it opts out of the
/// shortener flag here.
fn heuristic_flags(parsed: &Url, include_shortener: bool) -> Vec<String> {
    let mut flags = Vec::new();
    let Some(domain) = parsed.host_str().map(str::to_lowercase) else {
        return flags;
    };
    let lower = parsed.as_str().to_lowercase();

    if domain.matches('-').count() >= 2 {
        flags.push("Multiple hyphens in domain".to_string());
    }
    if domain.matches('.').count() >= 3 {
        flags.push("Long subdomain chain".to_string());
    }
    if ["login", "verify", "secure", "account", "update"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        flags.push("Contains sensitive action keywords".to_string());
    }
    if domain.contains("xn--") {
        flags.push("Punycode domain detected".to_string());
    }
    if let Some(tld) = domain.rsplit('.').next() {
        if tld.len() > 3 && !tld.chars().all(|c| c.is_ascii_digit()) {
            flags.push("Unusual TLD length".to_string());
        }
    }
    // Shorteners inside message bodies count as a red flag too.
    if include_shortener && URL_SHORTENERS.contains(&domain.as_str()) {
        flags.push("URL shortener used".to_string());
    }
    flags
}

fn extract_urls(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|tok| tok.starts_with("http://") || tok.starts_with("https://"))
        .map(|tok| tok.trim_end_matches([',', '.', ')', ';']).to_string())
        .collect()
}

fn text_actions() -> Vec<RecommendedAction> {
    vec![
        RecommendedAction::new(
            "dont-click",
            "Do not click",
            "Avoid clicking links or opening attachments in the message.",
        ),
        RecommendedAction::new(
            "official-app",
            "Open the official app/site",
            "Navigate to the service using a trusted app or bookmarked site.",
        ),
        RecommendedAction::new(
            "report",
            "Report as junk",
            "Use your carrier or email provider reporting tools.",
        ),
    ]
}

fn url_actions() -> Vec<RecommendedAction> {
    vec![
        RecommendedAction::new(
            "manual",
            "Open manually",
            "Type the known URL into your browser instead of clicking.",
        ),
        RecommendedAction::new(
            "verify-sender",
            "Verify the sender",
            "Confirm the message with the organization using an official contact method.",
        ),
    ]
}

/// Session variant: scores accumulated message-category signal keys.
pub struct InboxGuardSessionPolicy;

impl SessionPolicy for InboxGuardSessionPolicy {
    fn evaluate(&self, signals: &BTreeSet<String>) -> RiskResponse {
        let scan = scan_signals(catalog::INBOXGUARD, signals);

        let reasons: Vec<String> = if scan.matched.is_empty() {
            vec!["No obvious red flags detected.".to_string()]
        } else {
            scan.matched
                .iter()
                .map(|def| def.label.to_string())
                .collect()
        };

        let mut metadata = Map::new();
        metadata.insert(
            "primary_signal".into(),
            json!(scan.top.map_or("none", |def| def.key)),
        );
        if !scan.unrecognized.is_empty() {
            metadata.insert("unrecognized_signals".into(), json!(scan.unrecognized));
        }

        RawVerdict {
            score: scan.total,
            reasons,
            next_action: "Avoid responding until you verify the sender through official channels."
                .to_string(),
            recommended_actions: text_actions(),
            safe_script: None,
            metadata,
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    #[test]
    fn sms_final_notice_is_high() {
        let resp = analyze_text("Final notice, verify now", Channel::Sms);
        assert_eq!(resp.level, RiskLevel::High);
        let terms = resp.metadata["detected_terms"].as_array().unwrap();
        assert!(terms.iter().any(|t| t == "verify"));
        assert!(terms.iter().any(|t| t == "final notice"));
    }

    #[test]
    fn email_is_weighted_below_sms() {
        let sms = analyze_text("Final notice, verify now", Channel::Sms);
        let email = analyze_text("Final notice, verify now", Channel::Email);
        assert!(email.score < sms.score);
        assert_eq!(email.level, RiskLevel::Medium);
    }

    #[test]
    fn benign_text_is_low() {
        let resp = analyze_text("See you at lunch on Sunday", Channel::Email);
        assert_eq!(resp.score, 0);
        assert_eq!(resp.level, RiskLevel::Low);
        assert_eq!(resp.reasons, vec!["No obvious red flags detected."]);
    }

    #[test]
    fn shortener_is_medium() {
        let resp = analyze_url("https://bit.ly/example").unwrap();
        assert_eq!(resp.level, RiskLevel::Medium);
        assert_eq!(resp.metadata["url_type"], "shortened");
    }

    #[test]
    fn plain_domain_is_standard_and_low() {
        let resp = analyze_url("https://example.com/page").unwrap();
        assert_eq!(resp.level, RiskLevel::Low);
        assert_eq!(resp.metadata["url_type"], "standard");
    }

    #[test]
    fn ip_host_classified() {
        let resp = analyze_url("http://192.168.10.1/login").unwrap();
        assert_eq!(resp.metadata["url_type"], "ip_address");
        // IP base plus the sensitive-keyword heuristic.
        assert!(resp.score >= 40);
    }

    #[test]
    fn malformed_url_rejected() {
        assert!(analyze_url("not a url").is_err());
        assert!(analyze_url("mailto:me@example.com").is_err());
    }

    #[test]
    fn embedded_suspicious_url_adds_weight() {
        let with_url = analyze_text("see https://bit.ly/x now", Channel::Email);
        assert!(with_url
            .reasons
            .iter()
            .any(|r| r == "Suspicious URLs detected"));
    }
}
