//! Risk evaluation core: shared verdict types, the score→tier mapping, the
//! signal-set scoring skeleton, and the per-channel session policy table.

pub mod callguard;
pub mod identitywatch;
pub mod inboxguard;
pub mod moneyguard;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::SignalDef;

/// Score below this is low risk.
pub const MEDIUM_BREAKPOINT: u8 = 34;
/// Score at or above this is high risk.
pub const HIGH_BREAKPOINT: u8 = 67;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Deterministic, monotonic tier mapping. 33→low, 34→medium, 66→medium,
    /// 67→high; golden-response tests depend on these exact breakpoints.
    pub fn from_score(score: u8) -> Self {
        if score >= HIGH_BREAKPOINT {
            RiskLevel::High
        } else if score >= MEDIUM_BREAKPOINT {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// The channel a session or assessment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Callguard,
    Moneyguard,
    Inboxguard,
    Identitywatch,
}

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Callguard => "callguard",
            Module::Moneyguard => "moneyguard",
            Module::Inboxguard => "inboxguard",
            Module::Identitywatch => "identitywatch",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub id: String,
    pub title: String,
    pub detail: String,
}

impl RecommendedAction {
    pub fn new(id: &str, title: &str, detail: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Pre-written refusal line plus fallback for live interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeScript {
    pub say_this: String,
    pub if_they_push_back: String,
}

impl SafeScript {
    pub fn new(say_this: &str, if_they_push_back: &str) -> Self {
        Self {
            say_this: say_this.to_string(),
            if_they_push_back: if_they_push_back.to_string(),
        }
    }
}

/// The uniform output envelope. Immutable once built; a recompute replaces
/// the whole value. `safe_script` serializes as `null` when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResponse {
    pub score: u8,
    pub level: RiskLevel,
    pub reasons: Vec<String>,
    pub next_action: String,
    pub recommended_actions: Vec<RecommendedAction>,
    pub safe_script: Option<SafeScript>,
    pub metadata: Map<String, Value>,
}

/// Raw findings from a scoring policy before clamping and tier mapping.
#[derive(Debug, Clone)]
pub struct RawVerdict {
    pub score: u32,
    pub reasons: Vec<String>,
    pub next_action: String,
    pub recommended_actions: Vec<RecommendedAction>,
    pub safe_script: Option<SafeScript>,
    pub metadata: Map<String, Value>,
}

impl RawVerdict {
    /// Assemble the output envelope: clamp to [0, 100] and derive the tier.
    pub fn into_response(self) -> RiskResponse {
        let score = clamp_score(self.score);
        RiskResponse {
            score,
            level: RiskLevel::from_score(score),
            reasons: self.reasons,
            next_action: self.next_action,
            recommended_actions: self.recommended_actions,
            safe_script: self.safe_script,
            metadata: self.metadata,
        }
    }
}

pub fn clamp_score(score: u32) -> u8 {
    score.min(100) as u8
}

/// Result of matching an observed signal-key set against a channel catalog.
pub struct SignalScan {
    pub matched: Vec<&'static SignalDef>,
    /// Keys not in the catalog: ignored for scoring, kept for observability.
    pub unrecognized: Vec<String>,
    /// Highest-weighted match; ties go to the earlier catalog entry.
    pub top: Option<&'static SignalDef>,
    pub total: u32,
}

/// Shared skeleton step: walk the catalog in order, add the weight of every
/// signal present in `keys`. Duplicates cannot double-count because the input
/// is a set.
pub fn scan_signals(catalog: &'static [SignalDef], keys: &BTreeSet<String>) -> SignalScan {
    let mut matched = Vec::new();
    let mut top: Option<&'static SignalDef> = None;
    let mut total: u32 = 0;

    for def in catalog {
        if keys.contains(def.key) {
            total += u32::from(def.weight);
            if top.map_or(true, |t| def.weight > t.weight) {
                top = Some(def);
            }
            matched.push(def);
        }
    }

    let unrecognized = keys
        .iter()
        .filter(|k| catalog.iter().all(|def| def.key != k.as_str()))
        .cloned()
        .collect();

    SignalScan {
        matched,
        unrecognized,
        top,
        total,
    }
}

/// Scores a session's accumulated signal-key set. One implementation per
/// channel; the facade dispatches through [`policy_for`], so adding a channel
/// does not touch session plumbing.
pub trait SessionPolicy: Send + Sync {
    fn evaluate(&self, signals: &BTreeSet<String>) -> RiskResponse;
}

/// Policy lookup table keyed by module.
pub fn policy_for(module: Module) -> &'static dyn SessionPolicy {
    match module {
        Module::Callguard => &callguard::CallGuardPolicy,
        Module::Moneyguard => &moneyguard::MoneyGuardSessionPolicy,
        Module::Inboxguard => &inboxguard::InboxGuardSessionPolicy,
        Module::Identitywatch => &identitywatch::IdentityWatchSessionPolicy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn breakpoints_exact() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(33), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(34), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(66), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(67), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_score(0), 0);
        assert_eq!(clamp_score(100), 100);
        assert_eq!(clamp_score(250), 100);
    }

    #[test]
    fn scan_ignores_unknown_keys() {
        let keys: BTreeSet<String> = ["urgency", "not_a_signal"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let scan = scan_signals(catalog::CALLGUARD, &keys);
        assert_eq!(scan.total, 10);
        assert_eq!(scan.unrecognized, vec!["not_a_signal".to_string()]);
        assert_eq!(scan.top.unwrap().key, "urgency");
    }

    #[test]
    fn scan_tie_break_prefers_catalog_order() {
        // bank_impersonation and government_impersonation both weigh 25;
        // bank comes first in the catalog.
        let keys: BTreeSet<String> = ["government_impersonation", "bank_impersonation"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let scan = scan_signals(catalog::CALLGUARD, &keys);
        assert_eq!(scan.top.unwrap().key, "bank_impersonation");
    }
}
