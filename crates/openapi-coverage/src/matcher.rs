//! Scoring of a capability phrase against an endpoint inventory.
//!
//! Confidence is the share of capability tokens found in an endpoint's
//! `"<METHOD> <path> <purpose>"` text, plus fixed bonuses when the endpoint's
//! method fits the capability's verb and when both sides talk about webhooks or
//! searching. Scores are clamped to `[0, 1]`.

use bon::Builder;
use serde::Serialize;

use crate::spec::{Endpoint, HttpMethod};

pub const DEFAULT_MAX_EVIDENCE: usize = 3;
pub const MIN_EVIDENCE: usize = 1;
pub const MAX_EVIDENCE: usize = 10;

/// At most this many matched tokens are listed in an evidence reason
const MAX_REASON_KEYWORDS: usize = 6;

const STOPWORDS: [&str; 37] = [
    "a",
    "an",
    "the",
    "we",
    "want",
    "to",
    "and",
    "or",
    "of",
    "for",
    "with",
    "into",
    "our",
    "system",
    "tool",
    "platform",
    "integrate",
    "integration",
    "support",
    "must",
    "should",
    "can",
    "need",
    "needed",
    "required",
    "able",
    "allow",
    "via",
    "using",
    "based",
    "on",
    "from",
    "in",
    "at",
    "as",
    "by",
    "be",
];

const WEBHOOK_CAPABILITY_TERMS: [&str; 3] = ["webhook", "event", "callback"];
const WEBHOOK_ENDPOINT_TERMS: [&str; 4] = ["webhook", "event", "callback", "hook"];
const SEARCH_TERMS: [&str; 4] = ["search", "query", "find", "list"];

/// Keyword rules mapping a capability to the HTTP methods that usually serve it.
/// The first rule with a matching keyword wins.
const METHOD_RULES: [(&[&str], &[HttpMethod]); 5] = [
    (&["delete", "remove"], &[HttpMethod::Delete]),
    (&["update", "edit"], &[HttpMethod::Put, HttpMethod::Patch]),
    (
        &["create", "add", "upload", "send", "post"],
        &[HttpMethod::Post],
    ),
    (
        &["list", "get", "fetch", "read", "retrieve", "search"],
        &[HttpMethod::Get],
    ),
    (
        &["webhook", "event", "callback", "receive", "listen"],
        &[HttpMethod::Post, HttpMethod::Get],
    ),
];

/// Tunable weights and thresholds of the confidence function
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct ScoringWeights {
    /// Added when the endpoint's method is one the capability's verb prefers
    #[builder(default = 0.15)]
    pub method_bonus: f64,
    /// Added when both sides mention webhooks, events or callbacks
    #[builder(default = 0.25)]
    pub webhook_bonus: f64,
    /// Added when both sides mention searching, querying or listing
    #[builder(default = 0.15)]
    pub search_bonus: f64,
    /// Best confidence at or above which a capability is fully covered
    #[builder(default = 0.75)]
    pub full_threshold: f64,
    /// Best confidence at or above which a capability is partially covered
    #[builder(default = 0.45)]
    pub partial_threshold: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    Full,
    Partial,
    Missing,
}

impl Coverage {
    /// Classify a capability from the best confidence any endpoint reached
    #[must_use]
    pub fn from_confidence(confidence: f64, weights: &ScoringWeights) -> Self {
        if confidence >= weights.full_threshold {
            Coverage::Full
        } else if confidence >= weights.partial_threshold {
            Coverage::Partial
        } else {
            Coverage::Missing
        }
    }
}

/// One endpoint cited as support for a capability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    pub method: HttpMethod,
    pub path: String,
    pub purpose: String,
    pub confidence: f64,
    pub reason: String,
}

/// Ranked evidence for a single capability
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityMatch {
    /// Unrounded best confidence, `0.0` when there are no endpoints
    pub best_confidence: f64,
    pub coverage: Coverage,
    pub evidence: Vec<Evidence>,
}

/// Clamp a caller-supplied evidence cap into the supported range
#[must_use]
pub fn clamp_max_evidence(requested: Option<i64>) -> usize {
    let requested = requested.unwrap_or(DEFAULT_MAX_EVIDENCE as i64);
    requested.clamp(MIN_EVIDENCE as i64, MAX_EVIDENCE as i64) as usize
}

/// Round to two decimal places
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Lower-cased content tokens of a capability, stopwords removed
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// HTTP methods a capability most likely maps to, empty when undecided
#[must_use]
pub fn preferred_methods(capability: &str) -> &'static [HttpMethod] {
    let lower = capability.to_lowercase();
    METHOD_RULES
        .iter()
        .find(|(keywords, _)| contains_any(&lower, keywords))
        .map(|(_, methods)| *methods)
        .unwrap_or(&[])
}

/// Scores every endpoint against capabilities with a fixed set of weights
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    weights: ScoringWeights,
}

struct Scored<'a> {
    endpoint: &'a Endpoint,
    confidence: f64,
    reason: String,
}

impl Matcher {
    #[must_use]
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank `endpoints` for `capability` and keep the best `max_evidence`.
    ///
    /// Ties keep the original endpoint order.
    #[must_use]
    pub fn match_capability(
        &self,
        capability: &str,
        endpoints: &[Endpoint],
        max_evidence: usize,
    ) -> CapabilityMatch {
        let max_evidence = max_evidence.clamp(MIN_EVIDENCE, MAX_EVIDENCE);
        let tokens = tokenize(capability);
        let methods = preferred_methods(capability);
        let lower = capability.to_lowercase();
        let wants_webhook = contains_any(&lower, &WEBHOOK_CAPABILITY_TERMS);
        let wants_search = contains_any(&lower, &SEARCH_TERMS);

        let mut scored: Vec<Scored<'_>> = endpoints
            .iter()
            .map(|endpoint| {
                self.score_endpoint(endpoint, &tokens, methods, wants_webhook, wants_search)
            })
            .collect();

        // `sort_by` is stable, equal scores keep endpoint order
        scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let best_confidence = scored.first().map_or(0.0, |s| s.confidence);
        let evidence = scored
            .into_iter()
            .take(max_evidence)
            .map(|s| Evidence {
                method: s.endpoint.method,
                path: s.endpoint.path.clone(),
                purpose: s.endpoint.purpose.clone(),
                confidence: round2(s.confidence),
                reason: s.reason,
            })
            .collect();

        CapabilityMatch {
            best_confidence,
            coverage: Coverage::from_confidence(best_confidence, &self.weights),
            evidence,
        }
    }

    fn score_endpoint<'a>(
        &self,
        endpoint: &'a Endpoint,
        tokens: &[String],
        methods: &[HttpMethod],
        wants_webhook: bool,
        wants_search: bool,
    ) -> Scored<'a> {
        let text = endpoint.search_text();
        let hits: Vec<&str> = tokens
            .iter()
            .filter(|token| text.contains(token.as_str()))
            .map(String::as_str)
            .collect();

        let mut confidence = if tokens.is_empty() {
            0.0
        } else {
            hits.len() as f64 / tokens.len() as f64
        };

        let method_aligns = methods.contains(&endpoint.method);
        if method_aligns {
            confidence += self.weights.method_bonus;
        }

        let webhook_signal = contains_any(&text, &WEBHOOK_ENDPOINT_TERMS);
        if wants_webhook && webhook_signal {
            confidence += self.weights.webhook_bonus;
        }

        if wants_search && contains_any(&text, &SEARCH_TERMS) {
            confidence += self.weights.search_bonus;
        }

        let mut reasons = Vec::new();
        if method_aligns {
            reasons.push("method aligns".to_string());
        }
        if !hits.is_empty() {
            let keywords: Vec<&str> = hits.iter().take(MAX_REASON_KEYWORDS).copied().collect();
            reasons.push(format!("keyword hits: {}", keywords.join(", ")));
        }
        if webhook_signal {
            reasons.push("webhook/event signal".to_string());
        }
        let reason = if reasons.is_empty() {
            "semantic keyword match".to_string()
        } else {
            reasons.join("; ")
        };

        Scored {
            endpoint,
            confidence: confidence.clamp(0.0, 1.0),
            reason,
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}
