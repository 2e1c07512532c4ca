//! Extraction of capability phrases from a free-text integration request.
//!
//! This is a deterministic heuristic, not language understanding: the request is
//! cut into lines, sentences and list items, and every fragment mentioning an
//! action verb becomes a short capability such as "Create customer". The same
//! input always yields the same list.

use indexmap::IndexSet;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::spec_url::URL_REGEX;

pub const DEFAULT_MAX_CAPABILITIES: usize = 25;
pub const MIN_CAPABILITIES: usize = 5;
pub const MAX_CAPABILITIES: usize = 60;

/// Phrases shorter than this are discarded before any other filtering
const MIN_PHRASE_LEN: usize = 6;

/// A fragment must mention one of these to be considered a capability
const ACTION_VERBS: [&str; 25] = [
    "create",
    "add",
    "update",
    "edit",
    "delete",
    "remove",
    "get",
    "fetch",
    "read",
    "retrieve",
    "list",
    "search",
    "sync",
    "import",
    "export",
    "upsert",
    "send",
    "post",
    "upload",
    "receive",
    "listen",
    "subscribe",
    "webhook",
    "event",
    "callback",
];

/// Returned when the request contains no recognizable capability
pub const FALLBACK_CAPABILITIES: [&str; 3] = [
    "Read data from the target system",
    "Write data to the target system",
    "Receive events/webhooks from the target system",
];

static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:[-*+•>#]+|\(?\d+[.)]|\([a-zA-Z]\)|[a-zA-Z]\))\s*)+")
        .unwrap_or_else(|err| panic!("invalid LIST_MARKER_REGEX regex: {err}"))
});

static SENTENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+(?:\s+|$)")
        .unwrap_or_else(|err| panic!("invalid SENTENCE_REGEX regex: {err}"))
});

static SEPARATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[;,•|/]|\band\b|\bor\b")
        .unwrap_or_else(|err| panic!("invalid SEPARATOR_REGEX regex: {err}"))
});

static FILLER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:so that|we (?:can|need to|want to)|can|need to|want to|must)\b\s*")
        .unwrap_or_else(|err| panic!("invalid FILLER_REGEX regex: {err}"))
});

static PARENTHETICAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\([^()]{0,40}\)")
        .unwrap_or_else(|err| panic!("invalid PARENTHETICAL_REGEX regex: {err}"))
});

/// Clamp a caller-supplied capability cap into the supported range
#[must_use]
pub fn clamp_max_capabilities(requested: Option<i64>) -> usize {
    let requested = requested.unwrap_or(DEFAULT_MAX_CAPABILITIES as i64);
    requested.clamp(MIN_CAPABILITIES as i64, MAX_CAPABILITIES as i64) as usize
}

/// Extract at most `max_capabilities` capability phrases from `text`.
///
/// `max_capabilities` is clamped to `[5, 60]`. When nothing qualifies, the
/// three [`FALLBACK_CAPABILITIES`] are returned so that downstream matrices are
/// never empty.
#[must_use]
pub fn extract_capabilities(text: &str, max_capabilities: usize) -> Vec<String> {
    let cap = max_capabilities.clamp(MIN_CAPABILITIES, MAX_CAPABILITIES);
    let without_urls = URL_REGEX.replace_all(text, " ");

    let mut capabilities = IndexSet::new();
    for line in without_urls.lines() {
        let line = LIST_MARKER_REGEX.replace(line, "");
        for sentence in SENTENCE_REGEX.split(&line) {
            for candidate in candidates(sentence) {
                if let Some(capability) = clean_phrase(&candidate) {
                    capabilities.insert(capability);
                }
            }
        }
    }

    if capabilities.is_empty() {
        debug!("No capability phrases found, using fallback capabilities");
        return FALLBACK_CAPABILITIES.iter().map(|s| s.to_string()).collect();
    }

    debug!(
        found = capabilities.len(),
        cap, "Extracted capability phrases"
    );

    capabilities.into_iter().take(cap).collect()
}

/// Candidate phrases of a single sentence, in order.
///
/// The sentence is split on list separators and on "and"/"or". The whole
/// sentence is kept alongside its parts, except when two or more parts already
/// qualify on their own and the whole would only restate them.
fn candidates(sentence: &str) -> Vec<String> {
    let sentence = LIST_MARKER_REGEX.replace(sentence, "");
    let whole = collapse_whitespace(&sentence);

    let parts: Vec<String> = SEPARATOR_REGEX
        .split(&sentence)
        .map(collapse_whitespace)
        .filter(|part| qualifies(part))
        .collect();

    let mut candidates = Vec::with_capacity(parts.len() + 1);
    if parts.len() < 2 && qualifies(&whole) {
        candidates.push(whole);
    }
    candidates.extend(parts);
    candidates
}

fn qualifies(phrase: &str) -> bool {
    if phrase.chars().count() < MIN_PHRASE_LEN {
        return false;
    }
    let lower = phrase.to_lowercase();
    ACTION_VERBS.iter().any(|verb| lower.contains(verb))
}

/// Strip filler and asides, then capitalize; `None` if nothing is left
fn clean_phrase(phrase: &str) -> Option<String> {
    let mut cleaned = PARENTHETICAL_REGEX.replace_all(phrase, "").into_owned();

    loop {
        let trimmed = cleaned.trim_start();
        let stripped = FILLER_REGEX.replace(trimmed, "");
        if stripped.len() == trimmed.len() {
            break;
        }
        cleaned = stripped.into_owned();
    }

    let cleaned = collapse_whitespace(&cleaned);
    let cleaned = cleaned
        .trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '"' | '\''))
        .trim();

    let mut chars = cleaned.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
