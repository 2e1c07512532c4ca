//! Locate an OpenAPI/Swagger document link inside free text.

use regex::Regex;
use std::sync::LazyLock;

/// Bare `http(s)://` links, stopping at whitespace, quotes and closing brackets
pub(crate) static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"'`()\[\]{}]+"#)
        .unwrap_or_else(|err| panic!("invalid URL_REGEX regex: {err}"))
});

/// Return the first URL in `text` that looks like a spec document.
///
/// A URL qualifies when it mentions `openapi` or `swagger`, or ends in `.json`,
/// `.yaml` or `.yml` (case-insensitive). Trailing sentence punctuation is not
/// part of the URL.
#[must_use]
pub fn find_spec_url(text: &str) -> Option<String> {
    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .find(|candidate| looks_like_spec(candidate))
        .map(str::to_string)
}

fn looks_like_spec(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("openapi")
        || lower.contains("swagger")
        || lower.contains("/openapi")
        || lower.contains("/swagger")
        || lower.ends_with(".json")
        || lower.ends_with(".yaml")
        || lower.ends_with(".yml")
}
