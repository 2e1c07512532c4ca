//! Error handling for spec loading and analysis requests.
//!
//! Analysis itself never fails: unexpected spec shapes are defaulted and numeric
//! caps are clamped. Errors only arise around the pipeline, when the request is
//! unusable or when the spec document cannot be fetched or parsed.
//!
//! # Error Types
//!
//! ## InvalidInput
//! The request is missing its free-text integration request. Carries an example
//! of a valid request so callers can correct it.
//!
//! Example:
//! ```json
//! {
//!   "error": "Missing required input: user_request must be a non-empty string",
//!   "example": {
//!     "user_request": "We need to create customers and receive order webhooks. Spec: https://api.example.com/openapi.json"
//!   }
//! }
//! ```
//!
//! ## SpecLoad
//! The spec document could not be fetched or parsed. Carries the original error
//! message and the spec location that was attempted; no partial result is produced.
//!
//! Example:
//! ```json
//! {
//!   "error": "Failed to load spec from https://api.example.com/openapi.json: HTTP 404 Not Found",
//!   "spec_url": "https://api.example.com/openapi.json"
//! }
//! ```

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("OpenAPI spec error: {0}")]
    Spec(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Invalid input: {message}")]
    InvalidInput { message: String, example: Value },
    #[error("Failed to load spec from {spec_url}: {message}")]
    SpecLoad { spec_url: String, message: String },
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),
}

impl Error {
    /// Build the error returned when a request carries no usable request text
    pub fn missing_request() -> Self {
        Error::InvalidInput {
            message: "Missing required input: user_request must be a non-empty string"
                .to_string(),
            example: serde_json::json!({
                "user_request": "We need to create customers and receive order webhooks. Spec: https://api.example.com/openapi.json",
                "max_capabilities": 25,
                "max_evidence_per_capability": 3
            }),
        }
    }

    /// Build the error returned when a surface map request carries no spec location
    pub fn missing_spec_url() -> Self {
        Error::InvalidInput {
            message: "Missing required input: spec_url must be a non-empty string".to_string(),
            example: serde_json::json!({
                "spec_url": "https://petstore3.swagger.io/api/v3/openapi.json"
            }),
        }
    }

    /// Build the error returned when a caller-supplied spec location is not an http(s) URL
    pub fn spec_url_not_remote() -> Self {
        Error::InvalidInput {
            message: "spec_url must be an http:// or https:// URL".to_string(),
            example: serde_json::json!({
                "spec_url": "https://petstore3.swagger.io/api/v3/openapi.json"
            }),
        }
    }

    /// Wrap a load failure with the spec location that was attempted
    pub fn spec_load(spec_url: impl Into<String>, source: Error) -> Self {
        match source {
            Error::SpecLoad { .. } => source,
            other => Error::SpecLoad {
                spec_url: spec_url.into(),
                message: other.to_string(),
            },
        }
    }

    /// The spec location attached to this error, if any
    #[must_use]
    pub fn spec_url(&self) -> Option<&str> {
        match self {
            Error::SpecLoad { spec_url, .. } => Some(spec_url),
            _ => None,
        }
    }
}

/// Errors raised while turning command line arguments into a configuration
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid header format in '{header}': expected 'name: value' format")]
    InvalidHeaderFormat { header: String },

    #[error("Invalid header name in '{header}': {source}")]
    InvalidHeaderName {
        header: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },

    #[error("Invalid header value in '{header}': {source}")]
    InvalidHeaderValue {
        header: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },

    #[error("Invalid threshold: partial ({partial}) must not exceed full ({full})")]
    InvalidThresholds { full: f64, partial: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_request_carries_example() {
        let error = Error::missing_request();
        match &error {
            Error::InvalidInput { example, .. } => {
                assert!(example["user_request"].as_str().unwrap().contains("openapi.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(error.to_string().contains("user_request"));
    }

    #[test]
    fn test_spec_load_keeps_original_message() {
        let error = Error::spec_load(
            "https://api.example.com/openapi.json",
            Error::Http("HTTP 404 Not Found".to_string()),
        );

        assert_eq!(error.spec_url(), Some("https://api.example.com/openapi.json"));
        assert!(error.to_string().contains("HTTP 404 Not Found"));
    }

    #[test]
    fn test_spec_load_is_not_wrapped_twice() {
        let inner = Error::spec_load("a.json", Error::InvalidPath("bad".to_string()));
        let outer = Error::spec_load("b.json", inner);
        assert_eq!(outer.spec_url(), Some("a.json"));
    }
}
