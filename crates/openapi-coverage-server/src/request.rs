//! Normalization of loosely shaped request bodies.
//!
//! Callers send the same inputs under several spellings, sometimes wrapped in an
//! `arguments` or `input` object, and sometimes with numbers encoded as strings.
//! Everything is folded into the library's request types here so the handlers
//! never look at raw JSON.

use openapi_coverage::{Error, MatrixRequest};
use serde_json::{Map, Value};
use tracing::debug;

const USER_REQUEST_KEYS: [&str; 4] = ["user_request", "request", "text", "prompt"];
const SPEC_URL_KEYS: [&str; 3] = ["spec_url", "specUrl", "url"];
const MAX_CAPABILITIES_KEYS: [&str; 2] = ["max_capabilities", "maxCapabilities"];
const MAX_EVIDENCE_KEYS: [&str; 2] = ["max_evidence_per_capability", "maxEvidencePerCapability"];
const WRAPPER_KEYS: [&str; 2] = ["arguments", "input"];

/// Parse a raw body; empty or malformed bodies become `Value::Null`
pub fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "Request body is not valid JSON");
        Value::Null
    })
}

/// Build a capability-matrix request from a body
pub fn matrix_request(body: &Value) -> Result<MatrixRequest, Error> {
    let Some(fields) = fields(body) else {
        return Err(Error::missing_request());
    };
    let user_request = string_field(fields, &USER_REQUEST_KEYS).ok_or_else(Error::missing_request)?;

    Ok(MatrixRequest {
        user_request,
        spec_url: string_field(fields, &SPEC_URL_KEYS),
        max_capabilities: integer_field(fields, &MAX_CAPABILITIES_KEYS),
        max_evidence_per_capability: integer_field(fields, &MAX_EVIDENCE_KEYS),
    })
}

/// The spec location of a surface-map request
pub fn surface_spec_url(body: &Value) -> Result<String, Error> {
    fields(body)
        .and_then(|fields| string_field(fields, &SPEC_URL_KEYS))
        .ok_or_else(Error::missing_spec_url)
}

/// The object holding the request fields, unwrapping one level of wrapper
fn fields(body: &Value) -> Option<&Map<String, Value>> {
    let object = body.as_object()?;
    let wrapped = WRAPPER_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_object));
    Some(wrapped.unwrap_or(object))
}

/// First non-blank string stored under any of `keys`
fn string_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// First integer stored under any of `keys`, accepting numeric strings
fn integer_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find_map(|value| match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64)),
            Value::String(text) => text
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| text.trim().parse::<f64>().ok().map(|f| f as i64)),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_body() {
        let request = matrix_request(&json!({
            "user_request": "Create customers",
            "spec_url": "https://x.com/openapi.json",
            "max_capabilities": 10,
            "max_evidence_per_capability": 2
        }))
        .unwrap();

        assert_eq!(
            request,
            MatrixRequest::builder()
                .user_request("Create customers")
                .spec_url("https://x.com/openapi.json")
                .max_capabilities(10)
                .max_evidence_per_capability(2)
                .build()
        );
    }

    #[test]
    fn test_aliases_inside_wrapper() {
        let request = matrix_request(&json!({
            "arguments": {
                "prompt": "  Sync invoices  ",
                "specUrl": "https://x.com/swagger.yaml",
                "maxCapabilities": "12",
                "maxEvidencePerCapability": 4.0
            }
        }))
        .unwrap();

        assert_eq!(request.user_request, "Sync invoices");
        assert_eq!(request.spec_url.as_deref(), Some("https://x.com/swagger.yaml"));
        assert_eq!(request.max_capabilities, Some(12));
        assert_eq!(request.max_evidence_per_capability, Some(4));
    }

    #[test]
    fn test_unusable_numbers_fall_back_to_defaults() {
        let request = matrix_request(&json!({
            "text": "List orders",
            "max_capabilities": "lots",
            "max_evidence_per_capability": null
        }))
        .unwrap();

        assert_eq!(request.max_capabilities, None);
        assert_eq!(request.max_evidence_per_capability, None);
    }

    #[test]
    fn test_missing_request_text() {
        for body in [json!(null), json!({}), json!({ "user_request": "   " }), json!([1, 2])] {
            let error = matrix_request(&body).unwrap_err();
            assert!(matches!(error, Error::InvalidInput { .. }), "{body}");
        }
    }

    #[test]
    fn test_surface_spec_url() {
        assert_eq!(
            surface_spec_url(&json!({ "input": { "url": "https://x.com/openapi.json" } })).unwrap(),
            "https://x.com/openapi.json"
        );
        assert!(surface_spec_url(&json!({ "spec_url": "" })).is_err());
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(b"  \n"), Value::Null);
        assert_eq!(parse_body(b"{not json"), Value::Null);
        assert_eq!(parse_body(br#"{"text":"x"}"#), json!({ "text": "x" }));
    }
}
