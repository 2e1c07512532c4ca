//! Normalization of a parsed OpenAPI-like document into a flat endpoint inventory.
//!
//! The document is handled as a loose [`serde_json::Value`] rather than a typed
//! OpenAPI model: specs found in the wild are frequently incomplete, and every
//! missing or oddly shaped section defaults to an empty collection instead of
//! failing the whole analysis.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Purpose shown in the surface map for operations with no summary or description
pub const NO_DESCRIPTION: &str = "No description";

/// HTTP methods recognized as operations inside a path item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

/// Method order used by the surface map
pub const SURFACE_METHODS: [HttpMethod; 5] = [
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Delete,
];

/// Method order used by the capability matrix
pub const MATRIX_METHODS: [HttpMethod; 7] = [
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Delete,
    HttpMethod::Head,
    HttpMethod::Options,
];

impl HttpMethod {
    /// Upper-case method name as used on the wire
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Lower-case key under which the operation appears in a path item
    fn path_item_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an operation requires authentication.
///
/// Absence of a `security` block does not mean the operation is public, so the
/// unknown state is kept distinct from an explicit "no auth".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthRequirement {
    Required,
    NotRequired,
    #[default]
    Unknown,
}

impl AuthRequirement {
    fn as_option(&self) -> Option<bool> {
        match self {
            AuthRequirement::Required => Some(true),
            AuthRequirement::NotRequired => Some(false),
            AuthRequirement::Unknown => None,
        }
    }
}

impl Serialize for AuthRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
    pub purpose: String,
    pub auth_required: AuthRequirement,
    /// Always empty, OAuth scopes are not resolved
    pub scopes: Vec<String>,
}

impl Endpoint {
    /// Lower-cased `"<METHOD> <path> <purpose>"` text the matcher searches in
    #[must_use]
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.method, self.path, self.purpose).to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthScheme {
    pub name: String,
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(rename = "in")]
    pub location: Option<String>,
    pub scheme: Option<String>,
    #[serde(rename = "bearerFormat")]
    pub bearer_format: Option<String>,
    pub flows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiInfo {
    pub title: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthSummary {
    pub schemes: Vec<AuthScheme>,
    pub notes: Vec<String>,
}

/// Normalized inventory of an API's endpoints, base URLs and auth schemes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceMap {
    pub api: ApiInfo,
    pub base_urls: Vec<String>,
    pub auth: AuthSummary,
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurfaceStats {
    pub endpoint_count: usize,
    pub auth_scheme_count: usize,
    pub base_url_count: usize,
}

/// Surface map output together with the spec location it was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceMapReport {
    pub spec_url: String,
    pub surface_map: SurfaceMap,
    pub stats: SurfaceStats,
}

impl SurfaceMap {
    /// Build the surface map of a parsed spec document
    #[must_use]
    pub fn from_value(spec: &Value) -> Self {
        SurfaceMap {
            api: extract_api_info(spec),
            base_urls: extract_base_urls(spec),
            auth: AuthSummary {
                schemes: extract_auth_schemes(spec),
                notes: Vec::new(),
            },
            endpoints: extract_endpoints(spec, &SURFACE_METHODS, NO_DESCRIPTION),
        }
    }

    #[must_use]
    pub fn stats(&self) -> SurfaceStats {
        SurfaceStats {
            endpoint_count: self.endpoints.len(),
            auth_scheme_count: self.auth.schemes.len(),
            base_url_count: self.base_urls.len(),
        }
    }

    #[must_use]
    pub fn into_report(self, spec_url: impl Into<String>) -> SurfaceMapReport {
        let stats = self.stats();
        SurfaceMapReport {
            spec_url: spec_url.into(),
            surface_map: self,
            stats,
        }
    }
}

/// Extract title and version from the `info` section
#[must_use]
pub fn extract_api_info(spec: &Value) -> ApiInfo {
    let info = spec.get("info");
    ApiInfo {
        title: string_field(info, "title"),
        version: string_field(info, "version"),
    }
}

/// Extract the `url` of every server entry, in document order
#[must_use]
pub fn extract_base_urls(spec: &Value) -> Vec<String> {
    spec.get("servers")
        .and_then(Value::as_array)
        .map(|servers| {
            servers
                .iter()
                .filter_map(|server| server.get("url").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Extract one [`AuthScheme`] per entry of `components.securitySchemes`
#[must_use]
pub fn extract_auth_schemes(spec: &Value) -> Vec<AuthScheme> {
    let Some(schemes) = spec
        .get("components")
        .and_then(|components| components.get("securitySchemes"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    schemes
        .iter()
        .map(|(name, scheme)| {
            let scheme = Some(scheme);
            let mut flows: Vec<String> = scheme
                .and_then(|s| s.get("flows"))
                .and_then(Value::as_object)
                .map(|flows| flows.keys().cloned().collect())
                .unwrap_or_default();
            flows.sort();

            AuthScheme {
                name: name.clone(),
                scheme_type: string_field(scheme, "type").unwrap_or_else(|| "unknown".to_string()),
                location: string_field(scheme, "in"),
                scheme: string_field(scheme, "scheme"),
                bearer_format: string_field(scheme, "bearerFormat"),
                flows,
            }
        })
        .collect()
}

/// Extract one [`Endpoint`] per (path, method) pair whose operation is an object.
///
/// Paths are visited in document order and, within a path, methods in the order
/// given by `methods`. Operations with neither summary nor description get
/// `placeholder` as their purpose.
#[must_use]
pub fn extract_endpoints(spec: &Value, methods: &[HttpMethod], placeholder: &str) -> Vec<Endpoint> {
    let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let global_security = spec.get("security");
    let mut endpoints = Vec::new();

    for (path, path_item) in paths {
        for method in methods {
            let Some(operation) = path_item
                .get(method.path_item_key())
                .filter(|operation| operation.is_object())
            else {
                continue;
            };

            endpoints.push(Endpoint {
                method: *method,
                path: path.clone(),
                purpose: operation_purpose(operation).unwrap_or_else(|| placeholder.to_string()),
                auth_required: auth_requirement(global_security, operation.get("security")),
                scopes: Vec::new(),
            });
        }
    }

    endpoints
}

/// Summary, else the first line of the description
fn operation_purpose(operation: &Value) -> Option<String> {
    if let Some(summary) = operation
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return Some(summary.to_string());
    }

    operation
        .get("description")
        .and_then(Value::as_str)
        .and_then(|description| description.split('\n').next())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
}

fn auth_requirement(global: Option<&Value>, operation: Option<&Value>) -> AuthRequirement {
    let non_empty = |value: Option<&Value>| {
        value
            .and_then(Value::as_array)
            .is_some_and(|requirements| !requirements.is_empty())
    };

    if non_empty(global) || non_empty(operation) {
        return AuthRequirement::Required;
    }

    // `security: []` on the operation is an explicit opt-out
    match operation.and_then(Value::as_array) {
        Some(requirements) if requirements.is_empty() => AuthRequirement::NotRequired,
        _ => AuthRequirement::Unknown,
    }
}

fn string_field(value: Option<&Value>, key: &str) -> Option<String> {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_spec() -> Value {
        json!({
            "openapi": "3.0.3",
            "info": {
                "title": "Shop API",
                "version": "2.1.0"
            },
            "servers": [
                { "url": "https://api.shop.example.com/v2" },
                { "description": "no url here" },
                { "url": "https://sandbox.shop.example.com/v2" }
            ],
            "components": {
                "securitySchemes": {
                    "bearerAuth": {
                        "type": "http",
                        "scheme": "bearer",
                        "bearerFormat": "JWT"
                    },
                    "apiKey": {
                        "type": "apiKey",
                        "in": "header",
                        "name": "X-API-Key"
                    },
                    "oauth": {
                        "type": "oauth2",
                        "flows": {
                            "implicit": {},
                            "authorizationCode": {},
                            "clientCredentials": {}
                        }
                    },
                    "mystery": {}
                }
            },
            "paths": {
                "/orders": {
                    "post": {
                        "description": "Place an order\nThe order is validated first."
                    },
                    "get": { "summary": "List orders", "security": [{ "bearerAuth": [] }] },
                    "parameters": [],
                    "trace": { "summary": "Trace orders" }
                },
                "/customers/{id}": {
                    "delete": { "summary": "Delete a customer", "security": [] },
                    "head": { "summary": "Check a customer" },
                    "put": null
                },
                "/health": {
                    "get": {}
                }
            }
        })
    }

    #[test]
    fn test_endpoints_follow_path_then_method_order() {
        let endpoints = extract_endpoints(&create_test_spec(), &SURFACE_METHODS, NO_DESCRIPTION);

        let pairs: Vec<(HttpMethod, &str)> = endpoints
            .iter()
            .map(|e| (e.method, e.path.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (HttpMethod::Get, "/orders"),
                (HttpMethod::Post, "/orders"),
                (HttpMethod::Delete, "/customers/{id}"),
                (HttpMethod::Get, "/health"),
            ]
        );
    }

    #[test]
    fn test_matrix_methods_include_head_and_options() {
        let endpoints = extract_endpoints(&create_test_spec(), &MATRIX_METHODS, "");

        assert_eq!(endpoints.len(), 5);
        assert!(
            endpoints
                .iter()
                .any(|e| e.method == HttpMethod::Head && e.path == "/customers/{id}")
        );
    }

    #[test]
    fn test_purpose_fallbacks() {
        let endpoints = extract_endpoints(&create_test_spec(), &SURFACE_METHODS, NO_DESCRIPTION);

        assert_eq!(endpoints[0].purpose, "List orders");
        assert_eq!(endpoints[1].purpose, "Place an order");
        assert_eq!(endpoints[3].purpose, NO_DESCRIPTION);

        let endpoints = extract_endpoints(&create_test_spec(), &SURFACE_METHODS, "");
        assert_eq!(endpoints[3].purpose, "");
    }

    #[test]
    fn test_auth_requirement_is_tri_state() {
        let endpoints = extract_endpoints(&create_test_spec(), &SURFACE_METHODS, NO_DESCRIPTION);

        assert_eq!(endpoints[0].auth_required, AuthRequirement::Required);
        assert_eq!(endpoints[1].auth_required, AuthRequirement::Unknown);
        assert_eq!(endpoints[2].auth_required, AuthRequirement::NotRequired);
    }

    #[test]
    fn test_global_security_marks_every_operation() {
        let spec = json!({
            "security": [{ "apiKey": [] }],
            "paths": {
                "/a": { "get": {}, "delete": { "security": [] } }
            }
        });

        let endpoints = extract_endpoints(&spec, &SURFACE_METHODS, NO_DESCRIPTION);
        assert!(
            endpoints
                .iter()
                .all(|e| e.auth_required == AuthRequirement::Required)
        );
    }

    #[test]
    fn test_auth_requirement_serializes_as_nullable_bool() {
        assert_eq!(
            serde_json::to_value(AuthRequirement::Required).unwrap(),
            json!(true)
        );
        assert_eq!(
            serde_json::to_value(AuthRequirement::NotRequired).unwrap(),
            json!(false)
        );
        assert_eq!(
            serde_json::to_value(AuthRequirement::Unknown).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_base_urls_skip_entries_without_url() {
        assert_eq!(
            extract_base_urls(&create_test_spec()),
            vec![
                "https://api.shop.example.com/v2".to_string(),
                "https://sandbox.shop.example.com/v2".to_string(),
            ]
        );
    }

    #[test]
    fn test_auth_schemes() {
        let schemes = extract_auth_schemes(&create_test_spec());
        assert_eq!(schemes.len(), 4);

        let bearer = &schemes[0];
        assert_eq!(bearer.name, "bearerAuth");
        assert_eq!(bearer.scheme_type, "http");
        assert_eq!(bearer.scheme.as_deref(), Some("bearer"));
        assert_eq!(bearer.bearer_format.as_deref(), Some("JWT"));
        assert_eq!(bearer.location, None);

        assert_eq!(schemes[1].location.as_deref(), Some("header"));
        assert_eq!(
            schemes[2].flows,
            vec!["authorizationCode", "clientCredentials", "implicit"]
        );
        assert_eq!(schemes[3].scheme_type, "unknown");
        assert!(schemes[3].flows.is_empty());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let spec = json!({ "paths": "not an object", "components": 42 });
        let surface = SurfaceMap::from_value(&spec);

        assert!(surface.endpoints.is_empty());
        assert!(surface.auth.schemes.is_empty());
        assert!(surface.base_urls.is_empty());
        assert_eq!(surface.api.title, None);
    }

    #[test]
    fn test_surface_map_report_shape() {
        let report = SurfaceMap::from_value(&create_test_spec())
            .into_report("https://api.shop.example.com/openapi.json");
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["spec_url"], "https://api.shop.example.com/openapi.json");
        assert_eq!(value["surface_map"]["api"]["title"], "Shop API");
        assert_eq!(value["surface_map"]["auth"]["notes"], json!([]));
        assert_eq!(value["surface_map"]["endpoints"][0]["method"], "GET");
        assert_eq!(value["surface_map"]["endpoints"][0]["scopes"], json!([]));
        assert_eq!(value["surface_map"]["auth"]["schemes"][1]["in"], "header");
        assert_eq!(
            value["stats"],
            json!({ "endpoint_count": 4, "auth_scheme_count": 4, "base_url_count": 2 })
        );
    }
}
