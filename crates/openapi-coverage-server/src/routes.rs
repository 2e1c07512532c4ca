//! HTTP surface of the server.
//!
//! Two analysis routes wrap the library's entry points. Every response carries
//! permissive CORS headers and every route answers `OPTIONS` preflights. When a
//! token is configured the analysis routes require it as a bearer token.

use actix_web::http::header::{self, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::middleware::DefaultHeaders;
use actix_web::{HttpRequest, HttpResponse, Resource, ResponseError, web};
use openapi_coverage::{Analyzer, Error};
use serde::Serialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::request;

/// Shared state of all workers
#[derive(Debug, Clone)]
pub struct AppState {
    analyzer: Analyzer,
    token: Option<String>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, token: Option<String>) -> Self {
        Self { analyzer, token }
    }

    fn authorize(&self, req: &HttpRequest) -> Result<(), ApiError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };
        let provided = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token);

        match provided {
            Some(token) if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) => Ok(()),
            _ => {
                warn!(path = %req.path(), "Rejected request without valid bearer token");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Token of an `Authorization: Bearer <token>` value; the scheme is case-insensitive
fn bearer_token(authz: &str) -> Option<&str> {
    let (scheme, token) = authz.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Errors surfaced to HTTP clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: a valid bearer token is required")]
    Unauthorized,
    #[error(transparent)]
    Analysis(#[from] Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    spec_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'a Value>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Analysis(Error::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Analysis(Error::SpecLoad { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Analysis(Error::InvalidInput { message, example }) => ErrorBody {
                error: message.clone(),
                spec_url: None,
                example: Some(example),
            },
            ApiError::Analysis(error) => ErrorBody {
                error: error.to_string(),
                spec_url: error.spec_url(),
                example: None,
            },
            ApiError::Unauthorized => ErrorBody {
                error: self.to_string(),
                spec_url: None,
                example: None,
            },
        };

        let status = self.status_code();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %body.error, "Request failed");
        }
        HttpResponse::build(status).json(body)
    }
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Headers letting browsers call every route from any origin
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")))
        .add((
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .add((
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(resource("/").route(web::get().to(manifest)))
        .service(resource("/health").route(web::get().to(health)))
        .service(resource("/surface-map").route(web::post().to(surface_map)))
        .service(resource("/capability-matrix").route(web::post().to(capability_matrix)))
        .default_service(web::to(fallback));
}

fn resource(path: &str) -> Resource {
    web::resource(path).route(web::method(Method::OPTIONS).to(preflight))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn fallback(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return HttpResponse::NoContent().finish();
    }
    HttpResponse::NotFound().json(json!({ "error": format!("No route for {} {}", req.method(), req.path()) }))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn manifest(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "auth": if state.token.is_some() { "bearer" } else { "none" },
        "tools": [
            {
                "name": "openapi_surface_map",
                "method": "POST",
                "path": "/surface-map",
                "description": "Normalize an OpenAPI document into an endpoint inventory with auth schemes and base URLs",
                "input": {
                    "spec_url": "string, required: URL or path of an OpenAPI/Swagger document (JSON or YAML)"
                }
            },
            {
                "name": "capability_coverage_matrix",
                "method": "POST",
                "path": "/capability-matrix",
                "description": "Extract capabilities from a free-text integration request and score each against the referenced OpenAPI spec",
                "input": {
                    "user_request": "string, required: the integration request, optionally containing the spec URL",
                    "spec_url": "string, optional: spec location overriding any URL found in user_request",
                    "max_capabilities": "integer, optional: 5 to 60, default 25",
                    "max_evidence_per_capability": "integer, optional: 1 to 10, default 3"
                }
            }
        ]
    }))
}

async fn surface_map(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    state.authorize(&req)?;
    let spec_url = request::surface_spec_url(&request::parse_body(&body))?;

    let report = state.analyzer.surface_map(&spec_url).await?;
    Ok(HttpResponse::Ok().json(report))
}

async fn capability_matrix(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    state.authorize(&req)?;
    let matrix_request = request::matrix_request(&request::parse_body(&body))?;

    let matrix = state.analyzer.capability_matrix(&matrix_request).await?;
    info!(
        capability_count = matrix.matrix.len(),
        coverage_score = matrix.overall.coverage_score,
        "Served capability matrix"
    );
    Ok(HttpResponse::Ok().json(matrix))
}
