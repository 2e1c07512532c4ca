//! Entry points tying the loader, normalizer, extractor, matcher and aggregator
//! together. Every call is self-contained; nothing is cached between calls.

use bon::Builder;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::capability::{clamp_max_capabilities, extract_capabilities};
use crate::coverage::{CapabilityMatrix, MatrixRow};
use crate::error::Error;
use crate::loader::{DEFAULT_FETCH_TIMEOUT, SpecLoader, SpecLocation};
use crate::matcher::{Matcher, ScoringWeights, clamp_max_evidence};
use crate::spec::{MATRIX_METHODS, SurfaceMapReport, SurfaceMap, extract_endpoints};
use crate::spec_url::find_spec_url;

/// A capability-matrix request as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct MatrixRequest {
    #[builder(into)]
    pub user_request: String,
    /// Explicit spec location; when absent it is searched for in `user_request`
    #[builder(into)]
    pub spec_url: Option<String>,
    pub max_capabilities: Option<i64>,
    pub max_evidence_per_capability: Option<i64>,
}

impl MatrixRequest {
    /// Reject requests without usable request text
    pub fn validate(&self) -> Result<(), Error> {
        if self.user_request.trim().is_empty() {
            return Err(Error::missing_request());
        }
        Ok(())
    }

    /// The spec location this request refers to, if one can be found
    #[must_use]
    pub fn resolve_spec_url(&self) -> Option<String> {
        self.spec_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .or_else(|| find_spec_url(&self.user_request))
    }
}

/// Pipeline entry points for caller-supplied requests.
///
/// Spec locations reaching these entry points come from callers, so only
/// `http://` and `https://` URLs are fetched. Local files are loaded through
/// [`SpecLoader::load`] directly.
#[derive(Debug, Clone)]
pub struct Analyzer {
    loader: SpecLoader,
    matcher: Matcher,
}

impl Analyzer {
    #[must_use]
    pub fn new(loader: SpecLoader, weights: ScoringWeights) -> Self {
        Self {
            loader,
            matcher: Matcher::new(weights),
        }
    }

    /// Analyzer with the default fetch timeout, no extra headers and default weights
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn with_defaults() -> Result<Self, Error> {
        let loader = SpecLoader::new(DEFAULT_FETCH_TIMEOUT, HeaderMap::new())?;
        Ok(Self::new(loader, ScoringWeights::default()))
    }

    /// Fetch the spec at `spec_url` and build its surface map
    ///
    /// # Errors
    ///
    /// Returns an error if the location is empty or not an http(s) URL, or if
    /// the spec cannot be loaded
    pub async fn surface_map(&self, spec_url: &str) -> Result<SurfaceMapReport, Error> {
        let spec_url = spec_url.trim();
        if spec_url.is_empty() {
            return Err(Error::missing_spec_url());
        }

        let location = remote_location(spec_url)?;
        let spec = self.loader.load(&location).await?;

        let report = SurfaceMap::from_value(&spec).into_report(spec_url);
        info!(
            spec_url,
            endpoint_count = report.stats.endpoint_count,
            auth_scheme_count = report.stats.auth_scheme_count,
            "Built surface map"
        );
        Ok(report)
    }

    /// Extract capabilities from the request, load the referenced spec and
    /// score every capability against it.
    ///
    /// A request that names no spec yields the all-missing matrix rather than
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request text is empty, the spec location is not
    /// an http(s) URL, or the spec cannot be loaded
    pub async fn capability_matrix(&self, request: &MatrixRequest) -> Result<CapabilityMatrix, Error> {
        request.validate()?;

        let Some(spec_url) = request.resolve_spec_url() else {
            let capabilities = extract_capabilities(
                &request.user_request,
                clamp_max_capabilities(request.max_capabilities),
            );
            info!(
                capability_count = capabilities.len(),
                "No spec URL in request, returning unevaluated matrix"
            );
            return Ok(CapabilityMatrix::without_spec(&capabilities));
        };

        let location = remote_location(&spec_url)?;
        let spec = self.loader.load(&location).await?;

        Ok(self.matrix_for_spec(&spec, Some(spec_url), request))
    }

    /// Score a request against an already parsed spec
    #[must_use]
    pub fn matrix_for_spec(
        &self,
        spec: &Value,
        spec_url: Option<String>,
        request: &MatrixRequest,
    ) -> CapabilityMatrix {
        let span = info_span!("capability_matrix", spec_url = spec_url.as_deref().unwrap_or(""));
        let _enter = span.enter();

        let endpoints = extract_endpoints(spec, &MATRIX_METHODS, "");
        let capabilities = extract_capabilities(
            &request.user_request,
            clamp_max_capabilities(request.max_capabilities),
        );
        let max_evidence = clamp_max_evidence(request.max_evidence_per_capability);

        debug!(
            endpoint_count = endpoints.len(),
            capability_count = capabilities.len(),
            max_evidence,
            "Scoring capabilities"
        );

        let rows: Vec<MatrixRow> = capabilities
            .into_iter()
            .map(|capability| {
                let matched = self
                    .matcher
                    .match_capability(&capability, &endpoints, max_evidence);
                debug!(
                    capability = %capability,
                    coverage = ?matched.coverage,
                    best_confidence = matched.best_confidence,
                    "Scored capability"
                );
                MatrixRow::from_match(capability, matched)
            })
            .collect();

        let matrix = CapabilityMatrix::new(spec_url, rows, Some(endpoints.len()));
        info!(
            coverage_score = matrix.overall.coverage_score,
            full = matrix.overall.full_count,
            partial = matrix.overall.partial_count,
            missing = matrix.overall.missing_count,
            "Built capability matrix"
        );
        matrix
    }
}

/// Parse a caller-supplied spec location, refusing anything but http(s) URLs
fn remote_location(spec_url: &str) -> Result<SpecLocation, Error> {
    match spec_url.parse::<SpecLocation>() {
        Ok(location @ SpecLocation::Url(_)) => Ok(location),
        Ok(SpecLocation::File(_)) => {
            warn!("Refused non-URL spec location");
            Err(Error::spec_url_not_remote())
        }
        Err(e) => Err(Error::spec_load(spec_url, e)),
    }
}
