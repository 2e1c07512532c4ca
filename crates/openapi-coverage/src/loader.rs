use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{Instrument, debug, info_span};
use url::Url;

use crate::error::Error;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Represents different sources for loading OpenAPI specifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecLocation {
    File(PathBuf),
    Url(Url),
}

impl FromStr for SpecLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidPath("Empty spec location".to_string()));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s).map_err(|e| Error::InvalidUrl(format!("Invalid URL: {e}")))?;
            Ok(SpecLocation::Url(url))
        } else {
            Ok(SpecLocation::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for SpecLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecLocation::File(path) => write!(f, "{}", path.display()),
            SpecLocation::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Fetches spec documents and parses them into loose JSON values.
///
/// Both file paths and URLs are accepted; callers handling untrusted input
/// should only pass [`SpecLocation::Url`].
#[derive(Debug, Clone)]
pub struct SpecLoader {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl SpecLoader {
    /// Create a loader whose fetches give up after `timeout` and carry `headers`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(timeout: Duration, headers: HeaderMap) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, headers })
    }

    /// Load the spec at `location`; failures carry the attempted location
    pub async fn load(&self, location: &SpecLocation) -> Result<Value, Error> {
        let span = info_span!("load_spec", spec_location = %location);

        let result = match location {
            SpecLocation::File(path) => self.load_from_file(path).instrument(span).await,
            SpecLocation::Url(url) => self.load_from_url(url).instrument(span).await,
        };

        result.map_err(|e| Error::spec_load(location.to_string(), e))
    }

    async fn load_from_file(&self, path: &std::path::Path) -> Result<Value, Error> {
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidPath("Invalid file path encoding".to_string()))?;
        let content = tokio::fs::read_to_string(path_str).await?;
        debug!(bytes = content.len(), "Read spec from file");
        parse_document(&content, path_str)
    }

    async fn load_from_url(&self, url: &Url) -> Result<Value, Error> {
        let response = self
            .client
            .get(url.clone())
            .headers(self.headers.clone())
            .header(
                ACCEPT,
                HeaderValue::from_static("application/json, application/yaml, text/yaml"),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!("HTTP {status} from {url}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let content = response.text().await?;
        debug!(bytes = content.len(), content_type = %content_type, "Fetched spec");

        if content_type.contains("yaml") {
            return parse_yaml(&content);
        }
        parse_document(&content, url.path())
    }
}

/// Parse a spec document as JSON or YAML.
///
/// YAML is chosen for `.yaml`/`.yml` names; otherwise content starting with `{`
/// is read as JSON and anything else as YAML.
pub fn parse_document(content: &str, name: &str) -> Result<Value, Error> {
    let name = name.to_lowercase();
    if name.ends_with(".yaml") || name.ends_with(".yml") {
        return parse_yaml(content);
    }
    if content.trim_start().starts_with('{') {
        Ok(serde_json::from_str(content)?)
    } else {
        parse_yaml(content)
    }
}

fn parse_yaml(content: &str) -> Result<Value, Error> {
    // Going through serde_yaml's own value lets non-string keys such as
    // response codes (`200:`) become JSON object keys
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    let value = serde_json::to_value(yaml)?;
    if !value.is_object() {
        return Err(Error::Spec(
            "Document is not a JSON or YAML object".to_string(),
        ));
    }
    Ok(value)
}
