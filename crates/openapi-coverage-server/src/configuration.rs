use std::time::Duration;

use bon::Builder;
use openapi_coverage::{Analyzer, CliError, Error, ScoringWeights, SpecLoader};
use reqwest::header::HeaderMap;

use crate::cli::Cli;

#[derive(Debug, Clone, Builder)]
pub struct Configuration {
    pub port: u16,
    pub bind_address: String,
    /// Bearer token guarding the analysis routes; `None` leaves them open
    pub token: Option<String>,
    pub default_headers: HeaderMap,
    pub fetch_timeout: Duration,
    pub weights: ScoringWeights,
}

impl Configuration {
    pub fn from_cli(cli: Cli) -> Result<Self, Error> {
        let default_headers = parse_headers(cli.headers)?;

        let weights = ScoringWeights::builder()
            .maybe_full_threshold(cli.full_threshold)
            .maybe_partial_threshold(cli.partial_threshold)
            .maybe_method_bonus(cli.method_bonus)
            .maybe_webhook_bonus(cli.webhook_bonus)
            .maybe_search_bonus(cli.search_bonus)
            .build();
        if weights.partial_threshold > weights.full_threshold {
            return Err(Error::Cli(CliError::InvalidThresholds {
                full: weights.full_threshold,
                partial: weights.partial_threshold,
            }));
        }

        let token = cli
            .token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(Configuration {
            port: cli.port,
            bind_address: cli.bind_address,
            token,
            default_headers,
            fetch_timeout: Duration::from_secs(cli.fetch_timeout.max(1)),
            weights,
        })
    }

    /// Build the analyzer serving every request of this process
    pub fn analyzer(&self) -> Result<Analyzer, Error> {
        let loader = SpecLoader::new(self.fetch_timeout, self.default_headers.clone())?;
        Ok(Analyzer::new(loader, self.weights))
    }
}

/// Parse "name: value" strings into a header map for spec fetches
fn parse_headers(headers: Vec<String>) -> Result<HeaderMap, Error> {
    let mut default_headers = HeaderMap::new();
    for header_str in headers {
        let Some((key, value)) = header_str.split_once(':') else {
            return Err(Error::Cli(CliError::InvalidHeaderFormat { header: header_str }));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::Cli(CliError::InvalidHeaderFormat {
                header: header_str,
            }));
        }

        let header_name = http::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            Error::Cli(CliError::InvalidHeaderName {
                header: header_str.clone(),
                source: e,
            })
        })?;
        let header_value = http::header::HeaderValue::from_str(value.trim()).map_err(|e| {
            Error::Cli(CliError::InvalidHeaderValue {
                header: header_str.clone(),
                source: e,
            })
        })?;

        default_headers.insert(header_name, header_value);
    }
    Ok(default_headers)
}
