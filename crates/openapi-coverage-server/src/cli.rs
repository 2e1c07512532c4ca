use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "openapi-coverage-server")]
#[command(
    about = "OpenAPI coverage server - Map API surfaces and score integration requests against them"
)]
pub struct Cli {
    /// Port to bind the HTTP server to
    #[arg(long, short = 'p', env = "OPENAPI_COVERAGE_PORT", default_value = "8080")]
    pub port: u16,

    /// Address to bind the HTTP server to
    #[arg(long, env = "OPENAPI_COVERAGE_BIND_ADDRESS", default_value = "127.0.0.1")]
    pub bind_address: String,

    /// Bearer token required on analysis routes
    #[arg(
        long,
        env = "OPENAPI_COVERAGE_TOKEN",
        hide_env_values = true,
        help = "Require 'Authorization: Bearer <token>' on analysis routes (disabled when unset)"
    )]
    pub token: Option<String>,

    /// HTTP headers to add to every spec fetch (format: "name: value")
    #[arg(long = "header", action = clap::ArgAction::Append, help = "HTTP headers to add to spec fetches in 'name: value' format (can be used multiple times)")]
    pub headers: Vec<String>,

    /// Seconds before a spec fetch is abandoned
    #[arg(long, env = "OPENAPI_COVERAGE_FETCH_TIMEOUT", default_value = "10")]
    pub fetch_timeout: u64,

    /// Confidence at or above which a capability is fully covered
    #[arg(long, env = "OPENAPI_COVERAGE_FULL_THRESHOLD")]
    pub full_threshold: Option<f64>,

    /// Confidence at or above which a capability is partially covered
    #[arg(long, env = "OPENAPI_COVERAGE_PARTIAL_THRESHOLD")]
    pub partial_threshold: Option<f64>,

    /// Bonus for endpoints whose method fits the capability's verb
    #[arg(long, env = "OPENAPI_COVERAGE_METHOD_BONUS")]
    pub method_bonus: Option<f64>,

    /// Bonus when capability and endpoint both talk about webhooks or events
    #[arg(long, env = "OPENAPI_COVERAGE_WEBHOOK_BONUS")]
    pub webhook_bonus: Option<f64>,

    /// Bonus when capability and endpoint both talk about searching
    #[arg(long, env = "OPENAPI_COVERAGE_SEARCH_BONUS")]
    pub search_bonus: Option<f64>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
