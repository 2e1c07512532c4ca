mod cli;
mod configuration;
mod request;
mod routes;

use std::process;

use actix_web::{App, HttpServer, web};
use cli::Cli;
use configuration::Configuration;
use openapi_coverage::Error;
use routes::AppState;
use tracing::{error, info, info_span};

#[actix_web::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let cli = Cli::parse_args();
    let config = Configuration::from_cli(cli)?;

    setup_logging();

    let span = info_span!(
        "server_initialization",
        bind_address = %config.bind_address,
        port = config.port,
    );
    let _enter = span.enter();

    let state = web::Data::new(AppState::new(config.analyzer()?, config.token.clone()));
    info!(
        auth = config.token.is_some(),
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        extra_headers = config.default_headers.len(),
        full_threshold = config.weights.full_threshold,
        partial_threshold = config.weights.partial_threshold,
        "Configured analyzer"
    );

    let bind_addr = format!("{}:{}", config.bind_address, config.port);
    info!(bind_address = %bind_addr, "OpenAPI coverage server starting");

    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(routes::cors_headers())
            .configure(routes::configure)
    })
    .bind(bind_addr.clone())?
    .run();

    info!(
        url = %format!("http://{bind_addr}/"),
        "Server ready for requests"
    );

    http_server.await?;

    info!("Shutdown signal received, stopping server");

    Ok(())
}

fn setup_logging() {
    // Structured logging filtered by OPENAPI_COVERAGE_LOG, e.g. "openapi_coverage=debug"
    let env_filter = tracing_subscriber::EnvFilter::try_from_env("OPENAPI_COVERAGE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}
