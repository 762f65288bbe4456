//! This file defines the case-trends binary entry point.

use case_trends::app;
use case_trends::cli;
use case_trends::metrics;
use case_trends::server;
use case_trends::tracing;

use std::process::exit;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    metrics::register_metrics();
    let state = match app::init(&args).await {
        Ok(state) => state,
        Err(err) => {
            ::tracing::error!("Failed to initialise: {}", err);
            exit(1)
        }
    };
    let service = app::service(state.clone());
    let monitor = app::monitor_service(state);
    server::serve(&args, service, monitor).await;
    tracing::shutdown_tracing();
}
