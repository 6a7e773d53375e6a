// SPDX-License-Identifier: MIT

//! Run-Together API Server
//!
//! Backend for a personal training calendar: signs athletes in via
//! Strava, bins their activities into yearly and monthly views and
//! serves smoothed pace charts per activity.

use run_together::{config::Config, services::StravaService, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Run-Together API");

    let strava = StravaService::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
    );

    let state = Arc::new(AppState { config, strava });

    let app = run_together::routes::create_router(state.clone());

    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("run_together=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
