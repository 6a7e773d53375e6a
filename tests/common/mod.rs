// SPDX-License-Identifier: MIT

use run_together::config::Config;
use run_together::middleware::auth::{encode_session, SESSION_COOKIE};
use run_together::models::{Session, SessionTokens};
use run_together::routes::create_router;
use run_together::services::{StravaClient, StravaService};
use run_together::AppState;
use std::sync::Arc;

/// Unroutable endpoint so upstream fetches fail fast without a network.
pub const DEAD_UPSTREAM: &str = "http://127.0.0.1:1";

/// Create a test app with an unreachable Strava backend.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();

    let client = StravaClient::with_base_urls(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        DEAD_UPSTREAM.to_string(),
        DEAD_UPSTREAM.to_string(),
    );
    let strava = StravaService::with_client(client);

    let state = Arc::new(AppState { config, strava });
    (create_router(state.clone()), state)
}

/// A session with tokens that won't need refreshing until 2030.
#[allow(dead_code)]
pub fn test_session() -> Session {
    Session::new(
        12345,
        "Ada".to_string(),
        Some("https://example.com/ada.jpg".to_string()),
        SessionTokens {
            access_token: "test_access".to_string(),
            refresh_token: "test_refresh".to_string(),
            expires_at: 1_900_000_000,
        },
    )
}

/// Cookie header value for a signed test session.
#[allow(dead_code)]
pub fn session_cookie_header(session: &Session, state: &AppState) -> String {
    let jwt = encode_session(session, &state.config.session_signing_key)
        .expect("session should encode");
    format!("{}={}", SESSION_COOKIE, jwt)
}
