// SPDX-License-Identifier: MIT

//! Strava OAuth authentication routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::{clear_session_cookie, session_cookie};
use crate::models::Session;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(auth_start))
        .route("/auth/strava/callback", get(auth_callback))
        .route("/auth/logout", get(logout))
}

/// Query parameters for starting the OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend URL to redirect back to after OAuth completes.
    /// If not provided, uses the configured frontend URL.
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to Strava authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
    headers: axum::http::HeaderMap,
) -> Result<Redirect> {
    let frontend_url = params
        .redirect_uri
        .unwrap_or_else(|| state.config.frontend_url.clone());

    // Encode frontend URL + timestamp into a signed state parameter
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();
    let oauth_state = sign_state(&frontend_url, timestamp, &state.config.oauth_state_key)?;

    let callback_url = format!("{}/auth/strava/callback", request_origin(&headers));

    let auth_url = format!(
        "https://www.strava.com/oauth/authorize?\
         client_id={}&\
         redirect_uri={}&\
         response_type=code&\
         scope=read,activity:read_all&\
         state={}",
        state.config.strava_client_id,
        urlencoding::encode(&callback_url),
        oauth_state
    );

    tracing::info!(
        client_id = %state.config.strava_client_id,
        frontend_url = %frontend_url,
        "Starting OAuth flow, redirecting to Strava"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    state: String,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, create the session cookie.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    // Decode and verify the frontend URL from the state parameter
    let frontend_url = verify_and_decode_state(&params.state, &state.config.oauth_state_key)
        .unwrap_or_else(|| {
            tracing::warn!(
                "Invalid or tampered state parameter, falling back to default frontend URL"
            );
            state.config.frontend_url.clone()
        });

    // Check for OAuth errors (user denied access, etc.)
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok((jar, Redirect::temporary(&redirect)));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("Missing 'code' parameter".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let oauth = state.strava.handle_oauth_callback(&code).await?;

    let session = Session::new(
        oauth.athlete_id,
        oauth.firstname,
        oauth.profile_picture,
        oauth.tokens,
    );

    let cookie = session_cookie(&session, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session cookie failed: {}", e)))?;

    tracing::info!(
        athlete_id = session.athlete_id,
        "OAuth successful, session created"
    );

    Ok((jar.add(cookie), Redirect::temporary(&frontend_url)))
}

/// Logout - clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let frontend = state.config.frontend_url.clone();
    (jar.add(clear_session_cookie()), Redirect::temporary(&frontend))
}

/// Origin (scheme + host) of the incoming request, for the callback URL.
fn request_origin(headers: &axum::http::HeaderMap) -> String {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            std::env::var("API_HOST").unwrap_or_else(|_| "localhost:8080".to_string())
        });

    let scheme = if host.contains("localhost") || host.contains("127.0.0.1") {
        "http"
    } else {
        "https"
    };

    format!("{}://{}", scheme, host)
}

/// Sign `frontend_url|timestamp_hex` with HMAC-SHA256 and base64-encode.
fn sign_state(frontend_url: &str, timestamp: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let signed = format!("{}|{}", payload, signature);
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature and decode the frontend URL from the OAuth
/// state parameter.
fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let frontend_url = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    let payload = format!("{}|{}", frontend_url, timestamp_hex);
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch, possible tampering");
        return None;
    }

    Some(frontend_url.to_string())
}
