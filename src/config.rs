//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; there is no secret-manager layer,
//! secrets come in as environment variables (or a local .env file).

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Signing key for the session cookie (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Signing key for the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            session_signing_key: b"test_session_key_32_bytes_min!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
            // The OAuth state key may be shared with the session key when a
            // deployment only configures one secret.
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .or_else(|_| env::var("SESSION_SIGNING_KEY"))
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
