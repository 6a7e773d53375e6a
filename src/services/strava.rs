// SPDX-License-Identifier: MIT

//! Strava API client for OAuth and activity data.
//!
//! Handles:
//! - Authorization-code exchange and token refresh
//! - Athlete profile lookup
//! - Date-range-filtered activity listing (paginated)
//! - Per-activity sample streams
//!
//! Non-2xx responses surface as [`AppError::Upstream`] carrying the HTTP
//! status and body text; a 401 marks the token as expired or revoked.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{parse_activities, Activity, RawActivity, RawStreamSet, SampleStream};
use crate::models::SessionTokens;

const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
const DEFAULT_OAUTH_BASE: &str = "https://www.strava.com/oauth";

/// Activities fetched per page when walking a date range.
const ACTIVITIES_PER_PAGE: u32 = 200;
/// Hard cap on pages per request, to bound one dashboard render.
const MAX_ACTIVITY_PAGES: u32 = 10;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Low-level Strava HTTP client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_base_urls(
            client_id,
            client_secret,
            DEFAULT_API_BASE.to_string(),
            DEFAULT_OAUTH_BASE.to_string(),
        )
    }

    /// Create a client pointed at alternate endpoints (used by tests).
    pub fn with_base_urls(
        client_id: String,
        client_secret: String,
        api_base: String,
        oauth_base: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            oauth_base,
            client_id,
            client_secret,
        }
    }

    /// Exchange an authorization code for tokens and the athlete profile.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                status: 0,
                body: format!("Token exchange request failed: {}", e),
            })?;

        check_response_json(response).await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                status: 0,
                body: format!("Token refresh request failed: {}", e),
            })?;

        check_response_json(response).await
    }

    /// Get the authenticated athlete profile.
    pub async fn get_athlete(&self, access_token: &str) -> Result<StravaAthlete, AppError> {
        let url = format!("{}/athlete", self.api_base);
        self.get_json(&url, access_token, &[]).await
    }

    /// List one page of activities within `[after, before]` (epoch seconds).
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64,
        before: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawActivity>, AppError> {
        let url = format!("{}/athlete/activities", self.api_base);
        self.get_json(
            &url,
            access_token,
            &[
                ("after", after.to_string()),
                ("before", before.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    /// Fetch the time/distance/heartrate/latlng streams for one activity.
    pub async fn get_activity_streams(
        &self,
        access_token: &str,
        activity_id: u64,
    ) -> Result<RawStreamSet, AppError> {
        let url = format!("{}/activities/{}/streams", self.api_base, activity_id);
        self.get_json(
            &url,
            access_token,
            &[
                ("keys", "time,distance,heartrate,latlng".to_string()),
                ("key_by_type", "true".to_string()),
            ],
        )
        .await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream {
                status: 0,
                body: e.to_string(),
            })?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 401 {
            tracing::warn!("Strava rejected the access token (401)");
        }
        return Err(AppError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    response.json().await.map_err(|e| AppError::Upstream {
        status: status.as_u16(),
        body: format!("JSON parse error: {}", e),
    })
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: StravaAthlete,
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Athlete profile fields we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    /// Profile picture URL
    pub profile: Option<String>,
}

/// Result of handling the OAuth callback.
#[derive(Debug, Clone)]
pub struct OAuthResult {
    pub athlete_id: u64,
    pub firstname: String,
    pub profile_picture: Option<String>,
    pub tokens: SessionTokens,
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - token lifecycle + typed fetch operations
// ─────────────────────────────────────────────────────────────────────────────

/// High-level service over the client.
///
/// Tokens live in the caller's session, not in the service: every method
/// takes the session's tokens and [`ensure_fresh`](Self::ensure_fresh)
/// returns the possibly-refreshed set for the caller to persist back into
/// the session cookie. No cross-request state is kept here.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
}

impl StravaService {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: StravaClient::new(client_id, client_secret),
        }
    }

    /// Build a service over a preconfigured client (used by tests).
    pub fn with_client(client: StravaClient) -> Self {
        Self { client }
    }

    /// Exchange the OAuth callback code and fetch the athlete identity.
    pub async fn handle_oauth_callback(&self, code: &str) -> Result<OAuthResult, AppError> {
        let response = self.client.exchange_code(code).await?;

        tracing::info!(
            athlete_id = response.athlete.id,
            firstname = %response.athlete.firstname,
            "OAuth code exchanged"
        );

        Ok(OAuthResult {
            athlete_id: response.athlete.id,
            firstname: response.athlete.firstname,
            profile_picture: response.athlete.profile,
            tokens: SessionTokens {
                access_token: response.access_token,
                refresh_token: response.refresh_token,
                expires_at: response.expires_at,
            },
        })
    }

    /// Return tokens that are valid for at least the refresh margin,
    /// refreshing against Strava when the current ones are expiring.
    ///
    /// A rejected refresh token surfaces as a 401 upstream error; the
    /// handler maps that to 401 so the client restarts the OAuth flow.
    pub async fn ensure_fresh(&self, tokens: SessionTokens) -> Result<SessionTokens, AppError> {
        let now = Utc::now().timestamp();
        if now + TOKEN_REFRESH_MARGIN_SECS < tokens.expires_at {
            return Ok(tokens);
        }

        tracing::info!("Access token expired or expiring, refreshing");
        let refreshed = self.client.refresh_token(&tokens.refresh_token).await?;

        Ok(SessionTokens {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token,
            expires_at: refreshed.expires_at,
        })
    }

    /// Get the authenticated athlete profile.
    pub async fn athlete(&self, tokens: &SessionTokens) -> Result<StravaAthlete, AppError> {
        self.client.get_athlete(&tokens.access_token).await
    }

    /// All activities of a calendar year, parsed and validated.
    pub async fn activities_for_year(
        &self,
        tokens: &SessionTokens,
        year: i32,
    ) -> Result<Vec<Activity>, AppError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| AppError::BadRequest(format!("Invalid year {}", year)))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .ok_or_else(|| AppError::BadRequest(format!("Invalid year {}", year)))?;

        self.activities_in_epoch_range(tokens, start.and_utc().timestamp(), end.and_utc().timestamp())
            .await
    }

    /// All activities between two dates (inclusive), parsed and validated.
    pub async fn activities_between(
        &self,
        tokens: &SessionTokens,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Activity>, AppError> {
        let start = start_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::BadRequest("Invalid start date".to_string()))?;
        let end = end_date
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| AppError::BadRequest("Invalid end date".to_string()))?;

        self.activities_in_epoch_range(tokens, start.and_utc().timestamp(), end.and_utc().timestamp())
            .await
    }

    /// The athlete's most recent activities, newest first.
    ///
    /// Backs the "last activities" cards, so this only ever needs the
    /// first page of results.
    pub async fn recent_activities(
        &self,
        tokens: &SessionTokens,
        limit: usize,
    ) -> Result<Vec<Activity>, AppError> {
        let now = Utc::now().timestamp();
        let raw = self
            .client
            .list_activities(&tokens.access_token, 0, now, 1, limit as u32)
            .await?;
        Ok(parse_activities(raw))
    }

    /// Walk the paginated list endpoint until a short page (or the page cap).
    async fn activities_in_epoch_range(
        &self,
        tokens: &SessionTokens,
        after: i64,
        before: i64,
    ) -> Result<Vec<Activity>, AppError> {
        let mut raw: Vec<RawActivity> = Vec::new();

        for page in 1..=MAX_ACTIVITY_PAGES {
            let batch = self
                .client
                .list_activities(
                    &tokens.access_token,
                    after,
                    before,
                    page,
                    ACTIVITIES_PER_PAGE,
                )
                .await?;

            let short_page = (batch.len() as u32) < ACTIVITIES_PER_PAGE;
            raw.extend(batch);
            if short_page {
                break;
            }
        }

        let activities = parse_activities(raw);
        tracing::debug!(count = activities.len(), after, before, "Fetched activities");
        Ok(activities)
    }

    /// Fetch and validate the sample streams for one activity.
    pub async fn activity_streams(
        &self,
        tokens: &SessionTokens,
        activity_id: u64,
    ) -> Result<SampleStream, AppError> {
        let raw = self
            .client
            .get_activity_streams(&tokens.access_token, activity_id)
            .await
            .map_err(|e| match e {
                AppError::Upstream { status: 404, .. } => {
                    AppError::NotFound(format!("activity {}", activity_id))
                }
                other => other,
            })?;

        SampleStream::try_from(raw).map_err(|e| AppError::Upstream {
            status: 200,
            body: format!("Malformed streams for activity {}: {}", activity_id, e),
        })
    }
}
