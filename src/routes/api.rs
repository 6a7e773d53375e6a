// SPDX-License-Identifier: MIT

//! API routes for authenticated users.
//!
//! Every handler receives the decoded [`Session`] as an extension,
//! re-derives its payload from a fresh Strava fetch, and returns the
//! updated session cookie alongside the JSON body.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::session_cookie;
use crate::models::{
    CalendarView, MapBounds, MonthCalendar, NavAction, Session, YearCalendar,
};
use crate::services::analysis::{clamp_window, format_pace, map_bounds, smooth_pace};
use crate::AppState;

/// API routes (require a session via the auth middleware in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/calendar", get(get_calendar))
        .route("/api/calendar/navigate", post(navigate))
        .route("/api/activities/recent", get(get_recent_activities))
        .route("/api/activities/{id}", get(get_activity_detail))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
pub struct UserResponse {
    pub athlete_id: u64,
    pub firstname: String,
    pub profile_picture: Option<String>,
}

/// Get the current user profile from the session.
async fn get_me(Extension(session): Extension<Session>) -> Json<UserResponse> {
    Json(UserResponse {
        athlete_id: session.athlete_id,
        firstname: session.firstname,
        profile_picture: session.profile_picture,
    })
}

// ─── Calendar ────────────────────────────────────────────────

/// Calendar payload for the currently selected view.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarPayload {
    Year(YearCalendar),
    Month(MonthCalendar),
}

/// Get the calendar for the session's current view.
async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<CalendarPayload>)> {
    let view = session.view;
    let (session, payload) = render_view(&state, session, view).await?;
    let jar = persist_session(jar, &state, &session)?;
    Ok((jar, Json(payload)))
}

/// Apply a navigation action and return the calendar for the new view.
async fn navigate(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Json(action): Json<NavAction>,
) -> Result<(CookieJar, Json<CalendarPayload>)> {
    let new_view = session.view.apply(action);
    tracing::info!(
        athlete_id = session.athlete_id,
        ?action,
        ?new_view,
        "Calendar navigation"
    );

    let (session, payload) = render_view(&state, session, new_view).await?;
    let jar = persist_session(jar, &state, &session)?;
    Ok((jar, Json(payload)))
}

/// Fetch activities for a view and bin them into a calendar payload.
///
/// An upstream fetch failure still renders the grid, just with zero
/// buckets; only token errors propagate (the client must re-authenticate).
async fn render_view(
    state: &Arc<AppState>,
    mut session: Session,
    view: CalendarView,
) -> Result<(Session, CalendarPayload)> {
    session.tokens = state.strava.ensure_fresh(session.tokens).await?;
    session.view = view;

    let payload = match view {
        CalendarView::Year { year } => {
            let activities = fetch_or_empty(
                state.strava.activities_for_year(&session.tokens, year).await,
            )?;
            CalendarPayload::Year(YearCalendar::build(year, &activities))
        }
        CalendarView::Month { year, month } => {
            let (grid_start, grid_end) = MonthCalendar::grid_range(year, month)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid month {}", month)))?;
            let activities = fetch_or_empty(
                state
                    .strava
                    .activities_between(&session.tokens, grid_start, grid_end)
                    .await,
            )?;
            let calendar = MonthCalendar::build(year, month, &activities)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid month {}", month)))?;
            CalendarPayload::Month(calendar)
        }
    };

    Ok((session, payload))
}

/// Degrade a failed activity fetch to an empty list so the grid still
/// renders. Token errors are not degraded.
fn fetch_or_empty(
    result: Result<Vec<crate::models::Activity>>,
) -> Result<Vec<crate::models::Activity>> {
    match result {
        Ok(activities) => Ok(activities),
        Err(e) if e.is_token_error() => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Activity fetch failed, rendering empty calendar");
            Ok(Vec::new())
        }
    }
}

/// Re-sign the (possibly updated) session into the cookie jar.
fn persist_session(jar: CookieJar, state: &Arc<AppState>, session: &Session) -> Result<CookieJar> {
    let cookie = session_cookie(session, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Session cookie failed: {}", e)))?;
    Ok(jar.add(cookie))
}

// ─── Last Activities ─────────────────────────────────────────

/// How many recent activities the cards show by default.
const DEFAULT_RECENT_LIMIT: usize = 5;
const MAX_RECENT_LIMIT: usize = 50;

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

/// One "last activity" card: the id is what the client sends back to
/// select the activity for the detail view.
#[derive(Serialize)]
pub struct ActivityCard {
    pub id: u64,
    pub name: String,
    pub sport_type: String,
    pub date: chrono::NaiveDate,
    pub distance_km: f64,
    /// Moving time formatted as `HHhMMminSS`
    pub moving_time: String,
    pub average_heartrate: Option<f64>,
    pub average_speed: Option<f64>,
}

/// List the athlete's most recent activities, newest first.
async fn get_recent_activities(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Query(params): Query<RecentQuery>,
) -> Result<(CookieJar, Json<Vec<ActivityCard>>)> {
    let mut session = session;
    session.tokens = state.strava.ensure_fresh(session.tokens).await?;

    let limit = params
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);

    let activities = fetch_or_empty(state.strava.recent_activities(&session.tokens, limit).await)?;

    let cards = activities
        .iter()
        .map(|a| ActivityCard {
            id: a.id,
            name: a.name.clone(),
            sport_type: a.sport_type.clone(),
            date: a.local_date(),
            distance_km: a.distance_km(),
            moving_time: a.moving_time_label(),
            average_heartrate: a.average_heartrate,
            average_speed: a.average_speed,
        })
        .collect();

    let jar = persist_session(jar, &state, &session)?;
    Ok((jar, Json(cards)))
}

// ─── Activity Detail ─────────────────────────────────────────

#[derive(Deserialize)]
struct ActivityDetailQuery {
    /// Pace smoothing window in samples (look-back and look-forward).
    window: Option<usize>,
}

/// Smoothed pace series; `minute_per_km` carries `null` for stopped
/// samples (infinite pace), matching the `labels` entries.
#[derive(Serialize)]
pub struct PaceSeries {
    pub window: usize,
    pub minute_per_km: Vec<f64>,
    pub labels: Vec<Option<String>>,
}

/// Per-activity detail: pace, heart rate, track and map bounds.
#[derive(Serialize)]
pub struct ActivityDetailResponse {
    pub activity_id: u64,
    /// Cumulative distance in kilometers, one per sample
    pub distance_km: Vec<f64>,
    pub pace: PaceSeries,
    pub heartrate: Option<Vec<f64>>,
    pub latlng: Option<Vec<(f64, f64)>>,
    pub bounds: Option<MapBounds>,
}

/// Get the stream-derived detail for one activity.
///
/// Unlike the calendar, a failed stream fetch propagates: there is
/// nothing sensible to render without the streams.
async fn get_activity_detail(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Path(activity_id): Path<u64>,
    Query(params): Query<ActivityDetailQuery>,
) -> Result<(CookieJar, Json<ActivityDetailResponse>)> {
    let mut session = session;
    session.tokens = state.strava.ensure_fresh(session.tokens).await?;

    let window = clamp_window(params.window);

    let stream = state
        .strava
        .activity_streams(&session.tokens, activity_id)
        .await?;

    let minute_per_km = smooth_pace(&stream.time, &stream.distance, window);
    let labels = minute_per_km.iter().map(|&p| format_pace(p)).collect();

    let bounds = stream
        .latlng
        .as_deref()
        .and_then(map_bounds);
    session.map_bounds = bounds;

    let distance_km = stream.distance.iter().map(|d| d / 1e3).collect();

    let response = ActivityDetailResponse {
        activity_id,
        distance_km,
        pace: PaceSeries {
            window,
            minute_per_km,
            labels,
        },
        heartrate: stream.heartrate,
        latlng: stream.latlng,
        bounds,
    };

    let jar = persist_session(jar, &state, &session)?;
    Ok((jar, Json(response)))
}
