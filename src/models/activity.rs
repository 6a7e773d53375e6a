// SPDX-License-Identifier: MIT

//! Activity model and upstream ingress parsing.
//!
//! The Strava list endpoint returns loosely-shaped JSON; we deserialize it
//! into [`RawActivity`] at the boundary and immediately convert into the
//! validated [`Activity`] record that the rest of the pipeline uses.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::time_utils::seconds_to_hms;

/// A validated exercise activity.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title
    pub name: String,
    /// Sport type (Run, Ride, Hike, ...). "Walk" is normalized to "Hike".
    pub sport_type: String,
    /// Start date/time in the athlete's local timezone
    pub start_date_local: NaiveDateTime,
    /// Distance in meters
    pub distance_meters: f64,
    /// Moving time in seconds
    pub moving_time_secs: i64,
    /// Elapsed time in seconds
    pub elapsed_time_secs: i64,
    pub total_elevation_gain: Option<f64>,
    pub elev_high: Option<f64>,
    pub elev_low: Option<f64>,
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_cadence: Option<f64>,
    /// Start position as (latitude, longitude)
    pub start_latlng: Option<(f64, f64)>,
}

impl Activity {
    /// Distance in kilometers.
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1e3
    }

    /// Local calendar date the activity started on.
    pub fn local_date(&self) -> NaiveDate {
        self.start_date_local.date()
    }

    /// Moving time formatted as `HHhMMminSS`.
    pub fn moving_time_label(&self) -> String {
        seconds_to_hms(self.moving_time_secs)
    }
}

/// Loose activity payload as returned by the Strava list endpoint.
///
/// Unknown fields are ignored; known fields are all optional so that a
/// single malformed record never fails a whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawActivity {
    pub id: Option<u64>,
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub sport_type: Option<String>,
    pub start_date_local: Option<String>,
    pub distance: Option<f64>,
    pub moving_time: Option<i64>,
    pub elapsed_time: Option<i64>,
    pub total_elevation_gain: Option<f64>,
    pub elev_high: Option<f64>,
    pub elev_low: Option<f64>,
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_cadence: Option<f64>,
    pub start_latlng: Option<Vec<f64>>,
}

/// Reasons a raw activity record is rejected at ingress.
#[derive(Debug, thiserror::Error)]
pub enum ActivityParseError {
    #[error("activity record has no id")]
    MissingId,
    #[error("activity {0} has no start date")]
    MissingStartDate(u64),
    #[error("activity {0} has unparseable start date '{1}'")]
    BadStartDate(u64, String),
}

impl TryFrom<RawActivity> for Activity {
    type Error = ActivityParseError;

    fn try_from(raw: RawActivity) -> Result<Self, Self::Error> {
        let id = raw.id.ok_or(ActivityParseError::MissingId)?;
        let start_raw = raw
            .start_date_local
            .ok_or(ActivityParseError::MissingStartDate(id))?;
        let start_date_local = parse_local_datetime(&start_raw)
            .ok_or_else(|| ActivityParseError::BadStartDate(id, start_raw.clone()))?;

        let sport_type = match raw.sport_type.as_deref() {
            // Make all walks into hikes for consistency
            Some("Walk") => "Hike".to_string(),
            Some(other) => other.to_string(),
            None => "Workout".to_string(),
        };

        let start_latlng = raw
            .start_latlng
            .filter(|v| v.len() == 2)
            .map(|v| (v[0], v[1]));

        Ok(Activity {
            id,
            name: raw.name.unwrap_or_default(),
            sport_type,
            start_date_local,
            distance_meters: raw.distance.unwrap_or(0.0),
            moving_time_secs: raw.moving_time.unwrap_or(0),
            elapsed_time_secs: raw.elapsed_time.unwrap_or(0),
            total_elevation_gain: raw.total_elevation_gain,
            elev_high: raw.elev_high,
            elev_low: raw.elev_low,
            average_speed: raw.average_speed,
            max_speed: raw.max_speed,
            average_heartrate: raw.average_heartrate,
            max_heartrate: raw.max_heartrate,
            average_cadence: raw.average_cadence,
            start_latlng,
        })
    }
}

/// Parse Strava's `start_date_local`, which arrives either as a naive
/// local timestamp or with a bogus trailing `Z`.
fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.strip_suffix('Z').unwrap_or(raw);
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Convert a page of raw records into validated activities,
/// logging and dropping the records that fail to parse.
pub fn parse_activities(raw: Vec<RawActivity>) -> Vec<Activity> {
    raw.into_iter()
        .filter_map(|r| match Activity::try_from(r) {
            Ok(a) => Some(a),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed activity record");
                None
            }
        })
        .collect()
}
