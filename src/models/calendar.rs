// SPDX-License-Identifier: MIT

//! Calendar binning: aggregate activities into a yearly or monthly grid.
//!
//! Both views are pure functions over a slice of activities. Every bucket
//! in the requested range is always present, even with zero activities,
//! so the grid renders the same shape regardless of the data.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::models::Activity;
use crate::time_utils::seconds_to_whole_hours;

/// Smallest circle diameter in the year view (a month with no distance).
pub const CIRCLE_MIN: f64 = 40.0;
/// Largest circle diameter (the month with the maximum distance).
pub const CIRCLE_MAX: f64 = 140.0;

pub const MONTH_LABELS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

// ─── Year view ───────────────────────────────────────────────

/// One month bucket of the yearly calendar.
#[derive(Debug, Clone, Serialize)]
pub struct MonthBucket {
    /// Month number, 1-12
    pub month: u32,
    /// Display label ("JAN" .. "DEC")
    pub label: &'static str,
    /// Total distance in kilometers
    pub distance_km: f64,
    /// Total moving time in seconds
    pub moving_time_secs: i64,
    /// Whole hours of moving time, for the month label
    pub moving_hours: i64,
    /// Normalized circle diameter in `[CIRCLE_MIN, CIRCLE_MAX]`
    pub circle_size: f64,
}

/// Yearly calendar: exactly 12 month buckets.
#[derive(Debug, Clone, Serialize)]
pub struct YearCalendar {
    pub year: i32,
    pub months: Vec<MonthBucket>,
}

impl YearCalendar {
    /// Bin activities into 12 month buckets for the given year.
    ///
    /// Activities outside the year are ignored; months without activities
    /// get zero totals and the minimum circle size.
    pub fn build(year: i32, activities: &[Activity]) -> Self {
        let mut distance_km = [0.0f64; 12];
        let mut moving_secs = [0i64; 12];

        for activity in activities {
            let date = activity.local_date();
            if date.year() != year {
                continue;
            }
            let idx = (date.month() - 1) as usize;
            distance_km[idx] += activity.distance_km();
            moving_secs[idx] += activity.moving_time_secs;
        }

        let max_distance = distance_km.iter().cloned().fold(0.0f64, f64::max);

        let months = (0..12)
            .map(|idx| MonthBucket {
                month: idx as u32 + 1,
                label: MONTH_LABELS[idx],
                distance_km: distance_km[idx],
                moving_time_secs: moving_secs[idx],
                moving_hours: seconds_to_whole_hours(moving_secs[idx]),
                circle_size: normalize_circle(distance_km[idx], max_distance),
            })
            .collect();

        YearCalendar { year, months }
    }
}

/// Rescale a month's distance into the circle-size range.
///
/// The maximum month maps to `CIRCLE_MAX` and zero maps to `CIRCLE_MIN`.
/// An all-zero year would divide by zero, so it collapses to the minimum
/// size for every month.
fn normalize_circle(value: f64, max_value: f64) -> f64 {
    if max_value <= 0.0 {
        return CIRCLE_MIN;
    }
    (value / max_value) * (CIRCLE_MAX - CIRCLE_MIN) + CIRCLE_MIN
}

// ─── Month view ──────────────────────────────────────────────

/// Label for one activity in a day cell. The id is what the client
/// sends back to request the activity detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLabel {
    pub id: u64,
    pub name: String,
    pub sport_type: String,
    pub distance_km: i64,
}

/// One day cell of the month grid.
#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Day-of-month number for display
    pub day: u32,
    /// False for the leading/trailing days of adjacent months
    pub in_month: bool,
    pub activities: Vec<ActivityLabel>,
}

/// One Monday-to-Sunday row; always exactly 7 day cells.
#[derive(Debug, Clone, Serialize)]
pub struct WeekRow {
    pub days: Vec<DayCell>,
}

/// Monthly calendar grid spanning full ISO weeks.
#[derive(Debug, Clone, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub label: &'static str,
    /// First day of the grid: the Monday on/before the 1st
    pub grid_start: NaiveDate,
    /// Last day of the grid: the Sunday on/after the last day of the month
    pub grid_end: NaiveDate,
    pub weeks: Vec<WeekRow>,
}

impl MonthCalendar {
    /// Grid date range for a month: Monday on/before the 1st through
    /// Sunday on/after the last day. Returns `None` for an invalid month.
    pub fn grid_range(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let last = next_month.pred_opt()?;

        let start = first - Days::new(u64::from(first.weekday().num_days_from_monday()));
        let end = last + Days::new(u64::from(6 - last.weekday().num_days_from_monday()));
        Some((start, end))
    }

    /// Bin activities into a full-week day grid for the given month.
    ///
    /// Returns `None` for an invalid month. Activities whose local start
    /// date falls outside the grid range are ignored.
    pub fn build(year: i32, month: u32, activities: &[Activity]) -> Option<Self> {
        let (grid_start, grid_end) = Self::grid_range(year, month)?;

        let mut weeks = Vec::new();
        let mut current_week = Vec::with_capacity(7);
        let mut date = grid_start;

        while date <= grid_end {
            let day_activities = activities
                .iter()
                .filter(|a| a.local_date() == date)
                .map(|a| ActivityLabel {
                    id: a.id,
                    name: a.name.clone(),
                    sport_type: a.sport_type.clone(),
                    distance_km: a.distance_km().round() as i64,
                })
                .collect();

            current_week.push(DayCell {
                date,
                day: date.day(),
                in_month: date.month() == month && date.year() == year,
                activities: day_activities,
            });

            if current_week.len() == 7 {
                weeks.push(WeekRow {
                    days: std::mem::take(&mut current_week),
                });
            }
            date = date.succ_opt()?;
        }

        Some(MonthCalendar {
            year,
            month,
            label: MONTH_LABELS[(month - 1) as usize],
            grid_start,
            grid_end,
            weeks,
        })
    }
}
