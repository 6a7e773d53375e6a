// SPDX-License-Identifier: MIT

//! Shared helpers for duration formatting.

/// Format a duration in seconds as `HHhMMminSS` (e.g. `01h23min45`).
pub fn seconds_to_hms(seconds: i64) -> String {
    let hours = seconds / 3600;
    let remainder = seconds % 3600;
    let minutes = remainder / 60;
    let secs = remainder % 60;
    format!("{:02}h{:02}min{:02}", hours, minutes, secs)
}

/// Whole hours in a duration, truncated.
pub fn seconds_to_whole_hours(seconds: i64) -> i64 {
    seconds / 3600
}
