// SPDX-License-Identifier: MIT

//! Stream analysis: pace smoothing, pace formatting, map bounds.

use crate::models::MapBounds;

/// Default look-back/forward window for pace smoothing, in samples.
pub const DEFAULT_PACE_WINDOW: usize = 10;
/// Upper bound for the caller-supplied window.
pub const MAX_PACE_WINDOW: usize = 500;

/// Resolve a caller-supplied smoothing window: default when absent,
/// clamped to [`MAX_PACE_WINDOW`] when oversized.
pub fn clamp_window(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_PACE_WINDOW).min(MAX_PACE_WINDOW)
}

/// Smooth a raw time/distance sample stream into pace (minutes per km).
///
/// For index `i` the pace is computed over the window
/// `[max(0, i - window), min(n - 1, i + window)]`; near the boundaries the
/// window is clamped, not reflected. If no distance was covered within the
/// window the pace is `+infinity`, which marks a stop.
///
/// `time` is seconds, `distance` is meters; both must be the same length
/// (guaranteed by stream ingress validation).
pub fn smooth_pace(time: &[f64], distance: &[f64], window: usize) -> Vec<f64> {
    debug_assert_eq!(time.len(), distance.len());
    let n = time.len();

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(window);
            let hi = (i + window).min(n - 1);

            let dd_km = (distance[hi] - distance[lo]) / 1e3;
            if dd_km == 0.0 {
                return f64::INFINITY;
            }
            let dt_min = (time[hi] - time[lo]) / 60.0;
            dt_min / dd_km
        })
        .collect()
}

/// Format a fractional-minutes pace as `M:SS`.
///
/// Returns `None` for non-finite values (stopped samples); JSON payloads
/// carry those as `null`, matching how serde_json serializes the
/// corresponding infinite float.
pub fn format_pace(minutes_per_km: f64) -> Option<String> {
    if !minutes_per_km.is_finite() || minutes_per_km < 0.0 {
        return None;
    }

    let mut minutes = minutes_per_km.trunc() as i64;
    let mut seconds = ((minutes_per_km - minutes as f64) * 60.0).round() as i64;
    // Rounding can carry into the next minute (4.9999 -> "5:00", not "4:60")
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    Some(format!("{}:{:02}", minutes, seconds))
}

/// Bounding box of a lat/lng track, or `None` for an empty track.
pub fn map_bounds(latlng: &[(f64, f64)]) -> Option<MapBounds> {
    let first = latlng.first()?;
    let mut min_lat = first.0;
    let mut max_lat = first.0;
    let mut min_lng = first.1;
    let mut max_lng = first.1;

    for &(lat, lng) in &latlng[1..] {
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
        min_lng = min_lng.min(lng);
        max_lng = max_lng.max(lng);
    }

    Some(MapBounds {
        south_west: (min_lat, min_lng),
        north_east: (max_lat, max_lng),
    })
}
