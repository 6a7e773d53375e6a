// SPDX-License-Identifier: MIT

//! Per-activity sample streams from the Strava streams endpoint.
//!
//! A stream set is a group of parallel arrays (time, distance, heartrate,
//! latlng) sharing the same length and index alignment: index `i` across
//! all arrays refers to the same instant. That invariant is checked once
//! here at ingress so downstream code can index freely.

use serde::{Deserialize, Serialize};

/// Raw `key_by_type=true` streams payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStreamSet {
    pub time: Option<RawStream<f64>>,
    pub distance: Option<RawStream<f64>>,
    pub heartrate: Option<RawStream<f64>>,
    pub latlng: Option<RawStream<[f64; 2]>>,
}

/// One raw stream; Strava wraps the samples in a `data` array.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStream<T> {
    pub data: Vec<T>,
}

/// Validated, index-aligned sample streams for one activity.
#[derive(Debug, Clone)]
pub struct SampleStream {
    /// Elapsed seconds since activity start, non-decreasing
    pub time: Vec<f64>,
    /// Cumulative distance in meters, non-decreasing
    pub distance: Vec<f64>,
    pub heartrate: Option<Vec<f64>>,
    pub latlng: Option<Vec<(f64, f64)>>,
}

impl SampleStream {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StreamParseError {
    #[error("stream set is missing the '{0}' stream")]
    MissingStream(&'static str),
    #[error("stream '{name}' has {got} samples, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        got: usize,
        expected: usize,
    },
}

impl TryFrom<RawStreamSet> for SampleStream {
    type Error = StreamParseError;

    fn try_from(raw: RawStreamSet) -> Result<Self, Self::Error> {
        let time = raw
            .time
            .ok_or(StreamParseError::MissingStream("time"))?
            .data;
        let distance = raw
            .distance
            .ok_or(StreamParseError::MissingStream("distance"))?
            .data;

        let expected = time.len();
        if distance.len() != expected {
            return Err(StreamParseError::LengthMismatch {
                name: "distance",
                got: distance.len(),
                expected,
            });
        }

        let heartrate = raw.heartrate.map(|s| s.data);
        if let Some(hr) = &heartrate {
            if hr.len() != expected {
                return Err(StreamParseError::LengthMismatch {
                    name: "heartrate",
                    got: hr.len(),
                    expected,
                });
            }
        }

        let latlng = raw
            .latlng
            .map(|s| s.data.into_iter().map(|p| (p[0], p[1])).collect::<Vec<_>>());
        if let Some(ll) = &latlng {
            if ll.len() != expected {
                return Err(StreamParseError::LengthMismatch {
                    name: "latlng",
                    got: ll.len(),
                    expected,
                });
            }
        }

        Ok(SampleStream {
            time,
            distance,
            heartrate,
            latlng,
        })
    }
}

/// Bounding box of an activity track, kept in the session so the
/// frontend can restore the last map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// (min latitude, min longitude)
    pub south_west: (f64, f64),
    /// (max latitude, max longitude)
    pub north_east: (f64, f64),
}
