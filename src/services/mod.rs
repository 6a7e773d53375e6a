// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod analysis;
pub mod strava;

pub use strava::{OAuthResult, StravaClient, StravaService};
