// SPDX-License-Identifier: MIT

//! Run-Together: a personal training calendar over Strava data.
//!
//! This crate provides the backend API for a yearly/monthly training
//! dashboard: it signs users in via Strava OAuth, bins their activities
//! into calendar views and derives smoothed pace series per activity.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::StravaService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaService,
}
