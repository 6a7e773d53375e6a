// SPDX-License-Identifier: MIT

//! Calendar endpoint integration tests.
//!
//! The test app points at an unreachable Strava backend, so these tests
//! exercise the degraded path: the grid must still render with zero
//! buckets when the activity fetch fails.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

/// New sessions start in the current year's view.
fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}

#[tokio::test]
async fn test_calendar_renders_empty_year_when_upstream_down() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/calendar")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["kind"], "year");
    let months = json["months"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    for bucket in months {
        assert_eq!(bucket["distance_km"], 0.0);
        assert_eq!(bucket["circle_size"], 40.0);
    }
}

#[tokio::test]
async fn test_calendar_sets_refreshed_session_cookie() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/calendar")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("rt_session="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_navigate_select_month_returns_month_grid() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calendar/navigate")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"select-month","month":3}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["kind"], "month");
    assert_eq!(json["month"], 3);
    assert_eq!(json["label"], "MAR");

    // Full-week grid: every row has 7 day cells
    let weeks = json["weeks"].as_array().unwrap();
    assert!(!weeks.is_empty());
    for week in weeks {
        assert_eq!(week["days"].as_array().unwrap().len(), 7);
    }
}

#[tokio::test]
async fn test_navigate_persists_view_in_cookie() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calendar/navigate")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"select-month","month":7}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Decode the returned cookie and check the stored view moved
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    let jwt = set_cookie
        .trim_start_matches("rt_session=")
        .split(';')
        .next()
        .unwrap();

    let stored =
        run_together::middleware::auth::decode_session(jwt, &state.config.session_signing_key)
            .unwrap();
    assert_eq!(
        stored.view,
        run_together::models::CalendarView::Month {
            year: current_year(),
            month: 7
        }
    );
}

#[tokio::test]
async fn test_navigate_prev_year_from_default_view() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calendar/navigate")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"prev-year"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["kind"], "year");
    assert_eq!(json["year"], current_year() - 1);
}
