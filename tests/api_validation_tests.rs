// SPDX-License-Identifier: MIT

//! Input validation and upstream-failure tests.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_navigate_rejects_unknown_action() {
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
                .body(Body::from(r#"{"action":"teleport"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_navigate_rejects_malformed_json() {
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
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_navigate_out_of_range_month_is_noop() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    // select-month with month 13 leaves the year view unchanged
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/calendar/navigate")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"action":"select-month","month":13}"#))
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
}

#[tokio::test]
async fn test_activity_detail_rejects_non_numeric_id() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/activities/not-a-number")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recent_activities_degrade_to_empty_list() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    // Cards degrade like the calendar does: an unreachable upstream
    // yields an empty list, not an error. This also pins the route
    // precedence: "recent" must not be captured as an activity id.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/activities/recent?limit=10000")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_activity_detail_propagates_upstream_failure() {
    let (app, state) = common::create_test_app();
    let session = common::test_session();
    let cookie = common::session_cookie_header(&session, &state);

    // Streams cannot be degraded like the calendar can; the handler
    // must surface the upstream failure.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/activities/12345")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_expired_tokens_hit_refresh_and_fail_as_gateway_error() {
    let (app, state) = common::create_test_app();

    // Tokens already expired: every handler refreshes first, and with the
    // OAuth endpoint unreachable that surfaces as a gateway error.
    let mut session = common::test_session();
    session.tokens.expires_at = 0;
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

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_security_headers_present_on_api_responses() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(headers.get("Cache-Control").unwrap(), "no-store");
}
