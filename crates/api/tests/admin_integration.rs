//! Integration tests for admin endpoints.

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{
    admin_token, approve, book_ok, get_request, get_request_with_auth, json_request_with_auth,
    parse_response_body, post_request_with_auth, setup, user_token, TestContext, TODAY,
};
use serde_json::{json, Value};
use uuid::Uuid;

async fn admin_post(ctx: &TestContext, uri: &str) -> (StatusCode, Value) {
    let response = ctx.send(post_request_with_auth(uri, &admin_token())).await;
    let status = response.status();
    (status, parse_response_body(response).await)
}

async fn admin_post_json(ctx: &TestContext, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = ctx
        .send(json_request_with_auth(Method::POST, uri, body, &admin_token()))
        .await;
    let status = response.status();
    (status, parse_response_body(response).await)
}

async fn admin_get(ctx: &TestContext, uri: &str) -> (StatusCode, Value) {
    let response = ctx.send(get_request_with_auth(uri, &admin_token())).await;
    let status = response.status();
    (status, parse_response_body(response).await)
}

fn reservation_uri(id: &str, action: &str) -> String {
    format!("/api/v1/admin/reservations/{}/{}", id, action)
}

async fn profile_of(ctx: &TestContext, user_id: &str) -> Value {
    let (_, users) = admin_get(ctx, "/api/v1/admin/users").await;
    users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"] == user_id)
        .cloned()
        .unwrap_or_else(|| panic!("no profile for {}", user_id))
}

// ============================================================================
// Access
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let ctx = setup().await;

    let response = ctx
        .send(get_request_with_auth(
            "/api/v1/admin/stats",
            &user_token("user-1", "Ana"),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let ctx = setup().await;

    let response = ctx.send(get_request("/api/v1/admin/users")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_postpone_and_cancel_require_admin_caller() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let token = user_token("user-1", "Ana");
    let id = book_ok(&ctx, &token, court.id, "10:00").await;
    assert_eq!(approve(&ctx, &id).await.status(), StatusCode::OK);

    let response = ctx
        .send(json_request_with_auth(
            Method::POST,
            &reservation_uri(&id, "postpone"),
            json!({"date": "2026-06-02", "time": "18:30"}),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .send(post_request_with_auth(&reservation_uri(&id, "cancel"), &token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, approved) = admin_get(&ctx, "/api/v1/admin/reservations?status=approved").await;
    assert_eq!(approved[0]["time"], "10:00");
}

// ============================================================================
// Moderation
// ============================================================================

#[tokio::test]
async fn test_approve_pending_reservation() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;

    let response = approve(&ctx, &id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["state"], "approved");

    // Approving twice is an invalid transition.
    let response = approve(&ctx, &id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn test_approve_competing_request_conflicts() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let first = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;
    let second = book_ok(&ctx, &user_token("user-2", "Ben"), court.id, "10:00").await;

    assert_eq!(approve(&ctx, &first).await.status(), StatusCode::OK);

    let response = approve(&ctx, &second).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_simultaneous_approvals_leave_one_approved() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let first = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;
    let second = book_ok(&ctx, &user_token("user-2", "Ben"), court.id, "10:00").await;

    let (a, b) = tokio::join!(approve(&ctx, &first), approve(&ctx, &second));
    let mut statuses = vec![a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let (_, approved) = admin_get(&ctx, "/api/v1/admin/reservations?status=approved").await;
    assert_eq!(approved.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_approve_unknown_reservation_returns_404() {
    let ctx = setup().await;

    let response = approve(&ctx, &Uuid::new_v4().to_string()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reject_with_reason() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;

    let (status, body) = admin_post_json(
        &ctx,
        &reservation_uri(&id, "reject"),
        json!({"reason": "Tournament practice"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "rejected");
    assert_eq!(body["reason"], "Tournament practice");

    // Rejection is not a penalty.
    let profile = profile_of(&ctx, "user-1").await;
    assert_eq!(profile["stars"], 5);
}

#[tokio::test]
async fn test_reject_without_body_uses_default_reason() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;

    let (status, body) = admin_post(&ctx, &reservation_uri(&id, "reject")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"], "Rejected by administrator");
}

#[tokio::test]
async fn test_reject_with_malformed_reason_is_refused() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;

    let (status, body) =
        admin_post_json(&ctx, &reservation_uri(&id, "reject"), json!({"reason": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, pending) = admin_get(&ctx, "/api/v1/admin/reservations/pending").await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_postpone_moves_and_approves() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;

    let (status, body) = admin_post_json(
        &ctx,
        &reservation_uri(&id, "postpone"),
        json!({"date": "2026-06-02", "time": "18:30"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "approved");
    assert_eq!(body["date"], "2026-06-02");
    assert_eq!(body["time"], "18:30");
    assert_eq!(body["dateTime"], "2026-06-02T18:30:00Z");

    // The original slot is free again.
    let response = ctx
        .send(get_request(&format!(
            "/api/v1/courts/{}/availability?date={}&time=10:00",
            court.id, TODAY
        )))
        .await;
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "available");
}

#[tokio::test]
async fn test_postpone_onto_approved_slot_conflicts() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let held = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "12:00").await;
    let moved = book_ok(&ctx, &user_token("user-2", "Ben"), court.id, "10:00").await;
    assert_eq!(approve(&ctx, &held).await.status(), StatusCode::OK);

    let (status, body) = admin_post_json(
        &ctx,
        &reservation_uri(&moved, "postpone"),
        json!({"date": TODAY, "time": "12:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_postpone_rejected_reservation_is_refused() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;
    admin_post(&ctx, &reservation_uri(&id, "reject")).await;

    let (status, body) = admin_post_json(
        &ctx,
        &reservation_uri(&id, "postpone"),
        json!({"date": TODAY, "time": "14:00"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn test_admin_cancel_approved_without_penalty() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;
    approve(&ctx, &id).await;

    let (status, body) = admin_post(&ctx, &reservation_uri(&id, "cancel")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "cancelled");
    assert_eq!(body["reason"], "Cancelled by administrator");

    let profile = profile_of(&ctx, "user-1").await;
    assert_eq!(profile["stars"], 5);
    assert_eq!(profile["noShowCount"], 0);
}

#[tokio::test]
async fn test_admin_cancel_pending_is_refused() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;

    let (status, _) = admin_post(&ctx, &reservation_uri(&id, "cancel")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_reservations_by_status() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let token = user_token("user-1", "Ana");
    let approved = book_ok(&ctx, &token, court.id, "10:00").await;
    book_ok(&ctx, &token, court.id, "11:00").await;
    book_ok(&ctx, &token, court.id, "12:00").await;
    approve(&ctx, &approved).await;

    let (status, all) = admin_get(&ctx, "/api/v1/admin/reservations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, pending) = admin_get(&ctx, "/api/v1/admin/reservations?status=pending").await;
    let times: Vec<&str> = pending
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["time"].as_str().unwrap())
        .collect();
    assert_eq!(times, vec!["11:00", "12:00"]);

    let (_, pending) = admin_get(&ctx, "/api/v1/admin/reservations/pending").await;
    assert_eq!(pending.as_array().unwrap().len(), 2);

    let (_, approved_list) = admin_get(&ctx, "/api/v1/admin/reservations?status=approved").await;
    assert_eq!(approved_list[0]["id"], approved);

    let (status, body) = admin_get(&ctx, "/api/v1/admin/reservations?status=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

// ============================================================================
// Sweeps
// ============================================================================

#[tokio::test]
async fn test_sweep_expires_pending_and_marks_no_shows() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let stale = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "09:00").await;
    let missed = book_ok(&ctx, &user_token("user-2", "Ben"), court.id, "09:30").await;
    let later = book_ok(&ctx, &user_token("user-3", "Cia"), court.id, "16:00").await;
    approve(&ctx, &missed).await;

    ctx.advance(Duration::hours(2));
    let (status, body) = admin_post(&ctx, "/api/v1/admin/reservations/sweep").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expired"]["transitioned"], json!([stale]));
    assert_eq!(body["noShows"]["transitioned"], json!([missed]));

    let (_, reservation) = admin_get(&ctx, &format!("/api/v1/reservations/{}", later)).await;
    assert_eq!(reservation["state"], "pending");

    let ana = profile_of(&ctx, "user-1").await;
    assert_eq!(ana["stars"], 5);
    let ben = profile_of(&ctx, "user-2").await;
    assert_eq!(ben["stars"], 4);
    assert_eq!(ben["noShowCount"], 1);

    // A second pass finds nothing left to do.
    let (_, body) = admin_post(&ctx, "/api/v1/admin/reservations/sweep").await;
    assert_eq!(body["expired"]["examined"], 0);
    assert_eq!(body["noShows"]["examined"], 0);
    let ben = profile_of(&ctx, "user-2").await;
    assert_eq!(ben["stars"], 4);
}

#[tokio::test]
async fn test_no_show_check_respects_grace_period() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    let id = book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "08:30").await;
    approve(&ctx, &id).await;

    // Five minutes after the start is still within the grace period.
    ctx.advance(Duration::minutes(35));
    let (status, body) = admin_post(&ctx, &reservation_uri(&id, "no-show-check")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transitioned"], false);
    assert_eq!(body["reservation"]["state"], "approved");

    ctx.advance(Duration::minutes(10));
    let (_, body) = admin_post(&ctx, &reservation_uri(&id, "no-show-check")).await;
    assert_eq!(body["transitioned"], true);
    assert_eq!(body["reservation"]["state"], "no_show");
    assert_eq!(body["reservation"]["reason"], "User did not show up");

    // Checking again does not penalize twice.
    let (_, body) = admin_post(&ctx, &reservation_uri(&id, "no-show-check")).await;
    assert_eq!(body["transitioned"], false);
    let profile = profile_of(&ctx, "user-1").await;
    assert_eq!(profile["stars"], 4);
}

// ============================================================================
// Courts
// ============================================================================

#[tokio::test]
async fn test_create_court() {
    let ctx = setup().await;

    let (status, body) = admin_post_json(
        &ctx,
        "/api/v1/admin/courts",
        json!({"name": "Court 2 - Padel", "sport": "padel", "minimumPartySize": 2, "order": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Court 2 - Padel");
    assert_eq!(body["disabled"], false);

    let response = ctx.send(get_request("/api/v1/courts")).await;
    let courts = parse_response_body(response).await;
    assert_eq!(courts.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_create_court_with_taken_name_conflicts() {
    let ctx = setup().await;

    let (status, body) = admin_post_json(
        &ctx,
        "/api/v1/admin/courts",
        json!({"name": "Court 1 - Basketball", "sport": "basketball", "minimumPartySize": 4}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_disable_and_enable_court() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 4 - Basketball").await;

    let (status, body) = admin_post_json(
        &ctx,
        &format!("/api/v1/admin/courts/{}/disable", court.id),
        json!({"mode": "rest_of_today"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disabled"], true);
    assert_eq!(body["disabledAt"], "2026-06-01T08:00:00Z");
    assert_eq!(body["disabledUntil"], "2026-06-02T00:00:00Z");

    let (status, body) =
        admin_post(&ctx, &format!("/api/v1/admin/courts/{}/enable", court.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disabled"], false);
    assert!(body.get("disabledAt").is_none());
    assert!(body.get("disabledUntil").is_none());
}

#[tokio::test]
async fn test_disable_until_date_with_duration() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Football").await;

    let (status, body) = admin_post_json(
        &ctx,
        &format!("/api/v1/admin/courts/{}/disable", court.id),
        json!({
            "mode": "until_date",
            "date": "2026-06-03",
            "span": {"kind": "with_duration", "minutes": 90, "startTime": "14:00"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disabledAt"], "2026-06-03T14:00:00Z");
    assert_eq!(body["disabledUntil"], "2026-06-03T15:30:00Z");
}

#[tokio::test]
async fn test_disable_without_minutes_is_rejected() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 4 - Basketball").await;

    let (status, body) = admin_post_json(
        &ctx,
        &format!("/api/v1/admin/courts/{}/disable", court.id),
        json!({"mode": "duration"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let response = ctx
        .send(get_request(&format!("/api/v1/courts/{}", court.id)))
        .await;
    let body = parse_response_body(response).await;
    assert_eq!(body["disabled"], false);
}

#[tokio::test]
async fn test_disable_unknown_court_returns_404() {
    let ctx = setup().await;

    let (status, _) = admin_post_json(
        &ctx,
        &format!("/api/v1/admin/courts/{}/disable", Uuid::new_v4()),
        json!({"mode": "permanent"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_list_users_and_their_reservations() {
    let ctx = setup().await;
    let court = ctx.court_named("Court 1 - Basketball").await;
    book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "10:00").await;
    book_ok(&ctx, &user_token("user-1", "Ana"), court.id, "14:00").await;
    book_ok(&ctx, &user_token("user-2", "Ben"), court.id, "11:00").await;

    let (status, users) = admin_get(&ctx, "/api/v1/admin/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    let (status, reservations) =
        admin_get(&ctx, "/api/v1/admin/users/user-1/reservations").await;
    assert_eq!(status, StatusCode::OK);
    let times: Vec<&str> = reservations
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["time"].as_str().unwrap())
        .collect();
    assert_eq!(times, vec!["14:00", "10:00"]);
}

#[tokio::test]
async fn test_set_user_rating_is_clamped() {
    let ctx = setup().await;
    ctx.send(get_request_with_auth(
        "/api/v1/me/profile",
        &user_token("user-1", "Ana"),
    ))
    .await;

    for (requested, stored) in [(3, 3), (0, 1), (9, 5)] {
        let response = ctx
            .send(json_request_with_auth(
                Method::PUT,
                "/api/v1/admin/users/user-1/rating",
                json!({"stars": requested}),
                &admin_token(),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response).await;
        assert_eq!(body["stars"], stored, "requested {}", requested);
    }
}

#[tokio::test]
async fn test_set_rating_of_unknown_user_returns_404() {
    let ctx = setup().await;

    let response = ctx
        .send(json_request_with_auth(
            Method::PUT,
            "/api/v1/admin/users/nobody/rating",
            json!({"stars": 3}),
            &admin_token(),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_stats() {
    let ctx = setup().await;
    let basketball = ctx.court_named("Court 1 - Basketball").await;
    let padel = ctx.court_named("Court 1 - Padel").await;
    let token = user_token("user-1", "Ana");
    let approved = book_ok(&ctx, &token, basketball.id, "10:00").await;
    let rejected = book_ok(&ctx, &token, basketball.id, "11:00").await;
    book_ok(&ctx, &user_token("user-2", "Ben"), padel.id, "12:00").await;
    approve(&ctx, &approved).await;
    admin_post(&ctx, &reservation_uri(&rejected, "reject")).await;
    admin_post_json(
        &ctx,
        &format!("/api/v1/admin/courts/{}/disable", padel.id),
        json!({"mode": "permanent"}),
    )
    .await;

    let (status, stats) = admin_get(&ctx, "/api/v1/admin/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalReservations"], 3);
    assert_eq!(stats["todayReservations"], 3);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["approved"], 1);
    assert_eq!(stats["rejected"], 1);
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalCourts"], 9);
    assert_eq!(stats["disabledCourts"], 1);
    assert_eq!(stats["activeCourts"], 8);

    let basketball_stats = stats["bySport"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["sport"] == "basketball")
        .cloned()
        .unwrap();
    assert_eq!(basketball_stats["total"], 2);
    assert_eq!(basketball_stats["approved"], 1);
    assert_eq!(basketball_stats["rejected"], 1);
}
