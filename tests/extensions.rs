//! Extension claims: the auto-approval threshold, the durable delayed
//! approval sweep, and admin decisions.

use axum::http::StatusCode;
use rusqlite::params;
use serde_json::json;

mod common;
use common::*;

use bindery::db::queries;
use bindery::licensing::finalize_due_claims;
use bindery::models::ClaimStatus;

async fn file_claim(pool: bindery::db::DbPool, code: &str) -> serde_json::Value {
    let response = send_json(
        test_app(pool),
        "POST",
        "/licenses/extensions",
        None,
        json!({
            "license_code": code,
            "email": "reader@example.com",
            "reason": "My old laptop died and I bought a replacement",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn first_two_claims_auto_approve_third_requires_review() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    let first = file_claim(pool.clone(), &license.code).await;
    assert_eq!(first["success"], true);
    assert_eq!(first["requires_review"], false);

    let second = file_claim(pool.clone(), &license.code).await;
    assert_eq!(second["requires_review"], false);

    let third = file_claim(pool.clone(), &license.code).await;
    assert_eq!(third["requires_review"], true);

    // Auto-approvable claims carry a persisted schedule 120-300s out;
    // review claims carry none.
    let conn = pool.get().unwrap();
    let now = queries::now();
    for (body, auto) in [(&first, true), (&second, true), (&third, false)] {
        let claim = queries::get_claim_by_number(&conn, body["claim_number"].as_str().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(claim.status, ClaimStatus::Pending);
        match (auto, claim.scheduled_approval_at) {
            (true, Some(at)) => {
                assert!(at >= now + 110 && at <= now + 310, "schedule out of range");
            }
            (false, None) => {}
            other => panic!("unexpected schedule state: {other:?}"),
        }
    }
}

#[tokio::test]
async fn short_reason_rejected_before_any_state() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    let response = send_json(
        test_app(pool.clone()),
        "POST",
        "/licenses/extensions",
        None,
        json!({
            "license_code": license.code,
            "email": "reader@example.com",
            "reason": "short",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let conn = pool.get().unwrap();
    assert_eq!(
        queries::count_claims_for_license(&conn, &license.id).unwrap(),
        0
    );
}

#[tokio::test]
async fn sweep_finalizes_due_claims_and_raises_allowance() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    let claim = file_claim(pool.clone(), &license.code).await;
    let claim_number = claim["claim_number"].as_str().unwrap().to_string();

    let mut conn = pool.get().unwrap();

    // Not due yet: the sweep must leave it alone.
    assert_eq!(finalize_due_claims(&mut conn, queries::now()).unwrap(), 0);

    conn.execute(
        "UPDATE extension_claims SET scheduled_approval_at = ?1 WHERE claim_number = ?2",
        params![queries::now() - 1, &claim_number],
    )
    .unwrap();

    assert_eq!(finalize_due_claims(&mut conn, queries::now()).unwrap(), 1);

    let claim = queries::get_claim_by_number(&conn, &claim_number)
        .unwrap()
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::AutoApproved);
    assert_eq!(claim.decided_by.as_deref(), Some("system"));
    assert!(claim.decided_at.is_some());

    let license = queries::get_license_by_id(&conn, &license.id).unwrap().unwrap();
    assert_eq!(license.max_devices, 3);

    // Running the sweep again finds nothing.
    assert_eq!(finalize_due_claims(&mut conn, queries::now()).unwrap(), 0);
    let license = queries::get_license_by_id(&conn, &license.id).unwrap().unwrap();
    assert_eq!(license.max_devices, 3);
}

#[tokio::test]
async fn admin_approval_increments_allowance_exactly_once() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    let claim = file_claim(pool.clone(), &license.code).await;
    let claim_number = claim["claim_number"].as_str().unwrap().to_string();

    let response = send_json(
        test_app(pool.clone()),
        "PATCH",
        &format!("/admin/extensions/{claim_number}"),
        Some(ADMIN_TOKEN),
        json!({ "action": "approve", "decided_by": "ops@bindery.press" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["new_max_devices"], 3);

    // A second approval of the same claim conflicts and changes nothing.
    let response = send_json(
        test_app(pool.clone()),
        "PATCH",
        &format!("/admin/extensions/{claim_number}"),
        Some(ADMIN_TOKEN),
        json!({ "action": "approve", "decided_by": "ops@bindery.press" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let conn = pool.get().unwrap();
    let license = queries::get_license_by_id(&conn, &license.id).unwrap().unwrap();
    assert_eq!(license.max_devices, 3);
}

#[tokio::test]
async fn admin_decision_beats_sweep() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    let claim = file_claim(pool.clone(), &license.code).await;
    let claim_number = claim["claim_number"].as_str().unwrap().to_string();

    let response = send_json(
        test_app(pool.clone()),
        "PATCH",
        &format!("/admin/extensions/{claim_number}"),
        Some(ADMIN_TOKEN),
        json!({ "action": "reject", "decided_by": "ops@bindery.press" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The claim's schedule is still in the table; the sweep must skip the
    // already-decided claim rather than fail.
    let mut conn = pool.get().unwrap();
    conn.execute(
        "UPDATE extension_claims SET scheduled_approval_at = ?1 WHERE claim_number = ?2",
        params![queries::now() - 1, &claim_number],
    )
    .unwrap();
    assert_eq!(finalize_due_claims(&mut conn, queries::now()).unwrap(), 0);

    let claim = queries::get_claim_by_number(&conn, &claim_number)
        .unwrap()
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::Rejected);
    let license = queries::get_license_by_id(&conn, &license.id).unwrap().unwrap();
    assert_eq!(license.max_devices, 2);
}

#[tokio::test]
async fn decision_requires_actor_identity() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };
    let claim = file_claim(pool.clone(), &license.code).await;
    let claim_number = claim["claim_number"].as_str().unwrap();

    let response = send_json(
        test_app(pool.clone()),
        "PATCH",
        &format!("/admin/extensions/{claim_number}"),
        Some(ADMIN_TOKEN),
        json!({ "action": "approve", "decided_by": "  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn claim_against_unknown_license_fails_in_payload() {
    let pool = test_pool();
    let response = send_json(
        test_app(pool),
        "POST",
        "/licenses/extensions",
        None,
        json!({
            "license_code": "ZZZZ-ZZZZ-ZZZZ-ZZZZ",
            "email": "reader@example.com",
            "reason": "My old laptop died and I bought a replacement",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn admin_routes_require_token() {
    let pool = test_pool();
    let response = send_get(test_app(pool.clone()), "/admin/extensions", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send_get(
        test_app(pool),
        "/admin/extensions",
        Some("wrong-token"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
