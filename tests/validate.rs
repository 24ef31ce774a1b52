//! License validation over HTTP: code normalization, check ordering, and
//! the 200-with-payload failure contract.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

use bindery::db::queries;

#[tokio::test]
async fn validate_accepts_equivalent_code_forms() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    let canonical = license.code.clone();
    let lowercase = canonical.to_lowercase();
    let no_hyphens: String = canonical.chars().filter(|c| *c != '-').collect();
    let spaced = canonical.replace('-', " ");

    for variant in [canonical, lowercase, no_hyphens, spaced] {
        let app = test_app(pool.clone());
        let encoded = variant.replace(' ', "%20");
        let response = send_get(app, &format!("/licenses/validate?code={encoded}"), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["valid"], true, "variant {variant:?} should validate");
        assert_eq!(body["license_id"], license.id);
        assert_eq!(body["max_devices"], 2);
        assert_eq!(body["active_device_count"], 0);
    }
}

#[tokio::test]
async fn validate_post_body_works() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 3)
    };

    let response = send_json(
        test_app(pool),
        "POST",
        "/licenses/validate",
        None,
        json!({ "license_code": license.code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["email"], "reader@example.com");
}

#[tokio::test]
async fn unknown_code_is_logical_failure_not_404() {
    let pool = test_pool();
    let response = send_get(
        test_app(pool),
        "/licenses/validate?code=ZZZZ-ZZZZ-ZZZZ-ZZZZ",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn revoked_wins_over_inactive() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        let license = create_test_license(&conn, 2);
        queries::set_license_revoked(&conn, &license.id, true).unwrap();
        queries::set_license_active(&conn, &license.id, false).unwrap();
        license
    };

    let response = send_get(
        test_app(pool),
        &format!("/licenses/validate?code={}", license.code),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["error_code"], "REVOKED");
}

#[tokio::test]
async fn inactive_license_reports_inactive() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        let license = create_test_license(&conn, 2);
        queries::set_license_active(&conn, &license.id, false).unwrap();
        license
    };

    let response = send_get(
        test_app(pool),
        &format!("/licenses/validate?code={}", license.code),
        None,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["error_code"], "INACTIVE");
}

#[tokio::test]
async fn missing_code_is_bad_request() {
    let pool = test_pool();
    let response = send_get(test_app(pool), "/licenses/validate", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
