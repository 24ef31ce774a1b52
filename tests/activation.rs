//! Device activation: the device cap, idempotent re-activation, and the
//! 403 upsell contract.

use axum::http::StatusCode;
use rusqlite::params;
use serde_json::json;

mod common;
use common::*;

use bindery::db::queries;

async fn activate(
    pool: bindery::db::DbPool,
    code: &str,
    fingerprint: &str,
) -> axum::http::Response<axum::body::Body> {
    send_json(
        test_app(pool),
        "POST",
        "/licenses/activate",
        None,
        json!({
            "license_code": code,
            "device_fingerprint": fingerprint,
            "device_name": "Test Device",
            "device_type": "macos",
        }),
    )
    .await
}

#[tokio::test]
async fn activation_consumes_slots_until_cap() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    let response = activate(pool.clone(), &license.code, "device-a").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["remaining_activations"], 1);
    assert_eq!(body["reactivated"], false);

    let response = activate(pool.clone(), &license.code, "device-b").await;
    let body = body_json(response).await;
    assert_eq!(body["remaining_activations"], 0);

    // Third distinct device hits the cap.
    let response = activate(pool, &license.code, "device-c").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "DEVICE_LIMIT_EXCEEDED");
    assert!(
        body["support_claim_url"]
            .as_str()
            .unwrap()
            .contains("/support/extension-claim?code=")
    );
    assert_eq!(body["upsell"]["available"], true);
    assert_eq!(body["upsell"]["price"], 5.99);
    assert_eq!(body["upsell"]["currency"], "USD");
    assert!(
        body["upsell"]["checkout_url"]
            .as_str()
            .unwrap()
            .contains("/checkout/device-slot?code=")
    );
}

#[tokio::test]
async fn same_fingerprint_never_counts_twice() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 1)
    };

    let response = activate(pool.clone(), &license.code, "only-device").await;
    assert_eq!(body_json(response).await["remaining_activations"], 0);

    // Re-activating the same device at the cap succeeds and is a no-op.
    let response = activate(pool, &license.code, "only-device").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["remaining_activations"], 0);
    assert_eq!(body["reactivated"], false);
}

#[tokio::test]
async fn deactivate_frees_a_slot_and_reactivation_reports_itself() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 1)
    };

    activate(pool.clone(), &license.code, "device-a").await;

    let response = send_json(
        test_app(pool.clone()),
        "POST",
        "/licenses/devices/deactivate",
        None,
        json!({ "license_code": license.code, "device_fingerprint": "device-a" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The freed slot admits a new device.
    let response = activate(pool.clone(), &license.code, "device-b").await;
    assert_eq!(body_json(response).await["success"], true);

    // device-b now holds the only slot, so reactivating device-a is refused.
    let response = activate(pool.clone(), &license.code, "device-b").await;
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["reactivated"], false);

    let response = activate(pool, &license.code, "device-c").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reactivating_deactivated_device_sets_flag() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    activate(pool.clone(), &license.code, "device-a").await;
    send_json(
        test_app(pool.clone()),
        "POST",
        "/licenses/devices/deactivate",
        None,
        json!({ "license_code": license.code, "device_fingerprint": "device-a" }),
    )
    .await;

    let response = activate(pool, &license.code, "device-a").await;
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["reactivated"], true);
    assert_eq!(body["remaining_activations"], 1);
}

#[tokio::test]
async fn reactivation_preserves_original_activation_timestamp() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    activate(pool.clone(), &license.code, "device-a").await;
    {
        let conn = pool.get().unwrap();
        // Pin the audit timestamp to a known past value.
        conn.execute(
            "UPDATE device_activations SET activated_at = 1000 WHERE fingerprint = 'device-a'",
            params![],
        )
        .unwrap();
    }

    send_json(
        test_app(pool.clone()),
        "POST",
        "/licenses/devices/deactivate",
        None,
        json!({ "license_code": license.code, "device_fingerprint": "device-a" }),
    )
    .await;
    let response = activate(pool.clone(), &license.code, "device-a").await;
    assert_eq!(body_json(response).await["reactivated"], true);

    let conn = pool.get().unwrap();
    let activation = queries::get_activation(&conn, &license.id, "device-a")
        .unwrap()
        .unwrap();
    assert!(activation.is_active);
    assert_eq!(activation.activated_at, 1000);
    assert_eq!(activation.deactivated_at, None);
}

#[tokio::test]
async fn deactivating_an_inactive_device_reports_false() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };

    activate(pool.clone(), &license.code, "device-a").await;

    let body = json!({ "license_code": license.code, "device_fingerprint": "device-a" });
    let response = send_json(
        test_app(pool.clone()),
        "POST",
        "/licenses/devices/deactivate",
        None,
        body.clone(),
    )
    .await;
    assert_eq!(body_json(response).await["deactivated"], true);

    let response = send_json(
        test_app(pool),
        "POST",
        "/licenses/devices/deactivate",
        None,
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deactivated"], false);
    assert_eq!(json["remaining_devices"], 0);
}

#[tokio::test]
async fn invalid_license_is_in_payload_failure() {
    let pool = test_pool();
    let response = activate(pool, "ZZZZ-ZZZZ-ZZZZ-ZZZZ", "device-a").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn missing_fingerprint_is_bad_request() {
    let pool = test_pool();
    let license = {
        let conn = pool.get().unwrap();
        create_test_license(&conn, 2)
    };
    let response = send_json(
        test_app(pool),
        "POST",
        "/licenses/activate",
        None,
        json!({
            "license_code": license.code,
            "device_fingerprint": "",
            "device_type": "windows",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
