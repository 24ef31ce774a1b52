//! Order recording and the refund state machine over the admin API.

use axum::http::StatusCode;
use rusqlite::params;
use serde_json::json;

mod common;
use common::*;

use bindery::db::queries;

#[tokio::test]
async fn refund_flow_and_disallowed_transitions() {
    let pool = test_pool();
    let partner = {
        let conn = pool.get().unwrap();
        create_test_partner(&conn, "acme", "US")
    };

    let response = send_json(
        test_app(pool.clone()),
        "POST",
        "/admin/orders",
        Some(ADMIN_TOKEN),
        json!({ "partner_id": partner.id, "amount": 50.0, "commission": 10.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    let order_id = order["id"].as_str().unwrap().to_string();
    assert_eq!(order["status"], "completed");
    assert_eq!(order["refund_status"], "none");

    // Approving with no refund requested is a conflict.
    let response = send_json(
        test_app(pool.clone()),
        "PATCH",
        &format!("/admin/orders/{order_id}/refund"),
        Some(ADMIN_TOKEN),
        json!({ "action": "approve" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    for (action, expected) in [("request", "requested"), ("verify", "verified_pending")] {
        let response = send_json(
            test_app(pool.clone()),
            "PATCH",
            &format!("/admin/orders/{order_id}/refund"),
            Some(ADMIN_TOKEN),
            json!({ "action": action }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["refund_status"], expected);
    }

    let response = send_json(
        test_app(pool.clone()),
        "PATCH",
        &format!("/admin/orders/{order_id}/refund"),
        Some(ADMIN_TOKEN),
        json!({ "action": "approve" }),
    )
    .await;
    let order = body_json(response).await;
    assert_eq!(order["refund_status"], "approved");
    assert_eq!(order["status"], "refunded");
}

#[tokio::test]
async fn refunded_commission_never_matures() {
    let pool = test_pool();
    let (partner, order_id) = {
        let conn = pool.get().unwrap();
        let partner = create_test_partner(&conn, "acme", "US");
        complete_onboarding(&conn, &partner.id);
        create_matured_order(&conn, &partner.id, 30.0);
        create_matured_order(&conn, &partner.id, 20.0);
        // Pick one matured order to refund.
        let order_id: String = conn
            .query_row(
                "SELECT id FROM orders WHERE partner_id = ?1 AND commission = 30.0",
                params![&partner.id],
                |row| row.get(0),
            )
            .unwrap();
        (partner, order_id)
    };

    for action in ["request", "approve"] {
        let response = send_json(
            test_app(pool.clone()),
            "PATCH",
            &format!("/admin/orders/{order_id}/refund"),
            Some(ADMIN_TOKEN),
            json!({ "action": action }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send_get(
        test_app(pool),
        "/partner/balance",
        Some(&partner.access_code),
    )
    .await;
    let balance = body_json(response).await;
    assert_eq!(balance["matured_commission"], 20.0);
}

#[tokio::test]
async fn disputed_refund_blocks_approval() {
    let pool = test_pool();
    let order_id = {
        let conn = pool.get().unwrap();
        let order = queries::create_order(
            &conn,
            &bindery::models::CreateOrder {
                partner_id: None,
                amount: 25.0,
                commission: 0.0,
            },
        )
        .unwrap();
        order.id
    };

    for action in ["request", "dispute"] {
        let response = send_json(
            test_app(pool.clone()),
            "PATCH",
            &format!("/admin/orders/{order_id}/refund"),
            Some(ADMIN_TOKEN),
            json!({ "action": action }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send_json(
        test_app(pool),
        "PATCH",
        &format!("/admin/orders/{order_id}/refund"),
        Some(ADMIN_TOKEN),
        json!({ "action": "approve" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn order_for_unknown_partner_is_rejected() {
    let pool = test_pool();
    let response = send_json(
        test_app(pool),
        "POST",
        "/admin/orders",
        Some(ADMIN_TOKEN),
        json!({ "partner_id": "missing", "amount": 50.0, "commission": 10.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
