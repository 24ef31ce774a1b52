use axum::extract::State;
use serde::Deserialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateOrder, Order, OrderStatus, RefundAction, RefundStatus};

/// POST /admin/orders
///
/// Records a completed storefront sale. Commission only becomes
/// withdrawable after the maturity window passes.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrder>,
) -> Result<Json<Order>> {
    if body.amount <= 0.0 {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }
    if body.commission < 0.0 {
        return Err(AppError::BadRequest("commission cannot be negative".into()));
    }

    let conn = state.db.get()?;
    if let Some(partner_id) = &body.partner_id {
        queries::get_partner_by_id(&conn, partner_id)?
            .ok_or_else(|| AppError::NotFound("Partner not found".into()))?;
    }

    let order = queries::create_order(&conn, &body)?;
    tracing::info!(order_id = %order.id, amount = order.amount, "order recorded");
    Ok(Json(order))
}

/// GET /admin/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = queries::get_order_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct RefundBody {
    pub action: RefundAction,
}

/// PATCH /admin/orders/{id}/refund
///
/// Drives the refund state machine. A disallowed transition is a
/// conflict, not a validation error: the order exists, the action just
/// cannot apply to its current state.
pub async fn update_refund(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RefundBody>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = queries::get_order_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    let next = order.refund_status.apply(body.action).ok_or_else(|| {
        AppError::Conflict(format!(
            "Cannot {} a refund in state {}",
            body.action.as_ref(),
            order.refund_status.as_ref()
        ))
    })?;

    let order_status = if next == RefundStatus::Approved {
        OrderStatus::Refunded
    } else {
        order.status
    };
    queries::update_order_refund(&conn, &id, next, order_status)?;

    let order = queries::get_order_by_id(&conn, &id)?
        .ok_or_else(|| AppError::Internal("Order disappeared".into()))?;
    tracing::info!(order_id = %id, refund_status = order.refund_status.as_ref(), "refund state updated");
    Ok(Json(order))
}
