use actix_web::{web, HttpResponse};
use marketplace_admin::entities::{NewOrder, OrderStatus, PaymentStatus, RefundRequest};
use serde::Deserialize;
use serde_json::json;

use super::{Envelope, PageBody};
use crate::errors::ApiError;
use crate::repositories::ListOrdersQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct AssignPayload {
    pub delivery_partner_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusPayload {
    pub payment_status: PaymentStatus,
}

const DEFAULT_LIMIT: u64 = 20;

pub async fn create_order(
    state: web::Data<AppState>,
    payload: web::Json<NewOrder>,
) -> Result<HttpResponse, ApiError> {
    let created = state.orders.create(payload.into_inner()).await?;
    tracing::info!(order_id = %created.order_id, total = %created.total, "order created");
    Ok(HttpResponse::Created().json(Envelope::ok(created)))
}

pub async fn list_orders(
    state: web::Data<AppState>,
    q: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let q = q.into_inner();
    let skip = q.skip.unwrap_or(0);
    let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
    let (items, total) = state
        .orders
        .list(ListOrdersQuery {
            status: q.status,
            search: q.search,
            skip: Some(skip),
            limit: Some(limit),
        })
        .await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(PageBody {
        items,
        skip,
        limit,
        total,
    })))
}

/// Answers with a bare `{data}` wrapper, unlike the mutation routes.
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let order = state.orders.get_by_id(&id).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": order })))
}

pub async fn update_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let status = payload.into_inner().status;
    if !status.is_known() {
        return Err(ApiError::BadRequest(format!("unknown order status {status}")));
    }
    let updated = state.orders.set_status(&id, status).await?;
    tracing::info!(order_id = %id, status = %updated.status, "status changed");
    Ok(HttpResponse::Ok().json(Envelope::ok(updated)))
}

pub async fn assign_partner(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<AssignPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if payload.delivery_partner_id.trim().is_empty() {
        return Err(ApiError::BadRequest("delivery_partner_id is empty".into()));
    }
    let updated = state
        .orders
        .assign(&id, &payload.delivery_partner_id)
        .await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(updated)))
}

pub async fn update_payment_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<PaymentStatusPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let updated = state
        .orders
        .set_payment_status(&id, payload.payment_status)
        .await?;
    Ok(HttpResponse::Ok().json(Envelope::ok(updated)))
}

pub async fn refund_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<RefundRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let updated = state.orders.refund(&id, payload.into_inner()).await?;
    tracing::info!(order_id = %id, refunded = %updated.refunded_amount, "refund issued");
    Ok(HttpResponse::Ok().json(Envelope::ok(updated)))
}

pub async fn delete_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    state.orders.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
